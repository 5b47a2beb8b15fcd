//! Per-role engram store: in-memory records and an inverted cue index, written
//! through to a persistence backend.
//!
//! The in-memory state is authoritative. Every mutation is handed to the
//! [`EngramBackend`] before the call returns; when the backend fails the error
//! is logged, the affected ids are kept in a pending set and re-sent with the
//! next write, and the store reports itself as degraded until then.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use super::error::PersistenceError;
use super::types::Engram;

/// An engram together with its extracted cues and access tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEngram {
    pub engram: Engram,
    pub cues: BTreeSet<String>,
    /// Number of recalls that returned this engram.
    pub access_count: u32,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl StoredEngram {
    pub fn new(engram: Engram, cues: BTreeSet<String>) -> Self {
        Self {
            engram,
            cues,
            access_count: 0,
            last_accessed: None,
        }
    }
}

/// Durable storage behind an [`EngramStore`].
///
/// Methods are synchronous; async callers should go through
/// `tokio::task::spawn_blocking`.
pub trait EngramBackend: Send {
    /// Read every persisted record.
    fn load(&mut self) -> Result<Vec<StoredEngram>, PersistenceError>;

    /// Insert or fully replace the given records, cues included.
    fn upsert(&mut self, records: &[&StoredEngram]) -> Result<(), PersistenceError>;

    /// Persist only the access-tracking fields of the given records.
    fn touch(&mut self, records: &[&StoredEngram]) -> Result<(), PersistenceError>;
}

/// Opens the backend of a deferred store. Called again on every write until
/// it succeeds.
pub type BackendOpener =
    Box<dyn FnMut() -> Result<Box<dyn EngramBackend>, PersistenceError> + Send>;

enum Persistence {
    /// Memory only; nothing is ever written.
    Off,
    Open(Box<dyn EngramBackend>),
    /// Not opened yet, or the last attempt failed.
    Deferred(BackendOpener),
}

pub struct EngramStore {
    role: String,
    records: HashMap<String, StoredEngram>,
    /// cue → ids of engrams carrying that cue
    cue_index: HashMap<String, HashSet<String>>,
    persistence: Mutex<Persistence>,
    /// Ids whose latest state has not reached the backend yet.
    pending: HashSet<String>,
    degraded: bool,
}

impl EngramStore {
    /// A store that never touches disk.
    pub fn in_memory(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            records: HashMap::new(),
            cue_index: HashMap::new(),
            persistence: Mutex::new(Persistence::Off),
            pending: HashSet::new(),
            degraded: false,
        }
    }

    /// Open a store over `backend`, loading everything it holds.
    ///
    /// A failed load is logged and leaves the store empty but still attached.
    pub fn with_backend(role: impl Into<String>, backend: Box<dyn EngramBackend>) -> Self {
        let mut store = Self::in_memory(role);
        store.attach(backend);
        store
    }

    /// A store whose backend is opened by `opener` on the first write, or
    /// earlier through [`Self::connect`]. Reads alone never open it.
    pub fn deferred(role: impl Into<String>, opener: BackendOpener) -> Self {
        let mut store = Self::in_memory(role);
        store.persistence = Mutex::new(Persistence::Deferred(opener));
        store
    }

    /// Make sure the backend is open, opening a deferred one now. Returns
    /// `false` for memory-only stores and when opening fails; a failure marks
    /// the store degraded and is retried by the next write.
    pub fn connect(&mut self) -> bool {
        let persistence = self.persistence.get_mut().unwrap_or_else(PoisonError::into_inner);
        let opened = match persistence {
            Persistence::Off => return false,
            Persistence::Open(_) => return true,
            Persistence::Deferred(open) => open(),
        };

        match opened {
            Ok(backend) => {
                self.attach(backend);
                true
            }
            Err(e) => {
                if !self.degraded {
                    tracing::warn!(
                        role = %self.role,
                        error = %e,
                        "engram store unavailable; keeping writes in memory until it opens"
                    );
                }
                self.degraded = true;
                false
            }
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Idempotent upsert keyed by `engram.id`. Replaces any prior record and
    /// its cue associations, then persists before returning.
    pub fn put(&mut self, engram: Engram, cues: BTreeSet<String>) {
        let id = engram.id.clone();
        self.insert(StoredEngram::new(engram, cues));
        self.pending.insert(id);
        self.flush();
    }

    pub fn get(&self, id: &str) -> Option<&StoredEngram> {
        self.records.get(id)
    }

    /// Every stored record, newest first.
    pub fn records(&self) -> Vec<&StoredEngram> {
        let mut all: Vec<&StoredEngram> = self.records.values().collect();
        all.sort_by(|a, b| {
            b.engram
                .timestamp
                .cmp(&a.engram.timestamp)
                .then_with(|| a.engram.id.cmp(&b.engram.id))
        });
        all
    }

    /// Every stored engram, newest first.
    pub fn get_all(&self) -> Vec<Engram> {
        self.records()
            .into_iter()
            .map(|r| r.engram.clone())
            .collect()
    }

    /// Records with a stored cue containing any of `cues` as a substring,
    /// newest first. Matching is case-insensitive.
    pub fn find_by_cues(&self, cues: &[String]) -> Vec<&StoredEngram> {
        let hits = self.activate(cues, |stored, query| stored.contains(query));
        self.records()
            .into_iter()
            .filter(|r| hits.contains_key(r.engram.id.as_str()))
            .collect()
    }

    /// Walk the cue index once per keyword. Returns, for each activated engram,
    /// how many distinct keywords reached it. `matches` receives
    /// `(stored_cue, keyword)`; both are lowercase.
    pub fn activate<F>(&self, keywords: &[String], matches: F) -> HashMap<&str, usize>
    where
        F: Fn(&str, &str) -> bool,
    {
        let mut hits: HashMap<&str, usize> = HashMap::new();
        for keyword in keywords {
            let keyword = keyword.to_lowercase();
            let mut reached: HashSet<&str> = HashSet::new();
            for (cue, ids) in &self.cue_index {
                if matches(cue.as_str(), keyword.as_str()) {
                    reached.extend(ids.iter().map(String::as_str));
                }
            }
            for id in reached {
                *hits.entry(id).or_insert(0) += 1;
            }
        }
        hits
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Number of distinct cues in the index.
    pub fn cue_count(&self) -> usize {
        self.cue_index.len()
    }

    /// `true` while some write has not reached durable storage.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Bump access tracking for engrams returned by a recall.
    pub fn record_access(&mut self, ids: &[String]) {
        let now = Utc::now();
        let mut touched = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.records.get_mut(id) {
                record.access_count = record.access_count.saturating_add(1);
                record.last_accessed = Some(now);
                touched.push(id.clone());
            }
        }
        if touched.is_empty() {
            return;
        }

        if !self.connect() {
            // a store that failed to open re-sends these with its next write
            if self.degraded {
                self.pending.extend(touched);
            }
            return;
        }

        let persistence = self.persistence.get_mut().unwrap_or_else(PoisonError::into_inner);
        let Persistence::Open(backend) = persistence else {
            return;
        };
        let records: Vec<&StoredEngram> = touched
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect();
        if let Err(e) = backend.touch(&records) {
            tracing::warn!(
                role = %self.role,
                error = %e,
                engrams = records.len(),
                "failed to persist access tracking; will retry on next write"
            );
            self.pending.extend(touched);
            self.degraded = true;
        }
    }

    /// Load what `backend` holds and keep it as the store's backend. Records
    /// already in memory win over persisted ones with the same id.
    fn attach(&mut self, mut backend: Box<dyn EngramBackend>) {
        match backend.load() {
            Ok(records) => {
                let mut loaded = 0;
                for record in records {
                    if !self.records.contains_key(&record.engram.id) {
                        self.insert(record);
                        loaded += 1;
                    }
                }
                tracing::debug!(role = %self.role, engrams = loaded, "engram store loaded");
            }
            Err(e) => {
                tracing::warn!(role = %self.role, error = %e, "failed to load engram store; starting empty");
                self.degraded = true;
            }
        }
        *self.persistence.get_mut().unwrap_or_else(PoisonError::into_inner) =
            Persistence::Open(backend);
    }

    fn insert(&mut self, record: StoredEngram) {
        let id = record.engram.id.clone();
        if let Some(previous) = self.records.remove(&id) {
            self.unindex(&id, &previous.cues);
        }
        for cue in &record.cues {
            self.cue_index
                .entry(cue.clone())
                .or_default()
                .insert(id.clone());
        }
        self.records.insert(id, record);
    }

    fn unindex(&mut self, id: &str, cues: &BTreeSet<String>) {
        for cue in cues {
            if let Some(ids) = self.cue_index.get_mut(cue) {
                ids.remove(id);
                if ids.is_empty() {
                    self.cue_index.remove(cue);
                }
            }
        }
    }

    /// Send every pending record to the backend. Soft-fails.
    fn flush(&mut self) {
        if !self.connect() {
            if !self.degraded {
                // memory-only: nothing to send
                self.pending.clear();
            }
            return;
        }

        let persistence = self.persistence.get_mut().unwrap_or_else(PoisonError::into_inner);
        let Persistence::Open(backend) = persistence else {
            return;
        };
        let batch: Vec<&StoredEngram> = self
            .pending
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect();

        match backend.upsert(&batch) {
            Ok(()) => {
                if self.degraded {
                    tracing::info!(role = %self.role, engrams = batch.len(), "engram store persisted again");
                }
                self.pending.clear();
                self.degraded = false;
            }
            Err(e) => {
                tracing::warn!(
                    role = %self.role,
                    error = %e,
                    pending = batch.len(),
                    "failed to persist engram store; continuing in memory"
                );
                self.degraded = true;
            }
        }
    }
}
