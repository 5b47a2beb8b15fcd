//! Per-role facade over the engram stores.
//!
//! [`MemoryService`] owns a registry of [`EngramStore`]s keyed by role and
//! creates each one lazily on first access. It is the only writer: `remember`
//! validates, extracts cues and writes through; `recall` reads under a shared
//! lock and then records access under the exclusive one.
//!
//! All methods block on SQLite I/O; call them through
//! `tokio::task::spawn_blocking` from async code.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::config::{HippoConfig, RecallConfig};
use crate::db::{self, SqliteBackend};

use super::cues;
use super::error::{MemoryError, PersistenceError, ValidationError};
use super::recall;
use super::stats::{self, StatsResponse};
use super::store::{EngramBackend, EngramStore};
use super::types::{Engram, EngramInput, RecallMode};

const MAX_ROLE_LEN: usize = 128;

/// Result of a batch `remember`.
///
/// Items are processed in caller order and independently: valid engrams are
/// stored even when others are rejected, and nothing is rolled back.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Ids of stored engrams, in caller order.
    pub stored: Vec<String>,
    /// `(index, error)` for every rejected item.
    pub rejected: Vec<(usize, ValidationError)>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.rejected.is_empty()
    }

    /// The stored ids, or the first rejection.
    pub fn into_result(self) -> Result<Vec<String>, MemoryError> {
        match self.rejected.into_iter().next() {
            None => Ok(self.stored),
            Some((index, source)) => Err(MemoryError::Batch { index, source }),
        }
    }
}

type SharedStore = Arc<RwLock<EngramStore>>;

pub struct MemoryService {
    /// `None` keeps every store in memory.
    memory_dir: Option<PathBuf>,
    recall: RecallConfig,
    stores: Mutex<HashMap<String, SharedStore>>,
}

impl MemoryService {
    /// A service persisting each role under `memory_dir/<role>/engrams.db`.
    pub fn new(memory_dir: impl Into<PathBuf>, recall: RecallConfig) -> Self {
        Self {
            memory_dir: Some(memory_dir.into()),
            recall,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// A service whose stores live only as long as the process.
    pub fn in_memory(recall: RecallConfig) -> Self {
        Self {
            memory_dir: None,
            recall,
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &HippoConfig) -> Self {
        if config.storage.in_memory {
            Self::in_memory(config.recall.clone())
        } else {
            Self::new(config.resolved_memory_dir(), config.recall.clone())
        }
    }

    pub fn memory_dir(&self) -> Option<&Path> {
        self.memory_dir.as_deref()
    }

    pub fn default_mode(&self) -> RecallMode {
        self.recall.default_mode
    }

    /// Validate one engram, index it and write it through. Returns its id.
    pub fn remember(&self, role: &str, input: EngramInput) -> Result<String, MemoryError> {
        let store = self.store_for(role)?;
        let engram = input.into_engram()?;
        Ok(self.write(&store, engram))
    }

    /// Remember several engrams for one role, best-effort (see [`BatchOutcome`]).
    ///
    /// An invalid role rejects every item.
    pub fn remember_batch(&self, role: &str, inputs: Vec<EngramInput>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let store = match self.store_for(role) {
            Ok(store) => store,
            Err(e) => {
                outcome.rejected = (0..inputs.len()).map(|i| (i, e.clone())).collect();
                return outcome;
            }
        };

        for (index, input) in inputs.into_iter().enumerate() {
            match input.into_engram() {
                Ok(engram) => outcome.stored.push(self.write(&store, engram)),
                Err(e) => {
                    tracing::warn!(role = %role, index, error = %e, "engram rejected");
                    outcome.rejected.push((index, e));
                }
            }
        }
        outcome
    }

    /// Rank the role's engrams for `query` (`None` or blank for a DMN scan).
    ///
    /// A role that never remembered anything yields an empty list.
    pub fn recall(
        &self,
        role: &str,
        query: Option<&str>,
        mode: RecallMode,
    ) -> Result<Vec<Engram>, MemoryError> {
        let store = self.store_for(role)?;

        let results = {
            let guard = store.read().unwrap_or_else(PoisonError::into_inner);
            recall::recall(&guard, query, mode, &self.recall)
        };

        if !results.is_empty() {
            let ids: Vec<String> = results.iter().map(|e| e.id.clone()).collect();
            let mut guard = store.write().unwrap_or_else(PoisonError::into_inner);
            guard.record_access(&ids);
        }

        tracing::info!(
            role = %role,
            query = query.unwrap_or(""),
            mode = %mode,
            results = results.len(),
            "recall"
        );
        Ok(results)
    }

    /// Counts and health for one role's store.
    pub fn stats(&self, role: &str) -> Result<StatsResponse, MemoryError> {
        let store = self.store_for(role)?;
        let guard = store.read().unwrap_or_else(PoisonError::into_inner);
        Ok(stats::engram_stats(&guard))
    }

    /// Every engram of the role, newest first.
    pub fn export(&self, role: &str) -> Result<Vec<Engram>, MemoryError> {
        let store = self.store_for(role)?;
        let guard = store.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get_all())
    }

    /// Upsert previously exported engrams, keeping their ids and timestamps.
    /// Cues are re-extracted. Same best-effort policy as [`Self::remember_batch`].
    pub fn import(&self, role: &str, engrams: Vec<Engram>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let store = match self.store_for(role) {
            Ok(store) => store,
            Err(e) => {
                outcome.rejected = (0..engrams.len()).map(|i| (i, e.clone())).collect();
                return outcome;
            }
        };

        for (index, engram) in engrams.into_iter().enumerate() {
            match engram.validate() {
                Ok(()) => outcome.stored.push(self.write(&store, engram)),
                Err(e) => outcome.rejected.push((index, e)),
            }
        }
        tracing::info!(
            role = %role,
            imported = outcome.stored.len(),
            rejected = outcome.rejected.len(),
            "import finished"
        );
        outcome
    }

    /// Roles that hold engrams in this process or have a database on disk.
    pub fn roles(&self) -> Vec<String> {
        let open: Vec<(String, SharedStore)> = self
            .stores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(role, store)| (role.clone(), Arc::clone(store)))
            .collect();

        let mut roles: BTreeSet<String> = open
            .into_iter()
            .filter(|(_, store)| {
                store.read().unwrap_or_else(PoisonError::into_inner).count() > 0
            })
            .map(|(role, _)| role)
            .collect();

        if let Some(dir) = &self.memory_dir {
            if let Ok(entries) = std::fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if entry.path().join(db::DB_FILE_NAME).is_file()
                        && validate_role(&name).is_ok()
                    {
                        roles.insert(name);
                    }
                }
            }
        }
        roles.into_iter().collect()
    }

    fn write(&self, store: &SharedStore, engram: Engram) -> String {
        let cues = cues::extract(&engram.content, engram.schema.as_deref());
        let id = engram.id.clone();
        let mut guard = store.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(
            role = %guard.role(),
            id = %id,
            engram_type = %engram.engram_type,
            cues = cues.len(),
            "remember"
        );
        guard.put(engram, cues);
        id
    }

    /// Resolve the role's store, opening it on first access.
    fn store_for(&self, role: &str) -> Result<SharedStore, ValidationError> {
        validate_role(role)?;
        let mut stores = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = stores.get(role) {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(RwLock::new(self.open_store(role)));
        stores.insert(role.to_string(), Arc::clone(&store));
        Ok(store)
    }

    /// The role's database is opened now only if it already exists; otherwise
    /// on the first write, so reads of an unknown role leave nothing on disk.
    fn open_store(&self, role: &str) -> EngramStore {
        let Some(dir) = &self.memory_dir else {
            return EngramStore::in_memory(role);
        };

        let path = dir.join(role).join(db::DB_FILE_NAME);
        let exists = path.is_file();
        let opener_path = path.clone();
        let mut store = EngramStore::deferred(
            role,
            Box::new(move || -> Result<Box<dyn EngramBackend>, PersistenceError> {
                let backend = SqliteBackend::open(&opener_path)?;
                tracing::info!(path = %opener_path.display(), "engram database opened");
                Ok(Box::new(backend) as Box<dyn EngramBackend>)
            }),
        );

        if exists && store.connect() {
            tracing::info!(role = %role, path = %path.display(), engrams = store.count(), "engram store opened");
        }
        store
    }
}

/// Role ids become directory names: ASCII alphanumerics, `-`, `_` and `.`,
/// not starting with `.`.
pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    if role.is_empty() {
        return Err(ValidationError::new("role", "role must not be empty"));
    }
    if role.len() > MAX_ROLE_LEN {
        return Err(ValidationError::new(
            "role",
            format!("role must be at most {MAX_ROLE_LEN} characters"),
        ));
    }
    if role.starts_with('.') {
        return Err(ValidationError::new("role", "role must not start with '.'"));
    }
    if let Some(bad) = role
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(ValidationError::new(
            "role",
            format!("role contains invalid character {bad:?}"),
        ));
    }
    Ok(())
}
