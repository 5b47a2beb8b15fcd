use serde::Serialize;
use std::collections::BTreeMap;

use super::store::EngramStore;
use super::types::EngramType;

/// Response from memory_stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub role: String,
    pub total_engrams: usize,
    pub by_type: BTreeMap<String, usize>,
    /// Distinct cues in the index.
    pub total_cues: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_engram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_engram: Option<String>,
    /// `true` while some write has not reached durable storage.
    pub degraded: bool,
    pub pending_writes: usize,
}

/// Compute statistics for one role's store.
pub fn engram_stats(store: &EngramStore) -> StatsResponse {
    let mut by_type: BTreeMap<String, usize> = EngramType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), 0))
        .collect();

    let records = store.records();
    for record in &records {
        *by_type
            .entry(record.engram.engram_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    // records() is newest first
    let newest_engram = records.first().map(|r| r.engram.timestamp.to_rfc3339());
    let oldest_engram = records.last().map(|r| r.engram.timestamp.to_rfc3339());

    StatsResponse {
        role: store.role().to_string(),
        total_engrams: store.count(),
        by_type,
        total_cues: store.cue_count(),
        oldest_engram,
        newest_engram,
        degraded: store.is_degraded(),
        pending_writes: store.pending_writes(),
    }
}
