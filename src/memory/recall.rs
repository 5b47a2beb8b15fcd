//! Read path: candidate selection and mode-aware ranking.
//!
//! An empty query is a DMN scan: every engram is a candidate, ranked as an
//! overview of the whole network. A non-empty query is split on whitespace
//! into keywords; each keyword activates the engrams whose cues match it and
//! the candidate set is the union over all keywords.
//!
//! | Mode | Cue match | Ranking |
//! |------|-----------|---------|
//! | `balanced` | stored cue contains keyword | strength, recency |
//! | `focused` | stored cue equals keyword, strength floor | strength, access count, recency |
//! | `creative` | containment either way | keywords activated, strength, recency |

use std::cmp::Ordering;

use crate::config::RecallConfig;

use super::store::{EngramStore, StoredEngram};
use super::types::{Engram, RecallMode};

struct Candidate<'a> {
    record: &'a StoredEngram,
    /// Distinct keywords that activated this engram (0 in DMN and balanced mode).
    hits: usize,
}

/// Lowercased, de-duplicated query keywords, in query order. Keywords shorter
/// than `min_chars` are dropped.
pub fn keywords(query: &str, min_chars: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for word in query.split_whitespace() {
        let word = word.to_lowercase();
        if word.chars().count() >= min_chars && !out.contains(&word) {
            out.push(word);
        }
    }
    out
}

/// Select and rank engrams from `store`.
pub fn recall(
    store: &EngramStore,
    query: Option<&str>,
    mode: RecallMode,
    config: &RecallConfig,
) -> Vec<Engram> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());

    let mut candidates: Vec<Candidate> = match query {
        None => store
            .records()
            .into_iter()
            .map(|record| Candidate { record, hits: 0 })
            .collect(),
        Some(q) => {
            let keywords = keywords(q, config.min_keyword_chars);
            if keywords.is_empty() {
                tracing::debug!(query = %q, "no usable keywords after length gate");
                return Vec::new();
            }
            activated(store, &keywords, mode, config)
        }
    };

    candidates.sort_by(|a, b| rank(mode, a, b));

    tracing::debug!(
        role = %store.role(),
        mode = %mode,
        dmn = query.is_none(),
        results = candidates.len(),
        "recall ranked"
    );

    candidates
        .into_iter()
        .map(|c| c.record.engram.clone())
        .collect()
}

fn activated<'a>(
    store: &'a EngramStore,
    keywords: &[String],
    mode: RecallMode,
    config: &RecallConfig,
) -> Vec<Candidate<'a>> {
    let min_cue = config.creative_min_cue_chars;
    let hits = match mode {
        // hit counts do not affect balanced ranking
        RecallMode::Balanced => {
            return store
                .find_by_cues(keywords)
                .into_iter()
                .map(|record| Candidate { record, hits: 0 })
                .collect();
        }
        RecallMode::Focused => store.activate(keywords, |cue, kw| cue == kw),
        RecallMode::Creative => store.activate(keywords, |cue, kw| {
            cue.contains(kw) || (cue.chars().count() >= min_cue && kw.contains(cue))
        }),
    };

    hits.into_iter()
        .filter_map(|(id, hits)| store.get(id).map(|record| Candidate { record, hits }))
        .filter(|c| {
            mode != RecallMode::Focused || c.record.engram.strength >= config.focused_min_strength
        })
        .collect()
}

fn rank(mode: RecallMode, a: &Candidate, b: &Candidate) -> Ordering {
    let (ea, eb) = (&a.record.engram, &b.record.engram);
    let by_strength = eb.strength.total_cmp(&ea.strength);
    let by_recency = eb.timestamp.cmp(&ea.timestamp);
    let by_id = ea.id.cmp(&eb.id);

    match mode {
        RecallMode::Balanced => by_strength.then(by_recency).then(by_id),
        RecallMode::Focused => by_strength
            .then(b.record.access_count.cmp(&a.record.access_count))
            .then(by_recency)
            .then(by_id),
        RecallMode::Creative => b
            .hits
            .cmp(&a.hits)
            .then(by_strength)
            .then(by_recency)
            .then(by_id),
    }
}
