#![allow(dead_code)]

use hippocampus::config::RecallConfig;
use hippocampus::memory::{EngramInput, EngramType, MemoryService};
use std::path::Path;
use std::time::Duration;

/// A service persisting under `dir` with default recall tuning.
pub fn service(dir: &Path) -> MemoryService {
    MemoryService::new(dir, RecallConfig::default())
}

/// An ATOMIC engram with the given id, content and strength.
pub fn atomic(id: &str, content: &str, strength: f64) -> EngramInput {
    EngramInput::new(content, EngramType::Atomic)
        .with_id(id)
        .with_strength(strength)
}

/// Remember `(id, content, strength)` items one by one, sleeping between
/// writes so each gets a distinct timestamp.
pub fn remember_all(service: &MemoryService, role: &str, items: &[(&str, &str, f64)]) {
    for (id, content, strength) in items {
        service.remember(role, atomic(id, content, *strength)).unwrap();
        std::thread::sleep(Duration::from_millis(2));
    }
}

pub fn ids(engrams: &[hippocampus::memory::Engram]) -> Vec<&str> {
    engrams.iter().map(|e| e.id.as_str()).collect()
}
