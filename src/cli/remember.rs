use anyhow::Result;
use hippocampus::config::HippoConfig;
use hippocampus::memory::{EngramInput, MemoryService};

/// Store a single engram from the terminal.
pub fn remember(config: &HippoConfig, role: &str, input: EngramInput) -> Result<()> {
    let memory = MemoryService::from_config(config);
    let id = memory.remember(role, input)?;

    let stats = memory.stats(role)?;
    println!("Remembered {id} for role '{role}' ({} engrams total)", stats.total_engrams);
    if stats.degraded {
        eprintln!("Warning: store is not persisted; see log output for the cause.");
    }
    Ok(())
}
