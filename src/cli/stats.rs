use anyhow::Result;
use hippocampus::config::HippoConfig;
use hippocampus::memory::MemoryService;

/// Display a role's memory statistics in the terminal.
pub fn stats(config: &HippoConfig, role: &str) -> Result<()> {
    let memory = MemoryService::from_config(config);
    let response = memory.stats(role)?;

    println!("Memory Statistics: {}", response.role);
    println!("{}", "=".repeat(40));
    println!("  Total engrams:       {}", response.total_engrams);
    println!("  Distinct cues:       {}", response.total_cues);
    println!();

    println!("By Type:");
    for (engram_type, count) in &response.by_type {
        println!("  {:<12} {}", engram_type, count);
    }
    println!();

    if let Some(ref oldest) = response.oldest_engram {
        println!("Oldest engram:         {oldest}");
    }
    if let Some(ref newest) = response.newest_engram {
        println!("Newest engram:         {newest}");
    }
    if response.degraded {
        println!(
            "Persistence:           DEGRADED ({} pending writes)",
            response.pending_writes
        );
    }

    Ok(())
}
