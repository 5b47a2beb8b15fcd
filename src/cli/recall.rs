use anyhow::Result;
use hippocampus::config::HippoConfig;
use hippocampus::memory::{MemoryService, RecallMode};

/// Run a recall from the terminal. No query means a DMN overview.
pub fn recall(
    config: &HippoConfig,
    role: &str,
    query: Option<&str>,
    mode: Option<RecallMode>,
) -> Result<()> {
    let memory = MemoryService::from_config(config);
    let mode = mode.unwrap_or_else(|| memory.default_mode());
    let engrams = memory.recall(role, query, mode)?;

    if engrams.is_empty() {
        println!("No memories found.");
        return Ok(());
    }

    match query {
        Some(q) => println!("{} engram(s) for '{q}' ({mode} mode)\n", engrams.len()),
        None => println!("DMN overview: {} engram(s) ({mode} mode)\n", engrams.len()),
    }

    for (i, engram) in engrams.iter().enumerate() {
        println!(
            "  {}. [{}] {} (strength: {:.2}, {})",
            i + 1,
            engram.engram_type,
            engram.id,
            engram.strength,
            engram.timestamp.format("%Y-%m-%d %H:%M:%S"),
        );
        println!("     {}", super::preview(&engram.content, 120));
        if let Some(schema) = &engram.schema {
            println!("     schema: {}", super::preview(schema, 120));
        }
        println!();
    }

    Ok(())
}
