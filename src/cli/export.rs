use anyhow::Result;
use hippocampus::config::HippoConfig;
use hippocampus::memory::{Engram, MemoryService};
use serde::Serialize;

/// Export format: one role's engrams.
#[derive(Debug, Serialize)]
pub struct ExportData {
    pub role: String,
    pub engrams: Vec<Engram>,
}

/// Export all engrams of a role as JSON to stdout.
pub fn export(config: &HippoConfig, role: &str) -> Result<()> {
    let memory = MemoryService::from_config(config);
    let data = ExportData {
        role: role.to_string(),
        engrams: memory.export(role)?,
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!("Exported {} engrams for role '{role}'.", data.engrams.len());

    Ok(())
}
