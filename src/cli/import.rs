use anyhow::{Context, Result};
use hippocampus::config::HippoConfig;
use hippocampus::memory::{Engram, MemoryService};
use serde::Deserialize;
use std::path::Path;

/// Import format, as written by `export`. `role` is informational; the
/// target role comes from the command line.
#[derive(Debug, Deserialize)]
struct ImportData {
    #[serde(default)]
    role: Option<String>,
    engrams: Vec<Engram>,
}

/// Import engrams from a JSON file into `role`.
///
/// Engrams keep their ids and timestamps; an existing engram with the same id
/// is replaced. Invalid engrams are skipped and reported.
pub fn import(config: &HippoConfig, role: &str, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let data: ImportData = serde_json::from_str(&json).context("failed to parse import JSON")?;

    if let Some(source) = data.role.as_deref().filter(|source| *source != role) {
        println!("Importing engrams exported from role '{source}' into '{role}'");
    }
    println!("Importing {} engrams...", data.engrams.len());

    let memory = MemoryService::from_config(config);
    let outcome = memory.import(role, data.engrams);

    println!("Import complete:");
    println!("  Engrams imported: {}", outcome.stored.len());
    if !outcome.is_ok() {
        println!("  Engrams skipped:  {}", outcome.rejected.len());
        for (index, error) in &outcome.rejected {
            eprintln!("  #{index}: {error}");
        }
    }

    Ok(())
}
