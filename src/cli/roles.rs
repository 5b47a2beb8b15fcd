use anyhow::Result;
use hippocampus::config::HippoConfig;
use hippocampus::memory::MemoryService;

/// List every role that has a memory store.
pub fn roles(config: &HippoConfig) -> Result<()> {
    let memory = MemoryService::from_config(config);
    let roles = memory.roles();

    if roles.is_empty() {
        println!("No roles have memories yet.");
        return Ok(());
    }
    for role in roles {
        println!("{role}");
    }
    Ok(())
}
