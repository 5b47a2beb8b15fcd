use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::memory::types::RecallMode;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HippoConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub recall: RecallConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per role.
    pub memory_dir: String,
    /// Keep every store in memory only; nothing touches disk.
    pub in_memory: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RecallConfig {
    pub default_mode: RecallMode,
    /// Query keywords shorter than this (in chars) are ignored.
    pub min_keyword_chars: usize,
    /// `focused` recall drops engrams weaker than this.
    pub focused_min_strength: f64,
    /// Shortest stored cue that `creative` recall will match inside a keyword.
    pub creative_min_cue_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 7421,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let memory_dir = default_hippo_dir()
            .join("roles")
            .to_string_lossy()
            .into_owned();
        Self {
            memory_dir,
            in_memory: false,
        }
    }
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            default_mode: RecallMode::Balanced,
            min_keyword_chars: 1,
            focused_min_strength: 0.0,
            creative_min_cue_chars: 2,
        }
    }
}

/// Returns `~/.hippocampus/`
pub fn default_hippo_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hippocampus")
}

/// Returns the default config file path: `~/.hippocampus/config.toml`
pub fn default_config_path() -> PathBuf {
    default_hippo_dir().join("config.toml")
}

impl HippoConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            HippoConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (HIPPO_MEMORY_DIR, HIPPO_LOG_LEVEL,
    /// HIPPO_DEFAULT_MODE, HIPPO_TRANSPORT).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HIPPO_MEMORY_DIR") {
            self.storage.memory_dir = val;
        }
        if let Ok(val) = std::env::var("HIPPO_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("HIPPO_TRANSPORT") {
            self.server.transport = val;
        }
        if let Ok(val) = std::env::var("HIPPO_DEFAULT_MODE") {
            match val.parse() {
                Ok(mode) => self.recall.default_mode = mode,
                Err(e) => warn!(value = %val, "ignoring HIPPO_DEFAULT_MODE: {e}"),
            }
        }
    }

    /// Resolve the memory directory, expanding `~` if needed.
    pub fn resolved_memory_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.memory_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = HippoConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.recall.default_mode, RecallMode::Balanced);
        assert_eq!(config.recall.min_keyword_chars, 1);
        assert!(!config.storage.in_memory);
        assert!(config.storage.memory_dir.ends_with("roles"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
port = 9000

[storage]
memory_dir = "/tmp/hippo"

[recall]
default_mode = "focused"
min_keyword_chars = 2
"#;
        let config: HippoConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.memory_dir, "/tmp/hippo");
        assert_eq!(config.recall.default_mode, RecallMode::Focused);
        assert_eq!(config.recall.min_keyword_chars, 2);
        // defaults still apply for unset fields
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.recall.creative_min_cue_chars, 2);
    }

    #[test]
    fn unknown_mode_in_toml_is_rejected() {
        let toml_str = r#"
[recall]
default_mode = "dreamy"
"#;
        assert!(toml::from_str::<HippoConfig>(toml_str).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = HippoConfig::default();
        std::env::set_var("HIPPO_MEMORY_DIR", "/tmp/override");
        std::env::set_var("HIPPO_LOG_LEVEL", "trace");
        std::env::set_var("HIPPO_DEFAULT_MODE", "creative");

        config.apply_env_overrides();

        assert_eq!(config.storage.memory_dir, "/tmp/override");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.recall.default_mode, RecallMode::Creative);

        // Clean up
        std::env::remove_var("HIPPO_MEMORY_DIR");
        std::env::remove_var("HIPPO_LOG_LEVEL");
        std::env::remove_var("HIPPO_DEFAULT_MODE");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/lib/hippo"), PathBuf::from("/var/lib/hippo"));
        assert!(expand_tilde("~/x").ends_with("x"));
    }
}
