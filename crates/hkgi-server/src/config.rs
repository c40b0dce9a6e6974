//! Server configuration, loaded from an optional TOML file.
//!
//! ```toml
//! save_path = "hkgi.save"
//! snapshot_interval_ms = 30000
//!
//! [engine]
//! tick_ms = 500
//! bag_drop_chance = 0.01
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hkgi_logic::config::EngineConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub engine: EngineConfig,
    /// Where snapshots are written and loaded from
    pub save_path: PathBuf,
    /// How often the store is snapshotted to disk
    pub snapshot_interval_ms: u64,
    /// Manifest override; the bundled manifest is used when unset
    pub manifest_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            save_path: PathBuf::from("hkgi.save"),
            snapshot_interval_ms: 30_000,
            manifest_path: None,
        }
    }
}

impl ServerConfig {
    /// Read `path`, or the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.engine.validate()?;
        anyhow::ensure!(
            config.snapshot_interval_ms > 0,
            "snapshot_interval_ms must be non-zero"
        );
        Ok(config)
    }
}
