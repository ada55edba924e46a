use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{GateConfig, CONFIG_FILE_NAME};

/// Discovers the configuration file by traversing up the directory tree
pub fn discover_config(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Loads configuration with auto-discovery support
///
/// If `explicit_path` is provided, loads config from that path.
/// Otherwise, auto-discovers config by traversing up directory tree from cwd.
///
/// Returns Ok(None) if no config is found (neither explicit nor discovered).
pub fn load_config_with_discovery(explicit_path: Option<&str>) -> Result<Option<GateConfig>> {
    if let Some(config_path) = explicit_path {
        return Ok(Some(GateConfig::from_file(config_path)?));
    }

    let current_dir =
        std::env::current_dir().context("Failed to get current directory for config discovery")?;

    match discover_config(&current_dir) {
        Some(discovered_path) => {
            tracing::debug!("Using config: {}", discovered_path.display());
            Ok(Some(GateConfig::from_file(&discovered_path)?))
        }
        None => Ok(None),
    }
}

/// Like [`load_config_with_discovery`], but a missing config is an error
pub fn require_config(explicit_path: Option<&str>) -> Result<GateConfig> {
    load_config_with_discovery(explicit_path)?.ok_or_else(|| {
        anyhow::anyhow!(
            "No {} found in the current directory or any parent. Run `trang-gate init` to create one.",
            CONFIG_FILE_NAME
        )
    })
}
