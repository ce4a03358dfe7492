//! Configuration file lookup

use anyhow::{Context, Result};
use jotter_core::NetworkConfig;
use std::path::{Path, PathBuf};

/// Load the network configuration and apply `JOTTER_*` overrides.
///
/// When `path` does not exist, `~/.jotter/config.toml` is tried before
/// falling back to defaults.
pub fn load_config(path: &Path) -> Result<NetworkConfig> {
    let path = resolve(path);
    tracing::debug!(path = %path.display(), "loading network config");

    let mut config = NetworkConfig::load(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.merge_with_env()?;
    Ok(config)
}

fn resolve(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    dirs::home_dir()
        .map(|home| home.join(".jotter").join("config.toml"))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
