use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use quadra::EngineConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub(crate) const CONFIG_PATH_ENV_VAR: &str = "QUADRA_DEMO_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "demo_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct DemoConfig {
    pub(crate) window_title: String,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) target_fps: u32,
    pub(crate) assets_dir: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_title: "Quadra Demo".to_string(),
            window_width: 800,
            window_height: 600,
            target_fps: 60,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

impl DemoConfig {
    pub(crate) fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            window_title: self.window_title.clone(),
            window_width: self.window_width,
            window_height: self.window_height,
            target_fps: self.target_fps,
            ..EngineConfig::default()
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path} (at {}): {source}", .source.path())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_path_to_error::Error<serde_json::Error>,
    },
}

pub(crate) fn load_config(path: &Path) -> Result<DemoConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the effective config: the env-var path if set, the default
/// path otherwise. A missing file means defaults; a broken file is
/// reported and also falls back to defaults rather than aborting.
pub(crate) fn resolve_config() -> DemoConfig {
    let path = env::var(CONFIG_PATH_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    if !path.is_file() {
        info!(path = %path.display(), "config_file_absent_using_defaults");
        return DemoConfig::default();
    }

    match load_config(&path) {
        Ok(config) => {
            info!(path = %path.display(), "config_loaded");
            config
        }
        Err(error) => {
            warn!(error = %error, "config_invalid_using_defaults");
            DemoConfig::default()
        }
    }
}
