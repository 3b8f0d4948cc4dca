//! Loads the engine configuration from `projector.toml`.
//!
//! The file holds one `[engine]` table. Missing keys fall back to
//! `EngineConfig::default()`; unknown keys are rejected so typos surface.
//!
//! ```toml
//! [engine]
//! compute_method_prefix = "get"
//! numeric_widening = false
//! check_projected_types = true
//! identity_reduction = true
//! ```

use projector_core::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;


///
/// CONSTANTS
///

/// Conventional config file name, looked up in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "projector.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid projector config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// ConfigFile
///
/// Top-level layout of `projector.toml`.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Parse engine configuration from TOML text.
pub fn load_str(text: &str) -> Result<EngineConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(text)?;

    Ok(file.engine)
}

/// Read and parse engine configuration from `path`.
pub fn load_file(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = load_str(&text)?;
    tracing::debug!(path = %path.display(), ?config, "loaded projector config");

    Ok(config)
}

/// Load `projector.toml` from `dir`, or the defaults when the file is absent.
///
/// Any other read failure, and any parse failure, is still an error.
pub fn load_or_default(dir: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = dir.as_ref().join(DEFAULT_CONFIG_FILE);
    match load_file(&path) {
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no projector config, using defaults");
            Ok(EngineConfig::default())
        }
        result => result,
    }
}
