//! Configuration loading for the hmmspec CLI.
//!
//! This module handles:
//! - Resolving the builder config file (CLI > env > XDG > system > defaults)
//! - Applying a named preset, which wins over any file
//! - Semantic validation via hs-config
//! - Config snapshot generation for output envelopes

pub use hs_config::validate::ValidationError;
pub use hs_config::{
    get_preset, list_presets, BuilderConfig, ConfigSnapshot, ConfigSource, PresetError, PresetInfo,
    PresetName,
};

use hs_config::{resolve_config, validate_config, ConfigPaths};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::logging::event_names;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Preset(#[from] PresetError),
}

impl From<ConfigError> for hs_common::Error {
    fn from(err: ConfigError) -> Self {
        hs_common::Error::Config(err.to_string())
    }
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Directory searched for builder.toml / builder.json.
    pub config_dir: Option<PathBuf>,
    /// Explicit config file; must exist.
    pub config_path: Option<PathBuf>,
    /// Named preset; bypasses file resolution entirely.
    pub preset: Option<String>,
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: BuilderConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
    pub preset: Option<PresetName>,
}

impl ResolvedConfig {
    /// Snapshot for output envelopes.
    pub fn snapshot(&self) -> ConfigSnapshot {
        let paths = ConfigPaths {
            config: self.path.clone(),
            source: self.source.clone(),
        };
        ConfigSnapshot::new(&self.config, &paths, self.preset.map(|p| p.as_str()))
    }
}

/// Load configuration with the standard resolution order.
///
/// A preset short-circuits file discovery. Otherwise the first config file
/// found is parsed and validated; with none found the built-in defaults apply.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    if let Some(name) = &options.preset {
        let preset: PresetName = name.parse()?;
        let config = get_preset(preset);
        validate_config(&config)?;
        info!(event = event_names::CONFIG_LOADED, preset = preset.as_str(), "using preset");
        return Ok(ResolvedConfig {
            config,
            path: None,
            source: ConfigSource::Preset,
            preset: Some(preset),
        });
    }

    if let Some(path) = &options.config_path {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
    }

    let paths = resolve_config(options.config_path.as_deref(), options.config_dir.as_deref());
    let Some(path) = paths.config else {
        debug!(event = event_names::CONFIG_DEFAULT_USED, "no config file found, using defaults");
        return Ok(ResolvedConfig {
            config: BuilderConfig::default(),
            path: None,
            source: ConfigSource::BuiltinDefault,
            preset: None,
        });
    };

    let config = BuilderConfig::from_file(&path)?;
    validate_config(&config)?;
    info!(
        event = event_names::CONFIG_LOADED,
        path = %path.display(),
        source = %paths.source,
        "config loaded"
    );
    Ok(ResolvedConfig {
        config,
        path: Some(path),
        source: paths.source,
        preset: None,
    })
}

/// Load and validate one file without resolution.
pub fn load_config_file(path: &std::path::Path) -> Result<BuilderConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let config = BuilderConfig::from_file(path)?;
    validate_config(&config)?;
    Ok(config)
}
