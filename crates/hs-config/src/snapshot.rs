//! Configuration snapshots attached to serialized output.
//!
//! A snapshot records exactly which builder settings validated a
//! specification, so a downstream consumer can tell whether two wire maps were
//! accepted under the same rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::builder::{BuilderConfig, ComponentIndexPolicy};
use crate::resolve::{ConfigPaths, ConfigSource};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the configuration was loaded from.
    #[serde(default)]
    pub config_path: Option<String>,

    /// Source of the configuration.
    pub config_source: String,

    /// Preset name, when a preset was used.
    #[serde(default)]
    pub preset: Option<String>,

    /// SHA-256 of the canonical JSON rendering of the effective config.
    pub config_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub max_states: usize,
    pub min_states_for_probabilities: usize,
    pub sum_check: String,
    pub component_indices: ComponentIndexPolicy,
    pub enforce_uniform_bounds: bool,
    #[serde(default)]
    pub require_model_name: bool,
}

impl ConfigSnapshot {
    /// Create a new snapshot of the effective configuration.
    pub fn new(config: &BuilderConfig, paths: &ConfigPaths, preset: Option<&str>) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_path: paths.config.as_ref().map(|p| p.display().to_string()),
            config_source: paths.source.to_string(),
            preset: preset.map(str::to_string),
            config_hash: hash_config(config),
            summary: build_summary(config),
        }
    }

    /// Create a snapshot of the built-in defaults.
    pub fn defaults_only() -> Self {
        let paths = ConfigPaths {
            config: None,
            source: ConfigSource::BuiltinDefault,
        };
        Self::new(&BuilderConfig::default(), &paths, None)
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same effective config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash == other.config_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.config_hash[..12.min(self.config_hash.len())]
    }
}

fn build_summary(config: &BuilderConfig) -> ConfigSummary {
    ConfigSummary {
        max_states: config.limits.max_states,
        min_states_for_probabilities: config.limits.min_states_for_probabilities,
        sum_check: config.sum_check.label(),
        component_indices: config.component_indices,
        enforce_uniform_bounds: config.enforce_uniform_bounds,
        require_model_name: config.require_model_name,
    }
}

/// Hash the effective config; the description does not affect behaviour and
/// is left out.
fn hash_config(config: &BuilderConfig) -> String {
    let canonical = BuilderConfig {
        description: None,
        ..config.clone()
    };
    let json = serde_json::to_string(&canonical).unwrap_or_default();
    hash_content(&json)
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
