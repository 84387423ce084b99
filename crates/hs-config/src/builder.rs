//! Builder configuration types.
//!
//! A configuration file may be TOML or JSON; the format is chosen by file
//! extension, with `.json` parsed as JSON and everything else as TOML.
//!
//! ```toml
//! schema_version = "1.0.0"
//! component_indices = "monotonic"
//! enforce_uniform_bounds = true
//! require_model_name = false
//!
//! [limits]
//! max_states = 6
//! min_states_for_probabilities = 2
//!
//! [sum_check]
//! mode = "tolerance"
//! epsilon = 1e-6
//! ```

use hs_math::SumCheck;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::validate::ValidationError;

/// Complete builder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// How mixture component indices behave after a removal.
    #[serde(default)]
    pub component_indices: ComponentIndexPolicy,

    /// Reject Uniform components whose lower bound exceeds the upper bound.
    #[serde(default = "default_true")]
    pub enforce_uniform_bounds: bool,

    /// Treat a specification without a model name as incomplete.
    #[serde(default)]
    pub require_model_name: bool,

    // Tables last so the TOML rendering stays valid.
    #[serde(default)]
    pub limits: Limits,

    /// How probability vectors are compared against 1.
    #[serde(default)]
    pub sum_check: SumCheck,
}

fn default_true() -> bool {
    true
}

/// Shape constants for the state registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum number of states.
    pub max_states: usize,
    /// Below this count the initial vector and transition matrix do not exist.
    pub min_states_for_probabilities: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_states: crate::MAX_STATES_CEILING,
            min_states_for_probabilities: 2,
        }
    }
}

/// Index assignment for mixture components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentIndexPolicy {
    /// Indices come from a per-state counter that is never decremented;
    /// removing a component leaves a gap.
    #[default]
    Monotonic,
    /// Indices are recomputed to `0..len` after every removal.
    Renumber,
}

impl fmt::Display for ComponentIndexPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentIndexPolicy::Monotonic => write!(f, "monotonic"),
            ComponentIndexPolicy::Renumber => write!(f, "renumber"),
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            component_indices: ComponentIndexPolicy::default(),
            enforce_uniform_bounds: true,
            require_model_name: false,
            limits: Limits::default(),
            sum_check: SumCheck::default(),
        }
    }
}

impl BuilderConfig {
    /// Load configuration from a file, picking the parser by extension.
    pub fn from_file(path: &Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        if is_json_path(path) {
            Self::parse_json(&content)
        } else {
            Self::parse_toml(&content)
        }
    }

    /// Parse configuration from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(text: &str) -> Result<Self, ValidationError> {
        toml::from_str(text)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ValidationError> {
        toml::to_string_pretty(self)
            .map_err(|e| ValidationError::SchemaError(format!("Cannot render TOML: {}", e)))
    }
}

pub(crate) fn is_json_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml() {
        let config = BuilderConfig::parse_toml(r#"schema_version = "1.0.0""#).unwrap();
        assert_eq!(config, BuilderConfig::default());
    }

    #[test]
    fn test_parse_full_json() {
        let json = r#"{
            "schema_version": "1.0.0",
            "limits": { "max_states": 4, "min_states_for_probabilities": 2 },
            "sum_check": { "mode": "exact" },
            "component_indices": "renumber",
            "enforce_uniform_bounds": false,
            "require_model_name": true
        }"#;
        let config = BuilderConfig::parse_json(json).unwrap();
        assert_eq!(config.limits.max_states, 4);
        assert_eq!(config.sum_check, SumCheck::Exact);
        assert_eq!(config.component_indices, ComponentIndexPolicy::Renumber);
        assert!(!config.enforce_uniform_bounds);
        assert!(config.require_model_name);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = BuilderConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(BuilderConfig::parse_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = BuilderConfig::parse_json("{ not json").unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }

    #[test]
    fn test_json_extension_detection() {
        assert!(is_json_path(Path::new("builder.json")));
        assert!(is_json_path(Path::new("BUILDER.JSON")));
        assert!(!is_json_path(Path::new("builder.toml")));
        assert!(!is_json_path(Path::new("builder")));
    }
}
