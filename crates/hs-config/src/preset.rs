//! Configuration presets for common editing scenarios.
//!
//! Provides pre-built configurations for:
//! - Default: tolerant sum check, monotonic component indices, bound checks on
//! - Legacy: exact sum check and no bound checks, as the browser editor behaved
//! - Strict: tight tolerance, renumbered component indices, bound checks on

use hs_math::SumCheck;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::builder::{BuilderConfig, ComponentIndexPolicy, Limits};

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Tolerant sum check (1e-6), monotonic indices, Uniform bounds enforced
    Default,
    /// Exact sum check, monotonic indices, no bound checks
    Legacy,
    /// Tolerance 1e-9, renumbered indices, Uniform bounds enforced
    Strict,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] =
        &[PresetName::Default, PresetName::Legacy, PresetName::Strict];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Legacy => "legacy",
            PresetName::Strict => "strict",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "default" | "standard" => Some(PresetName::Default),
            "legacy" | "exact" | "compat" => Some(PresetName::Legacy),
            "strict" | "pedantic" => Some(PresetName::Strict),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Default => {
                "Sums within 1e-6 of 1 are accepted; Uniform lower bounds must not exceed upper bounds"
            }
            PresetName::Legacy => {
                "Sums must equal 1 bit for bit and bounds are not checked"
            }
            PresetName::Strict => {
                "Sums within 1e-9 of 1; mixture components renumbered after removal; bounds enforced"
            }
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    UnknownPreset(String),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetError::UnknownPreset(name) => {
                let valid: Vec<&str> = PresetName::ALL.iter().map(|p| p.as_str()).collect();
                write!(
                    f,
                    "unknown preset '{}', expected one of: {}",
                    name,
                    valid.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PresetError {}

/// Summary information about a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: PresetName,
    pub description: String,
    pub sum_check: String,
    pub component_indices: ComponentIndexPolicy,
    pub enforce_uniform_bounds: bool,
    pub require_model_name: bool,
}

/// Build the configuration for a preset.
pub fn get_preset(name: PresetName) -> BuilderConfig {
    match name {
        PresetName::Default => BuilderConfig {
            description: Some(name.description().to_string()),
            ..BuilderConfig::default()
        },
        PresetName::Legacy => BuilderConfig {
            description: Some(name.description().to_string()),
            component_indices: ComponentIndexPolicy::Monotonic,
            enforce_uniform_bounds: false,
            require_model_name: true,
            limits: Limits::default(),
            sum_check: SumCheck::Exact,
            ..BuilderConfig::default()
        },
        PresetName::Strict => BuilderConfig {
            description: Some(name.description().to_string()),
            component_indices: ComponentIndexPolicy::Renumber,
            enforce_uniform_bounds: true,
            limits: Limits::default(),
            sum_check: SumCheck::Tolerance { epsilon: 1e-9 },
            ..BuilderConfig::default()
        },
    }
}

/// List every preset with a short summary.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| {
            let config = get_preset(name);
            PresetInfo {
                name,
                description: name.description().to_string(),
                sum_check: config.sum_check.label(),
                component_indices: config.component_indices,
                enforce_uniform_bounds: config.enforce_uniform_bounds,
                require_model_name: config.require_model_name,
            }
        })
        .collect()
}
