//! hmmspec configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the builder configuration (builder.toml / builder.json)
//! - Built-in presets (default, legacy, strict)
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation
//! - Config snapshots attached to serialized output

pub mod builder;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use builder::{BuilderConfig, ComponentIndexPolicy, Limits};
pub use preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::{ConfigSnapshot, ConfigSummary};
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Hard ceiling on the number of states; part of the wire contract.
pub const MAX_STATES_CEILING: usize = 6;
