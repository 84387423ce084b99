//! hmmspec common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the hmmspec crates:
//! - Editing-session identifiers for log correlation
//! - The unified error type with stable codes
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;

pub use error::{
    format_error_human, Error, ErrorCategory, Result, StructuredError, SuggestedAction,
};
pub use id::SessionId;
pub use output::OutputFormat;

/// Version of the JSON envelopes emitted by the CLI.
pub const SCHEMA_VERSION: &str = "1.0.0";
