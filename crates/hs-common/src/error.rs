//! Error types for hmmspec.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints (every editing error leaves the session usable)
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ State Limit Reached
//!   Reason: cannot add more than 6 states
//!   Fix: Remove a state before adding another one.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 30,
//!   "category": "validation",
//!   "message": "transition row 2 sums to 0.9, expected 1",
//!   "recoverable": true,
//!   "suggested_action": "edit_values",
//!   "context": { "scope": "transition row 2", "sum": 0.9 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for hmmspec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Adding/removing states or components.
    Structure,
    /// Malformed or inapplicable editing commands.
    Command,
    /// Probability vectors and completeness checks.
    Validation,
    /// Decoding the flat wire mapping.
    Wire,
    /// Builder configuration.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Structure => write!(f, "structure"),
            ErrorCategory::Command => write!(f, "command"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Wire => write!(f, "wire"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested follow-ups for tooling that drives an editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Remove a state before adding another.
    RemoveState,
    /// Correct the entered probabilities.
    EditValues,
    /// Fill in the fields listed by the error.
    CompleteFields,
    /// Fix the command text or its arguments.
    FixCommand,
    /// Reset configuration to defaults.
    ResetConfig,
    /// Retry the operation.
    Retry,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::RemoveState => write!(f, "remove_state"),
            SuggestedAction::EditValues => write!(f, "edit_values"),
            SuggestedAction::CompleteFields => write!(f, "complete_fields"),
            SuggestedAction::FixCommand => write!(f, "fix_command"),
            SuggestedAction::ResetConfig => write!(f, "reset_config"),
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for hmmspec.
#[derive(Error, Debug)]
pub enum Error {
    // Structure errors (10-19)
    #[error("cannot add more than {max} states")]
    CapacityExceeded { max: usize },

    #[error("{what} not found")]
    NotFound { what: String },

    // Command errors (20-29)
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    // Validation errors (30-39)
    #[error("{scope} sums to {sum}, expected 1")]
    ValidationFailed { scope: String, sum: f64 },

    #[error("specification is incomplete: {}", .problems.join("; "))]
    IncompleteSpecification { problems: Vec<String> },

    // Wire errors (40-49)
    #[error("cannot decode wire mapping: {0}")]
    Decode(String),

    // Configuration errors (50-59)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] with a formatted subject.
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound { what: what.into() }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Structure errors
    /// - 20-29: Command errors
    /// - 30-39: Validation errors
    /// - 40-49: Wire errors
    /// - 50-59: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::CapacityExceeded { .. } => 10,
            Error::NotFound { .. } => 11,
            Error::InvalidCommand(_) => 20,
            Error::InvalidValue { .. } => 21,
            Error::ValidationFailed { .. } => 30,
            Error::IncompleteSpecification { .. } => 31,
            Error::Decode(_) => 40,
            Error::Config(_) => 50,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::CapacityExceeded { .. } | Error::NotFound { .. } => ErrorCategory::Structure,
            Error::InvalidCommand(_) | Error::InvalidValue { .. } => ErrorCategory::Command,
            Error::ValidationFailed { .. } | Error::IncompleteSpecification { .. } => {
                ErrorCategory::Validation
            }
            Error::Decode(_) => ErrorCategory::Wire,
            Error::Config(_) => ErrorCategory::Config,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether the editing session can continue after this error.
    ///
    /// Every model error is recovered locally; only environment failures
    /// outside the session are treated as unrecoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::CapacityExceeded { .. }
            | Error::NotFound { .. }
            | Error::InvalidCommand(_)
            | Error::InvalidValue { .. }
            | Error::ValidationFailed { .. }
            | Error::IncompleteSpecification { .. } => true,
            Error::Decode(_) => false,
            Error::Config(_) => true,
            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Whether the error should be surfaced as a blocking notice rather
    /// than an inline warning.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Error::CapacityExceeded { .. })
    }

    /// Returns the suggested action for tooling.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::CapacityExceeded { .. } => SuggestedAction::RemoveState,
            Error::NotFound { .. } => SuggestedAction::FixCommand,
            Error::InvalidCommand(_) => SuggestedAction::FixCommand,
            Error::InvalidValue { .. } => SuggestedAction::EditValues,
            Error::ValidationFailed { .. } => SuggestedAction::EditValues,
            Error::IncompleteSpecification { .. } => SuggestedAction::CompleteFields,
            Error::Decode(_) => SuggestedAction::ManualIntervention,
            Error::Config(_) => SuggestedAction::ResetConfig,
            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::CapacityExceeded { .. } => "Remove a state before adding another one.",
            Error::NotFound { .. } => {
                "Check the state or component index; indices shift down after a removal."
            }
            Error::InvalidCommand(_) => {
                "Check the command name and arguments. Run 'hmmspec run --help' for the script syntax."
            }
            Error::InvalidValue { .. } => {
                "Parameters must be finite, non-negative numbers for the chosen distribution."
            }
            Error::ValidationFailed { .. } => {
                "Adjust the entries so that they add up to exactly 1."
            }
            Error::IncompleteSpecification { .. } => {
                "Fill in every listed field and resolve every probability warning, then serialize again."
            }
            Error::Decode(_) => {
                "The wire mapping does not follow the State[n][...] key scheme. Regenerate it with 'hmmspec run'."
            }
            Error::Config(_) => {
                "Run 'hmmspec config validate' or fall back to the built-in defaults with '--preset default'."
            }
            Error::Io(_) => "Check that the file exists and is readable, then retry.",
            Error::Json(_) => "Invalid JSON input. Check syntax with 'jq .' before retrying.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::CapacityExceeded { .. } => "State Limit Reached",
            Error::NotFound { .. } => "Not Found",
            Error::InvalidCommand(_) => "Invalid Command",
            Error::InvalidValue { .. } => "Invalid Value",
            Error::ValidationFailed { .. } => "Probabilities Do Not Sum To 1",
            Error::IncompleteSpecification { .. } => "Incomplete Specification",
            Error::Decode(_) => "Wire Decode Error",
            Error::Config(_) => "Configuration Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the session can continue.
    pub recoverable: bool,

    /// Suggested follow-up.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (scope, sum, missing fields).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::CapacityExceeded { max } => {
                context.insert("max_states".to_string(), serde_json::json!(max));
            }
            Error::ValidationFailed { scope, sum } => {
                context.insert("scope".to_string(), serde_json::json!(scope));
                context.insert("sum".to_string(), serde_json::json!(sum));
            }
            Error::IncompleteSpecification { problems } => {
                context.insert("problems".to_string(), serde_json::json!(problems));
            }
            Error::InvalidValue { field, .. } => {
                context.insert("field".to_string(), serde_json::json!(field));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
