//! Configuration validation errors and semantic validation.

use hs_math::SumCheck;
use thiserror::Error;

use crate::builder::BuilderConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Schema validation failed: {0}")]
    SchemaError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 51,
            ValidationError::SchemaError(_) => 52,
            ValidationError::InvalidValue { .. } => 53,
            ValidationError::VersionMismatch { .. } => 54,
        }
    }
}

/// Validate a builder configuration semantically.
pub fn validate_config(config: &BuilderConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    let limits = &config.limits;
    if limits.max_states == 0 || limits.max_states > crate::MAX_STATES_CEILING {
        return Err(ValidationError::InvalidValue {
            field: "limits.max_states".to_string(),
            message: format!(
                "Must be in [1, {}], got {}",
                crate::MAX_STATES_CEILING,
                limits.max_states
            ),
        });
    }

    if limits.min_states_for_probabilities == 0
        || limits.min_states_for_probabilities > limits.max_states
    {
        return Err(ValidationError::InvalidValue {
            field: "limits.min_states_for_probabilities".to_string(),
            message: format!(
                "Must be in [1, max_states={}], got {}",
                limits.max_states, limits.min_states_for_probabilities
            ),
        });
    }

    validate_sum_check(&config.sum_check)?;

    Ok(())
}

fn validate_sum_check(check: &SumCheck) -> ValidationResult<()> {
    if let SumCheck::Tolerance { epsilon } = *check {
        if !epsilon.is_finite() || epsilon <= 0.0 || epsilon >= 1.0 {
            return Err(ValidationError::InvalidValue {
                field: "sum_check.epsilon".to_string(),
                message: format!("Must be in (0, 1), got {}", epsilon),
            });
        }
    }
    Ok(())
}
