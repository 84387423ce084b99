//! Exit codes for the hmmspec CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-2: Operational outcomes (the specification's state)
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors

use hs_common::Error;

/// Exit codes for hmmspec operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Operational Outcomes (0-2)
    // ========================================================================
    /// Specification is complete and every command applied
    Clean = 0,

    /// Specification still has open problems
    Incomplete = 1,

    /// At least one command was rejected; takes precedence over `Incomplete`
    CommandsRejected = 2,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments or undecodable input
    ArgsError = 10,

    /// Configuration could not be loaded or failed validation
    ConfigError = 11,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Only a clean run counts as success.
    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Codes 0-2 describe the specification, not a failure of the tool.
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Map a library error to the exit code a command failing with it reports.
    pub fn for_error(err: &Error) -> ExitCode {
        match err {
            Error::CapacityExceeded { .. }
            | Error::NotFound { .. }
            | Error::InvalidCommand(_)
            | Error::InvalidValue { .. }
            | Error::ValidationFailed { .. } => ExitCode::CommandsRejected,
            Error::IncompleteSpecification { .. } => ExitCode::Incomplete,
            Error::Decode(_) | Error::Json(_) => ExitCode::ArgsError,
            Error::Config(_) => ExitCode::ConfigError,
            Error::Io(_) => ExitCode::IoError,
        }
    }

    /// Outcome of a replay: rejections outrank incompleteness.
    pub fn for_outcome(rejected: usize, complete: bool) -> ExitCode {
        if rejected > 0 {
            ExitCode::CommandsRejected
        } else if !complete {
            ExitCode::Incomplete
        } else {
            ExitCode::Clean
        }
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::Incomplete => "OK_INCOMPLETE",
            ExitCode::CommandsRejected => "ERR_REJECTED",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
