//! Structured event definitions for logging.
//!
//! Every event carries the run ID, the editing session when one exists, and
//! the stage of the builder that produced it.

use serde::{Deserialize, Serialize};

/// Stages a specification passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Applying structural and value edits.
    Edit,
    /// Probability vector checks.
    Validate,
    /// Flattening to the wire map.
    Serialize,
    /// Reading a wire map back.
    Decode,
    /// Scatter plot hand-off.
    Render,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Edit => "edit",
            Stage::Validate => "validate",
            Stage::Serialize => "serialize",
            Stage::Decode => "decode",
            Stage::Render => "render",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Session lifecycle
    pub const SESSION_STARTED: &str = "session.started";
    pub const SESSION_FINISHED: &str = "session.finished";
    pub const COMMAND_APPLIED: &str = "session.command_applied";
    pub const COMMAND_REJECTED: &str = "session.command_rejected";

    // Model edits
    pub const STATE_ADDED: &str = "edit.state_added";
    pub const STATE_REMOVED: &str = "edit.state_removed";
    pub const STATE_RENAMED: &str = "edit.state_renamed";
    pub const STATE_CAPACITY_EXCEEDED: &str = "edit.state_capacity_exceeded";
    pub const EMISSION_MODE_SET: &str = "edit.emission_mode_set";
    pub const COMPONENT_ADDED: &str = "edit.component_added";
    pub const COMPONENT_REMOVED: &str = "edit.component_removed";
    pub const DISTRIBUTION_SET: &str = "edit.distribution_set";
    pub const PROBABILITIES_REBUILT: &str = "edit.probabilities_rebuilt";
    pub const PROBABILITIES_TORN_DOWN: &str = "edit.probabilities_torn_down";

    // Validation
    pub const VECTOR_ACCEPTED: &str = "validate.vector_accepted";
    pub const VECTOR_REJECTED: &str = "validate.vector_rejected";

    // Wire
    pub const SERIALIZE_FINISHED: &str = "serialize.finished";
    pub const SERIALIZE_INCOMPLETE: &str = "serialize.incomplete";
    pub const DECODE_FINISHED: &str = "decode.finished";
    pub const DECODE_FAILED: &str = "decode.failed";

    pub const RENDER_SKIPPED: &str = "render.skipped";

    // Config/init events
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Correlation IDs shared by every event of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub session_id: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            session_id: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_carries_session() {
        let ctx = LogContext::new("run-abc");
        assert!(ctx.session_id.is_none());
        let ctx = ctx.with_session_id("hs-20260115-143022-b2c3");
        assert_eq!(ctx.run_id, "run-abc");
        assert_eq!(ctx.session_id.as_deref(), Some("hs-20260115-143022-b2c3"));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Serialize.to_string(), "serialize");
        assert_eq!(serde_json::to_string(&Stage::Render).unwrap(), "\"render\"");
    }
}
