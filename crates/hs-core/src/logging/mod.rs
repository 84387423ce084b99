//! Structured logging for hmmspec.
//!
//! - stdout is reserved for command payloads (JSON/MD output)
//! - stderr receives all log output (human or JSONL)
//! - events carry correlation IDs (run_id, session_id)
//!
//! ```ignore
//! use hs_core::logging::{init_logging, LogConfig, LogContext, Stage, event_names};
//!
//! init_logging(&LogConfig::resolve(verbose, quiet, None));
//! let ctx = LogContext::new(generate_run_id()).with_session_id(session.id().to_string());
//! log_event!(ctx, INFO, event_names::SESSION_STARTED, Stage::Init, "editing session opened");
//! ```

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat};
pub use events::{event_names, LogContext, Stage};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging subsystem.
///
/// Must be called once at startup. A second call is ignored.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::new(format!("hs_core={level},hmmspec={level}", level = config.level));

    let result = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    };
    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("run-{}", &uuid.simple().to_string()[..12])
}

/// Emit a tracing event stamped with the context's correlation IDs.
///
/// ```ignore
/// log_event!(ctx, INFO, event_names::SESSION_FINISHED, Stage::Edit, "script replayed",
///     applied = 12, rejected = 1);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, INFO, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::info!(
            event = $event,
            run_id = %$ctx.run_id,
            session_id = ?$ctx.session_id,
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, DEBUG, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::debug!(
            event = $event,
            run_id = %$ctx.run_id,
            session_id = ?$ctx.session_id,
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, WARN, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::warn!(
            event = $event,
            run_id = %$ctx.run_id,
            session_id = ?$ctx.session_id,
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, ERROR, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::error!(
            event = $event,
            run_id = %$ctx.run_id,
            session_id = ?$ctx.session_id,
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_generate_run_id() {
        let id1 = generate_run_id();
        let id2 = generate_run_id();
        assert!(id1.starts_with("run-"));
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 16);
    }

    #[test]
    fn test_log_event_macro_expands() {
        let ctx = LogContext::new("run-test");
        crate::log_event!(ctx, DEBUG, event_names::SESSION_STARTED, Stage::Init, "opened", commands = 3);
    }

    #[test]
    fn test_double_init_is_harmless() {
        let config = LogConfig {
            level: LevelFilter::OFF,
            ..Default::default()
        };
        init_logging(&config);
        init_logging(&config);
    }
}
