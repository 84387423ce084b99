//! Logging settings for one hmmspec invocation.
//!
//! The level comes from `-q` / `-v`, then `HS_LOG`, then `info`. The format
//! comes from the output format, then `HS_LOG_FORMAT`, then human.

use tracing_subscriber::filter::LevelFilter;

/// Shape of the log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    Jsonl,
}

impl LogFormat {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "human" | "pretty" => Some(LogFormat::Human),
            "json" | "jsonl" => Some(LogFormat::Jsonl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LevelFilter::INFO,
        }
    }
}

impl LogConfig {
    /// Settings for the CLI flags, filled in from `HS_LOG` and `HS_LOG_FORMAT`.
    pub fn resolve(verbose: u8, quiet: bool, format: Option<LogFormat>) -> Self {
        let env_level = std::env::var("HS_LOG").ok();
        let env_format = std::env::var("HS_LOG_FORMAT").ok();
        Self::from_sources(verbose, quiet, format, env_level.as_deref(), env_format.as_deref())
    }

    /// Unparsable environment values are ignored.
    fn from_sources(
        verbose: u8,
        quiet: bool,
        format: Option<LogFormat>,
        env_level: Option<&str>,
        env_format: Option<&str>,
    ) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => LevelFilter::ERROR,
            (false, 0) => env_level
                .and_then(|v| v.trim().parse::<LevelFilter>().ok())
                .unwrap_or(LevelFilter::INFO),
            (false, 1) => LevelFilter::DEBUG,
            (false, _) => LevelFilter::TRACE,
        };
        let format = format
            .or_else(|| env_format.and_then(LogFormat::from_env_value))
            .unwrap_or_default();
        LogConfig { format, level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_flags_or_env() {
        assert_eq!(LogConfig::from_sources(0, false, None, None, None), LogConfig::default());
    }

    #[test]
    fn test_flags_beat_environment() {
        let config = LogConfig::from_sources(1, false, None, Some("error"), None);
        assert_eq!(config.level, LevelFilter::DEBUG);
        let config = LogConfig::from_sources(3, true, None, Some("trace"), None);
        assert_eq!(config.level, LevelFilter::ERROR);
        let config = LogConfig::from_sources(2, false, None, None, None);
        assert_eq!(config.level, LevelFilter::TRACE);
    }

    #[test]
    fn test_environment_level() {
        let config = LogConfig::from_sources(0, false, None, Some("warn"), None);
        assert_eq!(config.level, LevelFilter::WARN);
        let config = LogConfig::from_sources(0, false, None, Some("off"), None);
        assert_eq!(config.level, LevelFilter::OFF);
        let config = LogConfig::from_sources(0, false, None, Some("loud"), None);
        assert_eq!(config.level, LevelFilter::INFO);
    }

    #[test]
    fn test_format_sources() {
        let config = LogConfig::from_sources(0, false, None, None, Some("JSON"));
        assert_eq!(config.format, LogFormat::Jsonl);
        let config = LogConfig::from_sources(0, false, Some(LogFormat::Human), None, Some("jsonl"));
        assert_eq!(config.format, LogFormat::Human);
        let config = LogConfig::from_sources(0, false, None, None, Some("xml"));
        assert_eq!(config.format, LogFormat::Human);
    }
}
