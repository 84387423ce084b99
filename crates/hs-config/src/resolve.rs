//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI arguments → environment variables → XDG paths → system → defaults.

use std::path::{Path, PathBuf};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to the builder config (or None if not found).
    pub config: Option<PathBuf>,

    /// Source of the builder config (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/hmmspec/.
    SystemConfig,

    /// A named preset was requested.
    Preset,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::Preset => write!(f, "preset"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "HMMSPEC_CONFIG";
pub const ENV_CONFIG_DIR: &str = "HMMSPEC_CONFIG_DIR";

/// Standard config file names, in lookup order.
pub const CONFIG_FILENAMES: [&str; 2] = ["builder.toml", "builder.json"];

/// Application name for XDG directories.
const APP_NAME: &str = "hmmspec";

/// Resolve the builder config path using the standard resolution order.
///
/// Resolution order:
/// 1. Explicit CLI file path (if provided and present)
/// 2. Explicit CLI config directory
/// 3. HMMSPEC_CONFIG environment variable (direct path)
/// 4. HMMSPEC_CONFIG_DIR environment variable + filename
/// 5. XDG config directory (~/.config/hmmspec/)
/// 6. System config (/etc/hmmspec/)
/// 7. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>, cli_dir: Option<&Path>) -> ConfigPaths {
    // 1. CLI file
    if let Some(path) = cli_path {
        if path.exists() {
            return found(path.to_path_buf(), ConfigSource::CliArgument);
        }
    }

    // 2. CLI directory
    if let Some(dir) = cli_dir {
        if let Some(path) = find_in_dir(dir) {
            return found(path, ConfigSource::CliArgument);
        }
    }

    // 3. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    // 4. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = find_in_dir(Path::new(&config_dir)) {
            return found(path, ConfigSource::Environment);
        }
    }

    // 5. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        if let Some(path) = find_in_dir(&dir) {
            return found(path, ConfigSource::XdgConfig);
        }
    }

    // 6. System config
    if let Some(path) = find_in_dir(&system_config_dir()) {
        return found(path, ConfigSource::SystemConfig);
    }

    // 7. Built-in default (None)
    ConfigPaths::default()
}

fn found(path: PathBuf, source: ConfigSource) -> ConfigPaths {
    ConfigPaths {
        config: Some(path),
        source,
    }
}

/// First standard config file present in `dir`.
pub fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Get the XDG config directory for hmmspec.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(format!("{}", ConfigSource::Preset), "preset");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_cli_dir_prefers_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("builder.json"), "{}").unwrap();
        std::fs::write(dir.path().join("builder.toml"), "").unwrap();

        let paths = resolve_config(None, Some(dir.path()));
        assert_eq!(paths.source, ConfigSource::CliArgument);
        assert_eq!(paths.config, Some(dir.path().join("builder.toml")));
    }

    #[test]
    fn test_missing_cli_file_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let paths = resolve_config(Some(&dir.path().join("absent.toml")), Some(dir.path()));
        assert_ne!(paths.source, ConfigSource::CliArgument);
    }

    #[test]
    fn test_xdg_config_dir() {
        if let Some(path) = xdg_config_dir() {
            assert!(path.ends_with(APP_NAME));
        }
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/hmmspec"));
    }
}
