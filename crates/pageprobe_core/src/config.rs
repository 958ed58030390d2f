//! Runtime configuration for the extension.
//!
//! Resolution order, later layers win:
//! 1. build-mode defaults (stderr logging, `debug`/`info` level)
//! 2. `PAGEPROBE_LOG_LEVEL` / `PAGEPROBE_LOG_DIR`
//! 3. `log-level=<level>` / `log-dir=<abs path>` init arguments

use crate::args::InitArguments;
use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LogTarget};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ENV_LOG_LEVEL: &str = "PAGEPROBE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PAGEPROBE_LOG_DIR";
pub const ARG_LOG_LEVEL: &str = "log-level";
pub const ARG_LOG_DIR: &str = "log-dir";

/// Resolved extension configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionConfig {
    pub log_level: &'static str,
    pub log_target: LogTarget,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_target: LogTarget::Stderr,
        }
    }
}

impl ExtensionConfig {
    /// Resolves configuration from the process environment and `arguments`.
    pub fn resolve(arguments: &InitArguments) -> Result<Self, ConfigError> {
        Self::resolve_with(arguments, |key| std::env::var(key).ok())
    }

    /// Resolves configuration with an injectable environment lookup.
    ///
    /// Blank environment values count as unset; blank argument values are errors.
    pub fn resolve_with(
        arguments: &InitArguments,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let env_value = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        if let Some(level) = env_value(ENV_LOG_LEVEL) {
            config.log_level = parse_level(&level)?;
        }
        if let Some(dir) = env_value(ENV_LOG_DIR) {
            config.log_target = parse_log_dir(&dir)?;
        }

        if let Some(level) = arguments.value_of(ARG_LOG_LEVEL) {
            config.log_level = parse_level(level)?;
        }
        if let Some(dir) = arguments.value_of(ARG_LOG_DIR) {
            config.log_target = parse_log_dir(dir)?;
        }

        Ok(config)
    }
}

fn parse_level(value: &str) -> Result<&'static str, ConfigError> {
    normalize_level(value).map_err(|_| ConfigError::InvalidLevel(value.trim().to_string()))
}

fn parse_log_dir(value: &str) -> Result<LogTarget, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyLogDir);
    }
    normalize_log_dir(value)
        .map(LogTarget::Directory)
        .map_err(|_| ConfigError::RelativeLogDir(value.trim().to_string()))
}

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLevel(String),
    EmptyLogDir,
    RelativeLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyLogDir => write!(f, "log dir cannot be empty"),
            Self::RelativeLogDir(value) => {
                write!(f, "log dir must be an absolute path, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ExtensionConfig, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::args::InitArguments;
    use crate::logging::{default_log_level, LogTarget};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env_or_arguments() {
        let config = ExtensionConfig::resolve_with(&InitArguments::default(), env_of(&[]))
            .expect("defaults resolve");
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_target, LogTarget::Stderr);
    }

    #[test]
    fn environment_overrides_defaults_and_blank_values_are_ignored() {
        let config = ExtensionConfig::resolve_with(
            &InitArguments::default(),
            env_of(&[(ENV_LOG_LEVEL, "WARN"), (ENV_LOG_DIR, "   ")]),
        )
        .expect("env resolves");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_target, LogTarget::Stderr);
    }

    #[test]
    fn arguments_override_environment() {
        let args: InitArguments = ["first", "log-level=error", "log-dir=/var/log/pageprobe"]
            .into_iter()
            .collect();
        let config = ExtensionConfig::resolve_with(
            &args,
            env_of(&[(ENV_LOG_LEVEL, "trace"), (ENV_LOG_DIR, "/tmp/env-logs")]),
        )
        .expect("arguments resolve");
        assert_eq!(config.log_level, "error");
        assert_eq!(
            config.log_target,
            LogTarget::Directory(PathBuf::from("/var/log/pageprobe"))
        );
    }

    #[test]
    fn rejects_invalid_values() {
        let args: InitArguments = ["log-level=loud"].into_iter().collect();
        let err = ExtensionConfig::resolve_with(&args, env_of(&[])).expect_err("bad level");
        assert_eq!(err, ConfigError::InvalidLevel("loud".to_string()));

        let args: InitArguments = ["log-dir=relative/logs"].into_iter().collect();
        let err = ExtensionConfig::resolve_with(&args, env_of(&[])).expect_err("relative dir");
        assert_eq!(err, ConfigError::RelativeLogDir("relative/logs".to_string()));

        let args: InitArguments = ["log-dir="].into_iter().collect();
        let err = ExtensionConfig::resolve_with(&args, env_of(&[])).expect_err("empty dir");
        assert_eq!(err, ConfigError::EmptyLogDir);
    }
}
