use serde::Deserialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_TASK_FILE: &str = "tasks.json";
pub const ENV_PREFIX: &str = "TASK_CLI";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid log level '{0}', expected one of: DEBUG, INFO, WARN, ERROR")]
    InvalidLogLevel(String),
    #[error("failed to resolve configuration")]
    Source(#[from] config::ConfigError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{name}")
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    path: String,
    log: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub task_file: PathBuf,
    pub log_level: LogLevel,
}

impl Config {
    /// Resolves settings with precedence flag > environment (`TASK_CLI_PATH`,
    /// `TASK_CLI_LOG`) > default. Empty values count as unset.
    pub fn load(file_flag: Option<&str>, log_flag: Option<&str>) -> Result<Self, ConfigError> {
        Self::resolve(file_flag, log_flag, None)
    }

    fn resolve(
        file_flag: Option<&str>,
        log_flag: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);

        let settings = config::Config::builder()
            .set_default("path", DEFAULT_TASK_FILE)?
            .set_default("log", LogLevel::default().to_string())?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .ignore_empty(true)
                    .source(env),
            )
            .set_override_option("path", non_empty(file_flag))?
            .set_override_option("log", non_empty(log_flag))?
            .build()?;

        let raw: RawConfig = settings.try_deserialize()?;
        Ok(Self {
            task_file: PathBuf::from(raw.path),
            log_level: raw.log.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        let mut map = config::Map::new();
        for (key, value) in pairs {
            map.insert(key.to_string(), value.to_string());
        }
        Some(map)
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::resolve(None, None, env(&[])).unwrap();

        assert_eq!(config.task_file, PathBuf::from("tasks.json"));
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = Config::resolve(
            None,
            None,
            env(&[("TASK_CLI_PATH", "/tmp/env.json"), ("TASK_CLI_LOG", "debug")]),
        )
        .unwrap();

        assert_eq!(config.task_file, PathBuf::from("/tmp/env.json"));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_flags_override_environment() {
        let config = Config::resolve(
            Some("flag.json"),
            Some("warn"),
            env(&[("TASK_CLI_PATH", "/tmp/env.json"), ("TASK_CLI_LOG", "debug")]),
        )
        .unwrap();

        assert_eq!(config.task_file, PathBuf::from("flag.json"));
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_empty_flag_falls_back_to_environment() {
        let config =
            Config::resolve(Some(""), Some(""), env(&[("TASK_CLI_LOG", "ERROR")])).unwrap();

        assert_eq!(config.task_file, PathBuf::from("tasks.json"));
        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let result = Config::resolve(None, Some("verbose"), env(&[]));

        assert!(matches!(result, Err(ConfigError::InvalidLogLevel(level)) if level == "verbose"));
    }

    #[test]
    fn test_log_level_parsing_is_case_insensitive() {
        assert_eq!("Debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(tracing::Level::from(LogLevel::Error), tracing::Level::ERROR);
    }
}
