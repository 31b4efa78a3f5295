use crate::rollup::RuleSet;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Distinguishes runtime behavior for different stages of deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the rollup tooling.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub rules: RulesConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_target = env::var("APP_LOG_TARGET")
            .map(|value| LogTarget::from_str(&value))
            .unwrap_or_default();

        let rules_path = match env::var("ROLLUP_RULES_PATH") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(PathBuf::from(value.trim())),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => return Err(ConfigError::InvalidRulesPath),
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig {
                log_level,
                target: log_target,
            },
            rules: RulesConfig { path: rules_path },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub target: LogTarget,
}

/// Stream the subscriber writes to. Stdout carries command output, so logs default to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stderr,
    Stdout,
}

impl LogTarget {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdout" | "out" => Self::Stdout,
            _ => Self::Stderr,
        }
    }
}

/// Where the active status rule set comes from.
#[derive(Debug, Clone, Default)]
pub struct RulesConfig {
    pub path: Option<PathBuf>,
}

impl RulesConfig {
    /// Loads the configured rule set, or the built-in defaults when no file is configured.
    pub fn resolve(&self) -> Result<RuleSet, ConfigError> {
        match &self.path {
            Some(path) => load_rule_set(path),
            None => Ok(RuleSet::standard()),
        }
    }
}

pub fn load_rule_set(path: &Path) -> Result<RuleSet, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::RulesRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::RulesParse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRulesPath,
    RulesRead {
        path: PathBuf,
        source: std::io::Error,
    },
    RulesParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRulesPath => write!(f, "ROLLUP_RULES_PATH must be valid unicode"),
            ConfigError::RulesRead { path, .. } => {
                write!(f, "unable to read rule set from {}", path.display())
            }
            ConfigError::RulesParse { path, .. } => {
                write!(f, "rule set at {} is not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidRulesPath => None,
            ConfigError::RulesRead { source, .. } => Some(source),
            ConfigError::RulesParse { source, .. } => Some(source),
        }
    }
}
