//! Configuration conventions both binaries follow: `configuration/base.yaml`,
//! then `configuration/<APP_ENVIRONMENT>.yaml`, then prefixed environment
//! variables with `__` between nested keys.

use serde::{Deserialize, Deserializer};
use std::{path::Path, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    /// Reads `APP_ENVIRONMENT`, `local` when unset.
    pub fn from_env() -> Result<Self, String> {
        std::env::var("APP_ENVIRONMENT").map_or(Ok(Self::Local), |value| value.parse())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Local, Self::Production]
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown environment `{s}`, expected `local` or `production`"))
    }
}

/// Minimum level handed to the tracing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Debug, Self::Info]
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown log level `{s}`, expected `debug` or `info`"))
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Stacks the YAML files found in `directory` for `environment` under
/// variables named `<env_prefix>_SECTION__KEY`.
pub fn layered(
    directory: &Path,
    environment: Environment,
    env_prefix: &str,
) -> Result<config::Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from(directory.join("base.yaml")))
        .add_source(config::File::from(
            directory.join(format!("{}.yaml", environment.as_str())),
        ))
        .add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
}

/// `layered` over `./configuration` for the environment named by
/// `APP_ENVIRONMENT`.
pub fn load(env_prefix: &str) -> Result<config::Config, config::ConfigError> {
    let directory = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("current directory: {}", e)))?
        .join("configuration");
    let environment = Environment::from_env().map_err(config::ConfigError::Message)?;

    layered(&directory, environment, env_prefix)
}
