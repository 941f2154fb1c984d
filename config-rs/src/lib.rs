//! config-rs/lib.rs
//! Configuration for the meeting notes service.
//!
//! The schema in [`schema`] declares every key the process reads. A
//! [`ConfigValidator`] checks a snapshot of values once at cold start and the
//! result is turned into a typed [`Config`] that is passed to the components
//! that need it.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub mod schema;
pub mod validator;

pub use schema::{ConfigEntry, FALLBACK_CREDENTIAL, PRIMARY_CREDENTIAL};
pub use validator::{ConfigValidationResult, ConfigValidator, ConfigurationError, ValidateOptions};

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Validated, typed configuration. Built once per process.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    /// Which schema key the credential came from
    pub credential_source: &'static str,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub allowed_origin: String,
    pub environment: Environment,
    pub log_level: String,
    pub log_json: bool,
}

// Keeps credentials out of Debug output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("credential_source", &self.credential_source)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("bind_addr", &self.bind_addr)
            .field("allowed_origin", &self.allowed_origin)
            .field("environment", &self.environment)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Config {
    /// Validates `values` and builds the typed configuration.
    ///
    /// Errors always fail the load, whatever `options.throw_on_error` says:
    /// a process without a usable configuration must not accept traffic.
    pub fn load(
        values: HashMap<String, String>,
        options: ValidateOptions,
    ) -> Result<(Config, ConfigValidationResult), ConfigurationError> {
        Self::from_validator(&ConfigValidator::new(values), options)
    }

    /// Same as [`Config::load`] with values read from the environment and `.env`
    pub fn from_env(options: ValidateOptions) -> Result<(Config, ConfigValidationResult), ConfigurationError> {
        Self::from_validator(&ConfigValidator::from_env(), options)
    }

    fn from_validator(
        validator: &ConfigValidator,
        options: ValidateOptions,
    ) -> Result<(Config, ConfigValidationResult), ConfigurationError> {
        let result = validator.validate(ValidateOptions {
            throw_on_error: true,
            ..options
        })?;

        let (api_key, credential_source) = match validator.value(PRIMARY_CREDENTIAL) {
            Some(key) => (key.to_string(), PRIMARY_CREDENTIAL),
            None => (required(validator, FALLBACK_CREDENTIAL)?.to_string(), FALLBACK_CREDENTIAL),
        };

        let config = Config {
            api_key,
            credential_source,
            api_url: required(validator, "LLM_API_URL")?.to_string(),
            model: required(validator, "LLM_MODEL")?.to_string(),
            timeout: Duration::from_secs(parsed(validator, "LLM_TIMEOUT_SECS")?),
            max_tokens: parsed(validator, "LLM_MAX_TOKENS")?,
            database_url: validator.value("DATABASE_URL").map(str::to_string),
            bind_addr: parsed(validator, "SERVICE_ADDR")?,
            allowed_origin: required(validator, "ALLOWED_ORIGIN")?.to_string(),
            environment: parsed(validator, "APP_ENV")?,
            log_level: required(validator, "LOG_LEVEL")?.to_string(),
            log_json: required(validator, "LOG_FORMAT")? == "json",
        };

        Ok((config, result))
    }
}

fn required<'a>(validator: &'a ConfigValidator, key: &str) -> Result<&'a str, ConfigurationError> {
    validator
        .value_or_default(key)
        .ok_or_else(|| ConfigurationError::Invalid {
            errors: vec![format!("{} is required", key)],
        })
}

fn parsed<T: FromStr>(validator: &ConfigValidator, key: &str) -> Result<T, ConfigurationError> {
    required(validator, key)?
        .parse::<T>()
        .map_err(|_| ConfigurationError::Invalid {
            errors: vec![format!("{} could not be parsed", key)],
        })
}
