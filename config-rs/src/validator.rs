//! config-rs/validator.rs
//! Cold-start validation of configuration values against the schema.

use std::collections::HashMap;
use std::env;

use thiserror::Error;

use crate::schema::{schema, ConfigEntry, FALLBACK_CREDENTIAL, PRIMARY_CREDENTIAL};

/// Options for a validation pass
#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions {
    /// Fail the call when any error was collected
    pub throw_on_error: bool,
    /// Emit log lines for errors and warnings
    pub log_warnings: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            throw_on_error: false,
            log_warnings: true,
        }
    }
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Every error collected during the pass, in schema order
    #[error("Configuration validation failed: {}", .errors.join("; "))]
    Invalid { errors: Vec<String> },
}

/// Snapshot of configuration values checked against the schema
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    schema: &'static [ConfigEntry],
    values: HashMap<String, String>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl ConfigValidator {
    /// Validates an explicit set of values against the service schema.
    /// Empty and whitespace-only values count as absent.
    pub fn new(values: HashMap<String, String>) -> Self {
        Self::with_schema(values, schema())
    }

    /// Validates `values` against a caller-supplied schema
    pub fn with_schema(values: HashMap<String, String>, schema: &'static [ConfigEntry]) -> Self {
        let values = values
            .into_iter()
            .filter_map(|(key, value)| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| (key, trimmed.to_string()))
            })
            .collect();
        Self { schema, values }
    }

    /// Reads every schema key from the process environment, after loading
    /// `.env` if one exists.
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_ok() {
            log::debug!("Loaded configuration overrides from .env");
        }
        let values = schema()
            .iter()
            .filter_map(|entry| env::var(entry.key).ok().map(|value| (entry.key.to_string(), value)))
            .collect();
        Self::new(values)
    }

    /// Raw value for `key`, if present
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, falling back to the schema default
    pub fn value_or_default(&self, key: &str) -> Option<&str> {
        self.value(key)
            .or_else(|| self.entry(key).and_then(|entry| entry.default))
    }

    fn entry(&self, key: &str) -> Option<&'static ConfigEntry> {
        self.schema.iter().find(|entry| entry.key == key)
    }

    /// Runs one validation pass.
    ///
    /// All errors are collected before failing, so a single pass reports
    /// everything an operator has to fix.
    pub fn validate(&self, options: ValidateOptions) -> Result<ConfigValidationResult, ConfigurationError> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for entry in self.schema {
            match self.value(entry.key) {
                None if entry.required => {
                    errors.push(format!("{} is required ({})", entry.key, entry.description));
                }
                None => match entry.default {
                    Some(default) => warnings.push(format!(
                        "{} is not set, using default '{}' ({})",
                        entry.key, default, entry.description
                    )),
                    None => warnings.push(format!("{} is not set ({})", entry.key, entry.description)),
                },
                Some(value) if !(entry.validator)(value) => {
                    errors.push(format!("{} is invalid: {}", entry.key, entry.expectation));
                }
                Some(_) => {}
            }
        }

        let declares_credentials =
            self.entry(PRIMARY_CREDENTIAL).is_some() && self.entry(FALLBACK_CREDENTIAL).is_some();
        if declares_credentials
            && self.value(PRIMARY_CREDENTIAL).is_none()
            && self.value(FALLBACK_CREDENTIAL).is_none()
        {
            errors.push(format!(
                "Either {} or {} must be set for the completion service",
                PRIMARY_CREDENTIAL, FALLBACK_CREDENTIAL
            ));
        }

        if options.log_warnings {
            for error in &errors {
                log::error!("Config error: {}", error);
            }
            for warning in &warnings {
                log::warn!("Config warning: {}", warning);
            }
        }

        if options.throw_on_error && !errors.is_empty() {
            return Err(ConfigurationError::Invalid { errors });
        }

        if options.log_warnings && errors.is_empty() {
            log::info!("Configuration validated ({} warnings)", warnings.len());
        }

        Ok(ConfigValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        })
    }
}
