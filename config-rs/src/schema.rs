//! config-rs/schema.rs
//! The fixed configuration schema. Every environment value the service reads
//! is declared here; nothing else in the workspace touches the environment.

use std::net::SocketAddr;

/// Primary completion-service credential
pub const PRIMARY_CREDENTIAL: &str = "OPENAI_API_KEY";
/// Fallback credential, used when the primary one is absent
pub const FALLBACK_CREDENTIAL: &str = "LLM_API_KEY";

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: &str = "30";
pub const DEFAULT_MAX_TOKENS: &str = "2000";
pub const DEFAULT_SERVICE_ADDR: &str = "0.0.0.0:8282";

/// One declared configuration key
#[derive(Debug, Clone, Copy)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub required: bool,
    pub validator: fn(&str) -> bool,
    /// Shown in the error when `validator` rejects a value
    pub expectation: &'static str,
    pub default: Option<&'static str>,
    pub description: &'static str,
}

static SCHEMA: &[ConfigEntry] = &[
    ConfigEntry {
        key: PRIMARY_CREDENTIAL,
        required: false,
        validator: is_openai_key,
        expectation: "must start with 'sk-' and be at least 20 characters",
        default: None,
        description: "OpenAI API key for the completion service",
    },
    ConfigEntry {
        key: FALLBACK_CREDENTIAL,
        required: false,
        validator: is_token,
        expectation: "must be a single token without whitespace",
        default: None,
        description: "Fallback API key for an OpenAI-compatible provider",
    },
    ConfigEntry {
        key: "LLM_API_URL",
        required: false,
        validator: is_http_url,
        expectation: "must be an http:// or https:// URL",
        default: Some(DEFAULT_API_URL),
        description: "Chat completions endpoint",
    },
    ConfigEntry {
        key: "LLM_MODEL",
        required: false,
        validator: is_token,
        expectation: "must be a model name without whitespace",
        default: Some(DEFAULT_MODEL),
        description: "Model used for extraction",
    },
    ConfigEntry {
        key: "LLM_TIMEOUT_SECS",
        required: false,
        validator: is_timeout,
        expectation: "must be an integer between 1 and 300",
        default: Some(DEFAULT_TIMEOUT_SECS),
        description: "Upper bound on a single completion call, in seconds",
    },
    ConfigEntry {
        key: "LLM_MAX_TOKENS",
        required: false,
        validator: is_max_tokens,
        expectation: "must be an integer between 1 and 16000",
        default: Some(DEFAULT_MAX_TOKENS),
        description: "Completion token budget",
    },
    ConfigEntry {
        key: "DATABASE_URL",
        required: false,
        validator: is_postgres_url,
        expectation: "must be a postgres:// or postgresql:// URL",
        default: None,
        description: "Postgres connection string for meeting storage",
    },
    ConfigEntry {
        key: "SERVICE_ADDR",
        required: false,
        validator: is_socket_addr,
        expectation: "must be a socket address such as 0.0.0.0:8282",
        default: Some(DEFAULT_SERVICE_ADDR),
        description: "Address the HTTP server binds to",
    },
    ConfigEntry {
        key: "ALLOWED_ORIGIN",
        required: false,
        validator: is_origin,
        expectation: "must be '*' or an http(s) origin",
        default: Some("*"),
        description: "Value of Access-Control-Allow-Origin",
    },
    ConfigEntry {
        key: "APP_ENV",
        required: false,
        validator: is_environment,
        expectation: "must be one of development, staging, production",
        default: Some("development"),
        description: "Deployment environment",
    },
    ConfigEntry {
        key: "LOG_LEVEL",
        required: false,
        validator: is_log_level,
        expectation: "must be one of trace, debug, info, warn, error",
        default: Some("info"),
        description: "Minimum log level",
    },
    ConfigEntry {
        key: "LOG_FORMAT",
        required: false,
        validator: is_log_format,
        expectation: "must be json or text",
        default: Some("json"),
        description: "Log output format",
    },
];

/// All declared entries, in validation order
pub fn schema() -> &'static [ConfigEntry] {
    SCHEMA
}

/// Looks up a declared entry
pub fn entry(key: &str) -> Option<&'static ConfigEntry> {
    SCHEMA.iter().find(|entry| entry.key == key)
}

fn is_openai_key(value: &str) -> bool {
    value.starts_with("sk-") && value.len() >= 20 && !value.contains(char::is_whitespace)
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && !value.contains(char::is_whitespace)
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.contains(char::is_whitespace))
}

fn is_timeout(value: &str) -> bool {
    matches!(value.parse::<u64>(), Ok(secs) if (1..=300).contains(&secs))
}

fn is_max_tokens(value: &str) -> bool {
    matches!(value.parse::<u32>(), Ok(tokens) if (1..=16_000).contains(&tokens))
}

fn is_postgres_url(value: &str) -> bool {
    value.starts_with("postgres://") || value.starts_with("postgresql://")
}

fn is_socket_addr(value: &str) -> bool {
    value.parse::<SocketAddr>().is_ok()
}

fn is_origin(value: &str) -> bool {
    value == "*" || is_http_url(value)
}

fn is_environment(value: &str) -> bool {
    matches!(value, "development" | "staging" | "production")
}

fn is_log_level(value: &str) -> bool {
    matches!(value, "trace" | "debug" | "info" | "warn" | "error")
}

fn is_log_format(value: &str) -> bool {
    matches!(value, "json" | "text")
}
