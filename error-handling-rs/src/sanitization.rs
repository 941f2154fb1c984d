//! # Error Sanitization
//!
//! Redacts secrets from diagnostic text before it is written to logs. Vendor
//! error messages routinely echo part of the API key back, so everything that
//! came from outside passes through here first.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

// Static regex patterns for sensitive information detection
static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // API keys, tokens, credentials
        Regex::new(r#"(?i)(api[_\-\s]?key|token|secret|password|credential)s?["']?\s*[=:]\s*["']?([^"'\s]+)"#).unwrap(),
        // OpenAI style keys
        Regex::new(r"sk-[A-Za-z0-9_\-\*]{4,}").unwrap(),
        // OAuth 2.0 tokens
        Regex::new(r"(?i)bearer\s+([a-zA-Z0-9\._\-]+)").unwrap(),
        // JWTs
        Regex::new(r"eyJ[a-zA-Z0-9\-_]+\.eyJ[a-zA-Z0-9\-_]+\.[a-zA-Z0-9\-_]+").unwrap(),
        // Email addresses
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap(),
    ]
});

// Diagnostic keys whose values are dropped entirely
static SENSITIVE_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let keys = [
        "password", "secret", "token", "api_key", "apikey", "credential",
        "authorization", "cookie", "private_key",
    ];
    HashSet::from_iter(keys.iter().copied())
});

/// Sanitizes a message by removing sensitive information
pub fn sanitize_message(message: &str) -> String {
    let mut sanitized = message.to_string();

    for pattern in SENSITIVE_PATTERNS.iter() {
        sanitized = pattern
            .replace_all(&sanitized, |caps: &regex::Captures| {
                if caps.len() > 2 {
                    // Keep the key name but redact the value
                    format!("{}=[REDACTED]", &caps[1])
                } else {
                    "[REDACTED]".to_string()
                }
            })
            .to_string();
    }

    sanitized
}

/// Sanitizes a diagnostic map for logging
pub fn sanitize_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !is_sensitive_key(key))
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => Value::String(sanitize_message(s)),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Determines if a context key is sensitive
fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|sensitive| key_lower.contains(sensitive))
}
