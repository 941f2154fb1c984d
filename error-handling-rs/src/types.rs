//! # Standardized Error Types
//!
//! The closed error taxonomy of the meeting notes service. Every failure that
//! can reach a caller is one of the eight [`ErrorKind`]s; the kind fixes the
//! HTTP status and the machine code, so neither can drift per call site.

use std::error::Error as StdError;
use std::fmt;

use rand::Rng;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::envelope::ErrorEnvelope;

/// A type alias for Result with the error type defaulting to our Error
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Length of a tracking id.
pub const ERROR_ID_LEN: usize = 8;

const ERROR_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generic caller-facing message for failures without a recognized kind.
pub const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Generates a fresh 8-character lowercase alphanumeric tracking id.
pub fn generate_error_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ERROR_ID_LEN)
        .map(|_| ERROR_ID_ALPHABET[rng.gen_range(0..ERROR_ID_ALPHABET.len())] as char)
        .collect()
}

/// Categorizes the failures the service can surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Caller input failed validation
    Validation,
    /// Caller is not authenticated
    Authentication,
    /// Caller is authenticated but not allowed
    Authorization,
    /// Requested resource does not exist
    NotFound,
    /// Too many requests, here or upstream
    RateLimit,
    /// Failure on our side, including operator misconfiguration
    InternalServer,
    /// The completion service failed in a way the caller cannot fix
    ExternalApi,
    /// A dependency is down or did not answer in time
    ServiceUnavailable,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Validation,
        ErrorKind::Authentication,
        ErrorKind::Authorization,
        ErrorKind::NotFound,
        ErrorKind::RateLimit,
        ErrorKind::InternalServer,
        ErrorKind::ExternalApi,
        ErrorKind::ServiceUnavailable,
    ];

    /// HTTP status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Authentication => 401,
            ErrorKind::Authorization => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::RateLimit => 429,
            ErrorKind::InternalServer => 500,
            ErrorKind::ExternalApi => 502,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// Machine-readable code exposed in the envelope.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Authentication => "AUTH_ERROR",
            ErrorKind::Authorization => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::InternalServer => "INTERNAL_ERROR",
            ErrorKind::ExternalApi => "EXTERNAL_API_ERROR",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Whether the same request might succeed later. Informational only,
    /// nothing in the service retries on its own.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimit | ErrorKind::ExternalApi | ErrorKind::ServiceUnavailable
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "Validation Error"),
            ErrorKind::Authentication => write!(f, "Authentication Error"),
            ErrorKind::Authorization => write!(f, "Authorization Error"),
            ErrorKind::NotFound => write!(f, "Not Found Error"),
            ErrorKind::RateLimit => write!(f, "Rate Limit Error"),
            ErrorKind::InternalServer => write!(f, "Internal Server Error"),
            ErrorKind::ExternalApi => write!(f, "External API Error"),
            ErrorKind::ServiceUnavailable => write!(f, "Service Unavailable Error"),
        }
    }
}

/// Core error type of the service
///
/// Built once at the point of failure and never mutated afterwards. Two maps
/// hang off an error: `metadata` is part of the public envelope, while
/// `diagnostics` only ever reaches server-side logs.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    error_id: String,
    metadata: Map<String, Value>,
    diagnostics: Map<String, Value>,
    cause: Option<Box<dyn StdError + Send + Sync>>,
}

impl Clone for Error {
    /// Clones keep the id and both maps but drop the opaque `cause`.
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            error_id: self.error_id.clone(),
            metadata: self.metadata.clone(),
            diagnostics: self.diagnostics.clone(),
            cause: None,
        }
    }
}

impl Error {
    /// Creates a new error with the specified kind and message and a fresh id
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
            error_id: generate_error_id(),
            metadata: Map::new(),
            diagnostics: Map::new(),
            cause: None,
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn authorization<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn rate_limit<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::RateLimit, message)
    }

    pub fn internal_server<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::InternalServer, message)
    }

    pub fn external_api<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::ExternalApi, message)
    }

    pub fn service_unavailable<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Wraps a failure that has no place in the taxonomy. The caller only
    /// sees a generic message; the original error is kept as the cause for
    /// server-side logging.
    pub fn internal_from<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::internal_server(GENERIC_INTERNAL_MESSAGE)
            .with_diagnostic("cause", err.to_string())
            .with_cause(err)
    }

    /// Reuses an existing tracking id instead of the generated one.
    ///
    /// Only meant for re-wrapping an error that already carries an id, so the
    /// same failure is not tracked twice. Empty ids are ignored.
    pub fn with_error_id<S: Into<String>>(mut self, error_id: S) -> Self {
        let error_id = error_id.into();
        if !error_id.is_empty() {
            self.error_id = error_id;
        }
        self
    }

    /// Adds caller-visible metadata
    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize,
    {
        if let Ok(value) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), value);
        }
        self
    }

    /// Adds operator-only diagnostic context, never serialized to callers
    pub fn with_diagnostic<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize,
    {
        if let Ok(value) = serde_json::to_value(value) {
            self.diagnostics.insert(key.into(), value);
        }
        self
    }

    /// Chains this error with its cause
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_id(&self) -> &str {
        &self.error_id
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn diagnostics(&self) -> &Map<String, Value> {
        &self.diagnostics
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    /// Projects the error onto the public response envelope.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            error: self.message.clone(),
            error_id: self.error_id.clone(),
            code: self.code().to_string(),
            metadata: self.metadata.clone(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (Code: {}) [ErrorID: {}]", self.kind, self.message, self.code(), self.error_id)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_envelope().serialize(serializer)
    }
}
