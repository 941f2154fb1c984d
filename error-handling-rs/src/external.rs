//! Failures reported by the external completion service.
//!
//! The completion client fills this in from whatever the vendor handed back
//! (HTTP status, the `code` and `type` fields of its error body, the
//! `retry-after` header) and hands it to [`crate::translate`].

use std::fmt;

/// Opaque failure of the external completion service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalError {
    /// HTTP status returned by the vendor, if a response arrived at all
    pub status: Option<u16>,
    /// Vendor error code, e.g. `rate_limit_exceeded`
    pub code: Option<String>,
    /// Vendor error type, e.g. `invalid_request_error`
    pub error_type: Option<String>,
    /// Raw vendor message; never shown to callers
    pub message: String,
    /// Retry hint exposed by the vendor
    pub retry_after: Option<String>,
    /// The call did not complete within the configured bound
    pub timed_out: bool,
}

impl ExternalError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// A call abandoned after the configured timeout
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_error_type<S: Into<String>>(mut self, error_type: S) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    pub fn with_retry_after<S: Into<String>>(mut self, retry_after: S) -> Self {
        self.retry_after = Some(retry_after.into());
        self
    }

    /// True when either the vendor `code` or `type` equals one of `names`.
    pub fn has_vendor_code(&self, names: &[&str]) -> bool {
        [self.code.as_deref(), self.error_type.as_deref()]
            .into_iter()
            .flatten()
            .any(|value| names.contains(&value))
    }

    pub fn status_is(&self, status: u16) -> bool {
        self.status == Some(status)
    }
}

impl fmt::Display for ExternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "external service error ({}): {}", status, self.message)?,
            None => write!(f, "external service error: {}", self.message)?,
        }
        if let Some(code) = self.code.as_deref().or(self.error_type.as_deref()) {
            write!(f, " [{}]", code)?;
        }
        if self.timed_out {
            write!(f, " (timed out)")?;
        }
        Ok(())
    }
}

impl std::error::Error for ExternalError {}
