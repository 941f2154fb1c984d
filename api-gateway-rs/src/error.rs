//! HTTP mapping of service errors.
//!
//! Handlers return `Result<Json<T>, ApiError>`. Taxonomy errors are logged
//! once here and rendered with their own status; transport failures that sit
//! outside the taxonomy (wrong method, oversized body) get the same envelope
//! shape with a code of their own.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use error_handling::{log_structured_error, Error, ErrorEnvelope};

pub const METHOD_NOT_ALLOWED_CODE: &str = "METHOD_NOT_ALLOWED";
pub const PAYLOAD_TOO_LARGE_CODE: &str = "PAYLOAD_TOO_LARGE";

#[derive(Debug)]
pub enum ApiError {
    /// A member of the error taxonomy
    Service(Error),
    /// A protocol-level failure with no taxonomy kind
    Transport {
        status: StatusCode,
        envelope: ErrorEnvelope,
    },
}

impl ApiError {
    pub fn method_not_allowed() -> Self {
        Self::Transport {
            status: StatusCode::METHOD_NOT_ALLOWED,
            envelope: ErrorEnvelope::transport("Method not allowed", METHOD_NOT_ALLOWED_CODE),
        }
    }

    pub fn payload_too_large() -> Self {
        Self::Transport {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            envelope: ErrorEnvelope::transport("Request body is too large", PAYLOAD_TOO_LARGE_CODE),
        }
    }

    /// Body could not be read: too large, or the stream broke off
    pub fn from_body_rejection(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::payload_too_large();
        }
        Self::Service(
            Error::validation("Request body could not be read")
                .with_diagnostic("rejection", rejection.body_text()),
        )
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Service(err) => {
                log_structured_error(&err);
                let status =
                    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(err.to_envelope())).into_response()
            }
            Self::Transport { status, envelope } => {
                tracing::warn!(
                    error_id = %envelope.error_id,
                    code = %envelope.code,
                    status = status.as_u16(),
                    "{}",
                    envelope.error
                );
                (status, Json(envelope)).into_response()
            }
        }
    }
}
