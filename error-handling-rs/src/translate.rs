//! # External Error Translation
//!
//! Maps a completion-service failure onto the taxonomy. Only our own code and
//! a curated message cross the boundary; vendor status, codes and messages
//! are kept as diagnostics for operators.

use crate::external::ExternalError;
use crate::types::Error;

pub const RATE_LIMIT_MESSAGE: &str =
    "The AI service is receiving too many requests. Please wait a moment and try again.";
pub const QUOTA_MESSAGE: &str =
    "The AI service quota has been exhausted. Please try again later or contact support.";
pub const MISCONFIGURED_MESSAGE: &str =
    "The AI service is not configured correctly. Please contact support.";
pub const INVALID_REQUEST_MESSAGE: &str =
    "The AI service could not process this request. Please check your input and try again.";
pub const UNAVAILABLE_MESSAGE: &str =
    "The AI service is temporarily unavailable. Please try again in a few minutes.";
pub const TIMEOUT_MESSAGE: &str =
    "The AI service took too long to respond. Please try again in a few minutes.";
pub const GENERIC_EXTERNAL_MESSAGE: &str =
    "The AI service returned an unexpected error. Please try again later.";

/// Translates an external failure into exactly one taxonomy member.
///
/// First match wins: timeout, rate limit, quota, credentials, malformed
/// request, outage, then a generic external error.
pub fn translate(external: &ExternalError) -> Error {
    if external.timed_out {
        return Error::service_unavailable(TIMEOUT_MESSAGE)
            .with_metadata("timeout", true)
            .with_diagnostic("externalMessage", &external.message);
    }

    if external.status_is(429) || external.has_vendor_code(&["rate_limit_exceeded"]) {
        let mut err = Error::rate_limit(RATE_LIMIT_MESSAGE);
        if let Some(retry_after) = &external.retry_after {
            err = err.with_metadata("retryAfter", retry_after);
        }
        return with_vendor_diagnostics(err, external);
    }

    if external.has_vendor_code(&["insufficient_quota"]) {
        return with_vendor_diagnostics(Error::external_api(QUOTA_MESSAGE), external);
    }

    // A rejected credential is an operator fault, never the caller's.
    if external.status_is(401) || external.has_vendor_code(&["invalid_api_key", "authentication_error"]) {
        let err = Error::internal_server(MISCONFIGURED_MESSAGE)
            .with_diagnostic("hint", "completion service rejected the API key; check OPENAI_API_KEY / LLM_API_KEY");
        return with_vendor_diagnostics(err, external);
    }

    if external.status_is(400) || external.has_vendor_code(&["invalid_request_error"]) {
        return with_vendor_diagnostics(Error::validation(INVALID_REQUEST_MESSAGE), external);
    }

    if external.status_is(503) || external.has_vendor_code(&["service_unavailable"]) {
        return with_vendor_diagnostics(Error::service_unavailable(UNAVAILABLE_MESSAGE), external);
    }

    with_vendor_diagnostics(Error::external_api(GENERIC_EXTERNAL_MESSAGE), external)
}

fn with_vendor_diagnostics(mut err: Error, external: &ExternalError) -> Error {
    if let Some(status) = external.status {
        err = err.with_diagnostic("externalStatus", status);
    }
    if let Some(code) = external.code.as_deref().or(external.error_type.as_deref()) {
        err = err.with_diagnostic("externalCode", code);
    }
    err.with_diagnostic("externalMessage", &external.message)
}
