//! Public error envelope.
//!
//! `{ "success": false, "error": ..., "errorId": ..., "code": ..., "metadata": ... }`
//!
//! The projection is one-way: nothing in the service reads envelopes back.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::generate_error_id;

/// Error response body shared by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(rename = "errorId")]
    pub error_id: String,
    pub code: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ErrorEnvelope {
    /// Builds an envelope for a transport-level failure that sits outside the
    /// taxonomy (for example a 405 from the method guard). A fresh tracking
    /// id is generated as for any other error.
    pub fn transport<M, C>(message: M, code: C) -> Self
    where
        M: Into<String>,
        C: Into<String>,
    {
        Self {
            success: false,
            error: message.into(),
            error_id: generate_error_id(),
            code: code.into(),
            metadata: Map::new(),
        }
    }
}
