//! HTTP surface of the meeting notes extraction service.
//!
//! `POST /process` validates the body, hands it to the [`MeetingProcessor`]
//! and returns either the success envelope or an error envelope. Every
//! response carries the CORS headers, including errors produced by the
//! router itself.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, StatusCode,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use config_rs::Config;
use error_handling::Error;
use input_validation::validate_request;
use llm_service::{MeetingProcessor, ProcessResponse};
use serde::Serialize;
use serde_json::Value;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod error;

pub use error::ApiError;

/// Largest accepted request body
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub status: String,
}

/// Core API Gateway state and functionality
pub struct ApiGateway {
    processor: MeetingProcessor,
    allow_origin: HeaderValue,
    started: Instant,
}

impl ApiGateway {
    /// Builds the gateway from an already validated configuration.
    pub fn new(config: &Config, processor: MeetingProcessor) -> Result<Self, Error> {
        let allow_origin = HeaderValue::from_str(&config.allowed_origin).map_err(|err| {
            Error::internal_from(err).with_diagnostic("allowedOrigin", config.allowed_origin.as_str())
        })?;

        Ok(Self {
            processor,
            allow_origin,
            started: Instant::now(),
        })
    }

    /// Create the Axum router with all routes and middleware
    pub fn create_router(self: Arc<Self>) -> Router {
        let allow_origin = self.allow_origin.clone();

        Router::new()
            .route(
                "/process",
                post(Self::process_handler)
                    .options(Self::preflight_handler)
                    .fallback(Self::method_not_allowed_handler),
            )
            .route("/health", get(Self::health_handler))
            .layer(DefaultBodyLimit::max(MAX_PAYLOAD_SIZE))
            .layer(TraceLayer::new_for_http())
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                allow_origin,
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            ))
            .with_state(self)
    }

    async fn process_handler(
        State(state): State<Arc<Self>>,
        body: Result<Bytes, BytesRejection>,
    ) -> Result<Json<ProcessResponse>, ApiError> {
        let body = body.map_err(ApiError::from_body_rejection)?;

        let value: Value = serde_json::from_slice(&body).map_err(|err| {
            Error::validation("Request body must be valid JSON")
                .with_diagnostic("parseError", err.to_string())
        })?;

        let payload = validate_request(&value)?;
        tracing::info!(title = %payload.title, date = %payload.date, "Processing meeting notes");

        let response = state.processor.process(&payload).await?;
        Ok(Json(response))
    }

    async fn preflight_handler() -> StatusCode {
        StatusCode::NO_CONTENT
    }

    async fn method_not_allowed_handler() -> ApiError {
        ApiError::method_not_allowed()
    }

    async fn health_handler(State(state): State<Arc<Self>>) -> impl IntoResponse {
        Json(HealthResponse {
            healthy: true,
            service_name: "api-gateway".to_string(),
            uptime_seconds: state.started.elapsed().as_secs(),
            status: "SERVING".to_string(),
        })
    }
}
