// llm-service-rs/src/llm_client.rs
//
// HTTP client for OpenAI-compatible chat completion providers.
//
// This module provides:
// - The CompletionService seam the processor talks to
// - A reqwest implementation posting JSON-mode chat completions
// - Decoding of vendor failures (status, error body, retry-after) into ExternalError
//
// There is no retry loop: a failed call fails the request and the caller
// decides what to tell the user.

use std::fmt;

use async_trait::async_trait;
use config_rs::Config;
use error_handling::{sanitize_message, Error, ExternalError};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Low temperature keeps the extraction close to the notes
const EXTRACTION_TEMPERATURE: f32 = 0.3;

/// Longest slice of a non-JSON error body kept for diagnostics
const MAX_RAW_BODY_CHARS: usize = 200;

/// One chat completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Text returned by the completion service plus usage details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    /// Model that actually served the request
    pub model: String,
    pub total_tokens: u32,
}

/// Request/response boundary to the completion service
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ExternalError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

// `{"error": {"message": ..., "type": ..., "code": ...}}`
#[derive(Debug, Deserialize)]
struct VendorErrorBody {
    error: VendorError,
}

#[derive(Debug, Deserialize)]
struct VendorError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    // Some providers send numeric codes
    #[serde(default)]
    code: Option<Value>,
}

/// Completion client for any OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct OpenAiCompletionClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
}

impl fmt::Debug for OpenAiCompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompletionClient")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiCompletionClient {
    /// Builds a client from the validated configuration.
    ///
    /// The transport timeout is set to `config.timeout`; the processor bounds
    /// the whole call with the same value.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::internal_from)?;

        log::info!(
            "Completion client configured for {} (model: {}, credential: {})",
            config.api_url,
            config.model,
            config.credential_source
        );

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ExternalError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: Some(EXTRACTION_TEMPERATURE),
            max_tokens: Some(self.max_tokens),
            response_format: ResponseFormat { kind: "json_object" },
        };

        log::debug!("Sending completion request to {} (model: {})", self.api_url, self.model);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let text = response.text().await.unwrap_or_default();
            let err = vendor_error(status, retry_after, &text);
            log::warn!(
                "Completion service returned {}: {}",
                status,
                sanitize_message(&err.message)
            );
            return Err(err);
        }

        let data: ChatCompletionResponse = response.json().await.map_err(transport_error)?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ExternalError::new("No choices returned in response").with_status(status.as_u16())
            })?;

        let total_tokens = data.usage.map(|usage| usage.total_tokens).unwrap_or(0);
        log::info!("Completion request finished. Used {} tokens", total_tokens);

        Ok(Completion {
            content,
            model: data.model.unwrap_or_else(|| self.model.clone()),
            total_tokens,
        })
    }
}

fn transport_error(err: reqwest::Error) -> ExternalError {
    if err.is_timeout() {
        ExternalError::timeout(format!("Request timed out: {}", err))
    } else if err.is_connect() {
        ExternalError::new(format!("Connection failed: {}", err))
    } else if err.is_decode() {
        ExternalError::new(format!("Failed to parse response: {}", err))
    } else {
        ExternalError::new(format!("Network error: {}", err))
    }
}

fn vendor_error(status: StatusCode, retry_after: Option<String>, body: &str) -> ExternalError {
    let mut err = match serde_json::from_str::<VendorErrorBody>(body) {
        Ok(VendorErrorBody { error }) => {
            let mut err = ExternalError::new(
                error
                    .message
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            );
            err.error_type = error.error_type;
            err.code = match error.code {
                Some(Value::String(code)) => Some(code),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            };
            err
        }
        Err(_) if body.trim().is_empty() => ExternalError::new(format!("HTTP {}", status.as_u16())),
        Err(_) => ExternalError::new(body.chars().take(MAX_RAW_BODY_CHARS).collect::<String>()),
    };

    err.status = Some(status.as_u16());
    err.retry_after = retry_after;
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_rs::ValidateOptions;
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &str = "sk-test-0123456789abcdef";
    const TEST_AUTH: &str = "Bearer sk-test-0123456789abcdef";

    fn test_config(server: &MockServer) -> Config {
        let values = HashMap::from([
            ("OPENAI_API_KEY".to_string(), TEST_KEY.to_string()),
            (
                "LLM_API_URL".to_string(),
                format!("{}/v1/chat/completions", server.uri()),
            ),
            ("LLM_MAX_TOKENS".to_string(), "1500".to_string()),
        ]);
        let (config, _) = Config::load(
            values,
            ValidateOptions {
                throw_on_error: true,
                log_warnings: false,
            },
        )
        .unwrap();
        config
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "Extract action items.".to_string(),
            user_prompt: "Meeting: Standup".to_string(),
        }
    }

    fn vendor_body(message: &str, error_type: &str, code: Value) -> Value {
        json!({ "error": { "message": message, "type": error_type, "code": code } })
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", TEST_AUTH))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 1500,
                "response_format": { "type": "json_object" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o-mini-2024-07-18",
                "choices": [{ "message": { "role": "assistant", "content": "{\"action_items\":[]}" } }],
                "usage": { "prompt_tokens": 300, "completion_tokens": 12, "total_tokens": 312 },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiCompletionClient::new(&test_config(&server)).unwrap();
        let completion = client.complete(&request()).await.unwrap();

        assert_eq!(completion.content, "{\"action_items\":[]}");
        assert_eq!(completion.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(completion.total_tokens, 312);
    }

    #[tokio::test]
    async fn test_rate_limit_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "20")
                    .set_body_json(vendor_body(
                        "Rate limit reached for requests",
                        "requests",
                        json!("rate_limit_exceeded"),
                    )),
            )
            .mount(&server)
            .await;

        let client = OpenAiCompletionClient::new(&test_config(&server)).unwrap();
        let err = client.complete(&request()).await.unwrap_err();

        assert_eq!(err.status, Some(429));
        assert_eq!(err.code.as_deref(), Some("rate_limit_exceeded"));
        assert_eq!(err.error_type.as_deref(), Some("requests"));
        assert_eq!(err.retry_after.as_deref(), Some("20"));
        assert!(!err.timed_out);
    }

    #[tokio::test]
    async fn test_invalid_key_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(vendor_body(
                "Incorrect API key provided",
                "invalid_request_error",
                json!("invalid_api_key"),
            )))
            .mount(&server)
            .await;

        let client = OpenAiCompletionClient::new(&test_config(&server)).unwrap();
        let err = client.complete(&request()).await.unwrap_err();

        assert_eq!(err.status, Some(401));
        assert!(err.has_vendor_code(&["invalid_api_key"]));
        assert_eq!(err.message, "Incorrect API key provided");
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream connect error"))
            .mount(&server)
            .await;

        let client = OpenAiCompletionClient::new(&test_config(&server)).unwrap();
        let err = client.complete(&request()).await.unwrap_err();

        assert_eq!(err.status, Some(502));
        assert_eq!(err.code, None);
        assert_eq!(err.message, "upstream connect error");
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = OpenAiCompletionClient::new(&test_config(&server)).unwrap();
        let err = client.complete(&request()).await.unwrap_err();

        assert_eq!(err.message, "No choices returned in response");
    }

    #[tokio::test]
    async fn test_transport_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let mut config = test_config(&server);
        config.timeout = Duration::from_millis(50);
        let client = OpenAiCompletionClient::new(&config).unwrap();
        let err = client.complete(&request()).await.unwrap_err();

        assert!(err.timed_out);
        assert_eq!(err.status, None);
    }

    #[test]
    fn test_numeric_vendor_code() {
        let body = r#"{"error":{"message":"overloaded","type":null,"code":529}}"#;
        let err = vendor_error(StatusCode::SERVICE_UNAVAILABLE, None, body);
        assert_eq!(err.code.as_deref(), Some("529"));
        assert_eq!(err.status, Some(503));
    }

    #[test]
    fn test_debug_hides_credential() {
        let client = OpenAiCompletionClient {
            client: Client::new(),
            api_key: TEST_KEY.to_string(),
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 2000,
        };
        assert!(!format!("{:?}", client).contains(TEST_KEY));
    }
}
