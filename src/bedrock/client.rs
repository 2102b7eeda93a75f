use std::env;
use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::bedrock::converse::{ConverseOutput, ConverseRequest, Message};
use crate::bedrock::embed::{EmbedOutput, TitanEmbedRequest};
use crate::bedrock::stream::ChunkStream;

/// Region used when neither the caller nor the environment names one.
pub const DEFAULT_REGION: &str = "us-east-1";

const TOKEN_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";
const ENDPOINT_ENV: &str = "BEDPIPE_ENDPOINT";
const REGION_ENVS: [&str; 2] = ["BEDPIPE_REGION", "AWS_REGION"];

/// Connection settings for one runtime client, injected at construction.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Region hosting the runtime endpoint.
    pub region: String,
    /// Bearer token presented on every request.
    pub api_token: String,
    /// Endpoint URL override; when set, `region` is not used for URL building.
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl RuntimeConfig {
    /// Builds a configuration from a region and a bearer token.
    pub fn new(region: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            api_token: api_token.into(),
            endpoint: None,
            timeout_secs: None,
        }
    }

    /// Builds a configuration from `AWS_BEARER_TOKEN_BEDROCK` and, unless
    /// `region` is given, `BEDPIPE_REGION`/`AWS_REGION`.
    pub fn from_env(region: Option<&str>) -> Result<Self, RuntimeError> {
        let api_token = env::var(TOKEN_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(RuntimeError::MissingToken { key_env: TOKEN_ENV })?;

        let region = region
            .map(str::to_string)
            .or_else(|| {
                REGION_ENVS.iter().find_map(|key| {
                    env::var(key).ok().filter(|value| !value.trim().is_empty())
                })
            })
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let mut config = Self::new(region, api_token);
        if let Ok(endpoint) = env::var(ENDPOINT_ENV) {
            let trimmed = endpoint.trim();
            if !trimmed.is_empty() {
                config = config.with_endpoint(trimmed);
            }
        }
        Ok(config)
    }

    /// Returns the configuration with an endpoint URL override.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Returns the configuration with a per-request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}

/// Failures surfaced by [`RuntimeClient`] operations.
#[derive(Debug)]
pub enum RuntimeError {
    /// The bearer token environment variable is absent or blank.
    MissingToken {
        /// Name of the missing variable.
        key_env: &'static str,
    },
    /// The model identifier is empty.
    InvalidModelId,
    /// The endpoint rejected the request.
    Client {
        /// HTTP status returned by the endpoint.
        status: StatusCode,
        /// Message extracted from the service error envelope.
        message: String,
    },
    /// Transport-level failure, before or during the response.
    Request {
        /// Underlying HTTP error.
        source: reqwest::Error,
    },
    /// The response body does not match the expected shape.
    Malformed {
        /// What failed to parse.
        detail: String,
    },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken { key_env } => {
                write!(f, "{key_env} is not set in the environment")
            }
            Self::InvalidModelId => write!(f, "model id must be a non-empty string"),
            Self::Client { status, message } => {
                write!(f, "client error {status}: {message}")
            }
            Self::Request { source } => write!(f, "request failed: {source}"),
            Self::Malformed { detail } => write!(f, "malformed response: {detail}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request { source } => Some(source),
            _ => None,
        }
    }
}

/// Single-shot client for the runtime HTTP surface.
///
/// Every operation opens one request against the configured endpoint
/// and surfaces the first failure immediately; no retries are made.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    config: RuntimeConfig,
    client: reqwest::Client,
}

impl RuntimeClient {
    /// Creates a client bound to the given connection settings.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Invokes a model once and returns the response document unmodified.
    pub async fn invoke(&self, model_id: &str, body: &Value) -> Result<Value, RuntimeError> {
        let url = self.model_url(model_id, "invoke")?;
        tracing::info!(model_id, "invoking model");
        let response = self.post_json(&url, body).await?;
        let raw = response
            .text()
            .await
            .map_err(|source| RuntimeError::Request { source })?;
        serde_json::from_str(&raw).map_err(|err| RuntimeError::Malformed {
            detail: format!("invoke response: {err}"),
        })
    }

    /// Generates an embedding with a Titan-style text embedding model.
    pub async fn embed(&self, model_id: &str, input_text: &str) -> Result<EmbedOutput, RuntimeError> {
        let body = serde_json::to_value(TitanEmbedRequest { input_text })
            .map_err(|err| RuntimeError::Malformed {
                detail: format!("embed request did not serialize: {err}"),
            })?;
        let document = self.invoke(model_id, &body).await?;
        serde_json::from_value(document).map_err(|err| RuntimeError::Malformed {
            detail: format!("embed response: {err}"),
        })
    }

    /// Sends a conversation to a model and returns its reply with usage.
    pub async fn converse(
        &self,
        model_id: &str,
        messages: &[Message],
    ) -> Result<ConverseOutput, RuntimeError> {
        let url = self.model_url(model_id, "converse")?;
        tracing::info!(model_id, "generating message");
        let response = self.post_json(&url, &ConverseRequest { messages }).await?;
        let raw = response
            .text()
            .await
            .map_err(|source| RuntimeError::Request { source })?;
        serde_json::from_str(&raw).map_err(|err| RuntimeError::Malformed {
            detail: format!("converse response: {err}"),
        })
    }

    /// Invokes a model and returns a pull-based stream of response chunks.
    ///
    /// The stream is finite and cannot be restarted; issue a new call to
    /// replay. Dropping it closes the connection.
    pub async fn invoke_stream(
        &self,
        model_id: &str,
        body: &Value,
    ) -> Result<ChunkStream, RuntimeError> {
        let url = self.model_url(model_id, "invoke-with-response-stream")?;
        tracing::info!(model_id, "invoking model with response stream");
        let response = self.post_json(&url, body).await?;
        Ok(ChunkStream::new(response))
    }

    fn model_url(&self, model_id: &str, action: &str) -> Result<String, RuntimeError> {
        if model_id.trim().is_empty() {
            return Err(RuntimeError::InvalidModelId);
        }
        Ok(format!(
            "{}/model/{model_id}/{action}",
            self.config.base_url()
        ))
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<reqwest::Response, RuntimeError> {
        let mut request = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_token)
            .json(payload);

        if let Some(timeout_secs) = self.config.timeout_secs {
            request = request.timeout(Duration::from_secs(timeout_secs));
        }

        let response = request
            .send()
            .await
            .map_err(|source| RuntimeError::Request { source })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(RuntimeError::Client {
            status,
            message: extract_error_message(&body),
        })
    }
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|doc| {
            doc.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_REGION, RuntimeClient, RuntimeConfig, RuntimeError, extract_error_message};

    #[test]
    fn base_url_derives_from_region() {
        let config = RuntimeConfig::new("ap-northeast-1", "token");
        assert_eq!(
            config.base_url(),
            "https://bedrock-runtime.ap-northeast-1.amazonaws.com"
        );
    }

    #[test]
    fn endpoint_override_wins_and_drops_trailing_slash() {
        let config =
            RuntimeConfig::new(DEFAULT_REGION, "token").with_endpoint("http://127.0.0.1:4000/");
        assert_eq!(config.base_url(), "http://127.0.0.1:4000");
    }

    #[test]
    fn empty_model_id_is_rejected_before_any_request() {
        let client = RuntimeClient::new(RuntimeConfig::new(DEFAULT_REGION, "token"));
        let result = client.model_url("  ", "invoke");
        assert!(matches!(result, Err(RuntimeError::InvalidModelId)));
    }

    #[test]
    fn model_url_includes_model_and_action() {
        let client = RuntimeClient::new(
            RuntimeConfig::new(DEFAULT_REGION, "token").with_endpoint("http://localhost:9999"),
        );
        let url = client
            .model_url("amazon.titan-embed-text-v1", "invoke")
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:9999/model/amazon.titan-embed-text-v1/invoke"
        );
    }

    #[test]
    fn error_message_comes_from_envelope_when_present() {
        let body = r#"{"message": "Invalid model identifier"}"#;
        assert_eq!(extract_error_message(body), "Invalid model identifier");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(extract_error_message("<html>503</html>"), "<html>503</html>");
        assert_eq!(extract_error_message(r#"{"code": 42}"#), r#"{"code": 42}"#);
    }

    #[test]
    fn missing_token_error_names_the_variable() {
        let err = RuntimeError::MissingToken {
            key_env: "AWS_BEARER_TOKEN_BEDROCK",
        };
        assert_eq!(
            err.to_string(),
            "AWS_BEARER_TOKEN_BEDROCK is not set in the environment"
        );
    }
}
