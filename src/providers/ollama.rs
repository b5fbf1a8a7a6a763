/*!
 * Ollama-backed translation generator.
 *
 * Sends the texts as one JSON object to `/api/generate` in JSON format mode
 * and expects an object with the same keys back.
 */

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{TranslationGenerator, complete_translations};
use crate::errors::ProviderError;

/// Default Ollama endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Format to return a response in
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    pub done: bool,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            format: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }

    /// Set the format
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Translation generator backed by a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    /// Base URL of the Ollama API, without trailing slash
    base_url: String,
    /// Model name
    model: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Sampling temperature
    temperature: f32,
}

impl OllamaGenerator {
    /// Create a generator for `model` at `endpoint`.
    ///
    /// The endpoint may omit the scheme (`localhost:11434`).
    pub fn new(endpoint: &str, model: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = normalize_endpoint(endpoint)?;
        let client = Client::builder()
            .timeout(timeout)
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            model: model.into(),
            client,
            max_retries: 3,
            backoff_base_ms: 1000,
            temperature: 0.2,
        })
    }

    /// Override retry behavior
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the generation request for a set of texts
    fn build_request(&self, texts: &BTreeMap<String, String>, language_name: &str) -> Result<GenerationRequest, ProviderError> {
        let payload = serde_json::to_string_pretty(texts)
            .map_err(|e| ProviderError::ParseError(format!("Failed to encode texts: {}", e)))?;

        let system = format!(
            "You are a careful literary translator. Translate every value of the JSON object \
             the user sends into {}. Keep the meaning and register of the original. \
             Reply with a JSON object that has exactly the same keys, each mapped to its translation.",
            language_name
        );

        Ok(GenerationRequest::new(&self.model, payload)
            .system(system)
            .temperature(self.temperature)
            .format("json"))
    }

    /// Post a request, retrying connection failures and server errors
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let mut attempt = 0;

        loop {
            let result = self.client.post(&url).json(request).send().await;

            let retryable = match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<GenerationResponse>().await.map_err(|e| {
                            error!("Failed to parse Ollama response: {}", e);
                            ProviderError::ParseError(e.to_string())
                        });
                    }

                    let message = response.text().await.unwrap_or_default();
                    let error = ProviderError::ApiError {
                        status_code: status.as_u16(),
                        message,
                    };
                    if !status.is_server_error() {
                        return Err(error);
                    }
                    error
                }
                Err(e) if e.is_connect() || e.is_timeout() => ProviderError::ConnectionError(e.to_string()),
                Err(e) => return Err(ProviderError::RequestFailed(e.to_string())),
            };

            if attempt >= self.max_retries {
                return Err(retryable);
            }

            let delay = self.backoff_base_ms.saturating_mul(1 << attempt.min(10));
            warn!(
                "Ollama request failed ({}), retrying in {}ms ({}/{})",
                retryable,
                delay,
                attempt + 1,
                self.max_retries
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
            attempt += 1;
        }
    }
}

/// Parse the model's JSON reply into key → text
pub fn parse_reply(response: &str) -> Result<BTreeMap<String, String>, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(response.trim())
        .map_err(|e| ProviderError::ParseError(format!("reply is not JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| ProviderError::ParseError("reply is not a JSON object".to_string()))?;

    Ok(object
        .iter()
        .filter_map(|(key, value)| value.as_str().map(|text| (key.clone(), text.to_string())))
        .collect())
}

/// Add a scheme when missing and drop trailing slashes
fn normalize_endpoint(endpoint: &str) -> Result<String, ProviderError> {
    let endpoint = endpoint.trim();
    let with_scheme = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint '{}': {}", endpoint, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProviderError::ConnectionError(format!(
            "Unsupported endpoint scheme: {}",
            url.scheme()
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[async_trait]
impl TranslationGenerator for OllamaGenerator {
    async fn translate(
        &self,
        texts: &BTreeMap<String, String>,
        language_name: &str,
    ) -> Result<BTreeMap<String, String>, ProviderError> {
        if texts.is_empty() {
            return Ok(BTreeMap::new());
        }

        debug!("Requesting {} translations into {} from {}", texts.len(), language_name, self.model);
        let request = self.build_request(texts, language_name)?;
        let response = self.generate(&request).await?;
        complete_translations(texts, parse_reply(&response.response)?)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}
