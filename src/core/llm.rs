use crate::core::prompt::{extract_json_payload, screening_prompt, structured_prompt};
use crate::domain::model::{LlmOutcome, Usage};
use crate::domain::ports::{CompletionRequest, LlmClient};
use crate::utils::error::{Result, ScreenerError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

const ERROR_BODY_LIMIT: usize = 500;

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl LlmSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: api_key.into(),
            model: default_model(),
            timeout_seconds: default_timeout(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// OpenRouter 相容的 chat completions 客戶端
pub struct OpenRouterClient {
    settings: LlmSettings,
    client: Client,
}

impl OpenRouterClient {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    async fn send(&self, request: &CompletionRequest) -> Result<(Value, Usage)> {
        let payload = json!({
            "model": self.settings.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "response_format": {"type": "json_object"}
        });

        tracing::debug!(
            "Calling {} with model {} ({} prompt chars)",
            self.settings.endpoint,
            self.settings.model,
            request.prompt_chars()
        );

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("LLM response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScreenerError::ApiStatusError {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let data: Value = response.json().await?;
        let content = data
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| ScreenerError::LlmResponseError {
                message: "missing choices[0].message.content".to_string(),
            })?;

        let result: Value = serde_json::from_str(extract_json_payload(content)).map_err(|e| {
            ScreenerError::LlmResponseError {
                message: format!("content is not valid JSON: {}", e),
            }
        })?;

        let usage = data
            .get("usage")
            .cloned()
            .and_then(|u| serde_json::from_value(u).ok())
            .unwrap_or_default();

        Ok((result, usage))
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenRouterClient {
    async fn complete_json(&self, request: &CompletionRequest) -> LlmOutcome {
        match self.send(request).await {
            Ok((result, usage)) => LlmOutcome::success(result, usage),
            Err(e) => {
                tracing::warn!("LLM call failed: {}", e);
                LlmOutcome::failure(e.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreeningOptions {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ScreeningOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuredOptions {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for StructuredOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 2000,
        }
    }
}

pub async fn analyze_resume<L: LlmClient + ?Sized>(
    client: &L,
    prompt: &str,
    resume_text: &str,
    output_schema: &str,
    options: ScreeningOptions,
) -> LlmOutcome {
    let request = CompletionRequest {
        prompt: screening_prompt(prompt, resume_text, output_schema),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };
    client.complete_json(&request).await
}

pub async fn structured_call<L: LlmClient + ?Sized>(
    client: &L,
    prompt: &str,
    context: &[(&str, Value)],
    output_schema: &Value,
    options: StructuredOptions,
) -> LlmOutcome {
    let request = CompletionRequest {
        prompt: structured_prompt(prompt, context, output_schema),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };
    client.complete_json(&request).await
}
