//! Generative text providers and the ordered fallback chain over them.

use crate::adapters::http::http_client;
use crate::domain::ports::{ConfigProvider, GenerationSettings, TextGenerator};
use crate::utils::error::{OrchestratorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

async fn error_for_status(service: &str, response: reqwest::Response) -> OrchestratorError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::error!("{} API error: {} - {}", service, status, body);
    OrchestratorError::UpstreamStatus {
        service: service.to_string(),
        status,
        body,
    }
}

// ---- Gemini ----

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponsePart {
    text: Option<String>,
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    settings: GenerationSettings,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        settings: GenerationSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.settings.temperature,
                top_k: self.settings.top_k,
                top_p: self.settings.top_p,
                max_output_tokens: self.settings.max_output_tokens,
            },
        };

        tracing::debug!("Calling Gemini model {}", self.model);
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status("Gemini", response).await);
        }

        let data: GeminiResponse =
            response
                .json()
                .await
                .map_err(|e| OrchestratorError::UpstreamFormat {
                    service: "Gemini".to_string(),
                    message: e.to_string(),
                })?;

        data.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| OrchestratorError::UpstreamFormat {
                service: "Gemini".to_string(),
                message: "Invalid response format from Gemini".to_string(),
            })
    }
}

// ---- OpenAI ----

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    settings: GenerationSettings,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        settings: GenerationSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            settings,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_output_tokens,
        };

        tracing::debug!("Calling OpenAI model {}", self.model);
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status("OpenAI", response).await);
        }

        let data: OpenAiResponse =
            response
                .json()
                .await
                .map_err(|e| OrchestratorError::UpstreamFormat {
                    service: "OpenAI".to_string(),
                    message: e.to_string(),
                })?;

        data.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OrchestratorError::UpstreamFormat {
                service: "OpenAI".to_string(),
                message: "No choices in response".to_string(),
            })
    }
}

// ---- chain ----

/// Tries each provider in order and returns the first text produced.
pub struct LlmChain {
    providers: Vec<Box<dyn TextGenerator>>,
}

impl LlmChain {
    pub fn new(providers: Vec<Box<dyn TextGenerator>>) -> Self {
        Self { providers }
    }

    /// Gemini first, OpenAI second; providers without a key are skipped.
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        let timeout = Duration::from_secs(config.request_timeout_secs());
        let mut providers: Vec<Box<dyn TextGenerator>> = Vec::new();

        if let Some(key) = config.gemini_api_key() {
            providers.push(Box::new(GeminiClient::new(
                config.gemini_base_url(),
                key,
                config.gemini_model(),
                config.generation(),
                timeout,
            )));
        }

        if let Some(key) = config.openai_api_key() {
            providers.push(Box::new(OpenAiClient::new(
                config.openai_base_url(),
                key,
                config.openai_model(),
                config.generation(),
                timeout,
            )));
        }

        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait]
impl TextGenerator for LlmChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.providers.is_empty() {
            return Err(OrchestratorError::MissingApiKey {
                provider: "gemini/openai".to_string(),
            });
        }

        let mut failures = Vec::new();
        for provider in &self.providers {
            tracing::info!("Calling {} API...", provider.name());
            match provider.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::warn!("{} API failed: {}", provider.name(), e);
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        Err(OrchestratorError::LlmUnavailable {
            message: failures.join("; "),
        })
    }
}
