use crate::domain::model::{ChatReply, ChatRequest, InsightsReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn qloo_api_key(&self) -> Option<&str>;
    fn qloo_base_url(&self) -> &str;
    fn gemini_api_key(&self) -> Option<&str>;
    fn gemini_base_url(&self) -> &str;
    fn gemini_model(&self) -> &str;
    fn openai_api_key(&self) -> Option<&str>;
    fn openai_base_url(&self) -> &str;
    fn openai_model(&self) -> &str;
    fn generation(&self) -> GenerationSettings;
    fn request_timeout_secs(&self) -> u64;
    fn mock_insights_fallback(&self) -> bool;
    fn cors_allow_origin(&self) -> &str;
}

/// Source of cultural preference data for a location.
#[async_trait]
pub trait InsightsSource: Send + Sync {
    async fn fetch_insights(&self, location: &str, business_type: &str)
        -> Result<InsightsReport>;
}

/// A generative text service invoked with one composed prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Carries a typed request to an orchestrator, in-process or over HTTP.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply>;
}
