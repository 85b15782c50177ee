pub mod insights;
pub mod llm;
pub mod onboarding;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use crate::domain::model::{ChatReply, ChatRequest, OnboardingStep, Phase, QlooInsight};
pub use crate::domain::ports::{ChatTransport, ConfigProvider, InsightsSource, Storage, TextGenerator};
pub use crate::utils::error::Result;

use crate::adapters::http::CorsPolicy;
use insights::{insights_from_config, QlooClient, WithMockFallback};
use llm::LlmChain;
use orchestrator::ChatOrchestrator;

pub type DefaultOrchestrator = ChatOrchestrator<WithMockFallback<QlooClient>, LlmChain>;

/// Wires the live Qloo client and the Gemini/OpenAI chain from configuration.
pub fn orchestrator_from_config<C: ConfigProvider + ?Sized>(config: &C) -> DefaultOrchestrator {
    let llm = LlmChain::from_config(config);
    tracing::debug!("LLM providers: {:?}", llm.provider_names());

    ChatOrchestrator::new(insights_from_config(config), llm)
        .with_cors(CorsPolicy::new(config.cors_allow_origin()))
}
