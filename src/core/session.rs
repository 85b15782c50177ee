use crate::core::onboarding;
use crate::domain::model::{
    ChatMessage, ChatReply, ChatRequest, InsightOrigin, OnboardingStep, QlooInsight, Role,
};
use crate::domain::ports::{ChatTransport, Storage};
use crate::utils::error::{ErrorType, Result};
use chrono::Utc;

pub const GREETING: &str = "Hello! I'm your Cultural AI Assistant powered by Qloo and Gemini. I help you understand local cultural preferences and discover new business opportunities.\n\nAsk me how the app works, or say \"start\" to analyse your own market.";

fn insights_ready(location: &str, business: &str) -> String {
    format!(
        "I've gathered the cultural profile for {}. Ask me anything about launching your {} there: pricing, positioning, marketing or local habits.",
        location, business
    )
}

/// Conversation state held by the chat widget for one page session.
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    step: OnboardingStep,
    business_type: Option<String>,
    location: Option<String>,
    insights: Option<QlooInsight>,
    insights_origin: Option<InsightOrigin>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        let mut session = Self {
            messages: Vec::new(),
            step: OnboardingStep::InitialQuestion,
            business_type: None,
            location: None,
            insights: None,
            insights_origin: None,
        };
        session.push(Role::Bot, GREETING.to_string());
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn business_type(&self) -> Option<&str> {
        self.business_type.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn insights(&self) -> Option<&QlooInsight> {
        self.insights.as_ref()
    }

    pub fn insights_origin(&self) -> Option<InsightOrigin> {
        self.insights_origin
    }

    fn push(&mut self, role: Role, content: String) -> &ChatMessage {
        let id = self.messages.len() + 1;
        self.messages.push(ChatMessage {
            id,
            role,
            content,
            timestamp: Utc::now(),
        });
        &self.messages[id - 1]
    }

    /// Sends one user message and returns the bot's answer. Blank input is
    /// ignored and returns `None`.
    pub async fn send<T: ChatTransport + ?Sized>(
        &mut self,
        transport: &T,
        input: &str,
    ) -> Option<&ChatMessage> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        self.push(Role::User, text.to_string());

        let answer = match self.step {
            OnboardingStep::InitialQuestion | OnboardingStep::ExplainingApp => {
                self.ask_onboarding(transport, text).await
            }
            OnboardingStep::CollectingBusinessType => {
                self.business_type = Some(text.to_string());
                self.step = OnboardingStep::CollectingLocation;
                onboarding::fallback_text(OnboardingStep::CollectingLocation).to_string()
            }
            OnboardingStep::CollectingLocation => self.collect_location(transport, text).await,
            OnboardingStep::FreeForm => self.ask_strategic(transport, text).await,
        };

        Some(self.push(Role::Bot, answer))
    }

    async fn ask_onboarding<T: ChatTransport + ?Sized>(
        &mut self,
        transport: &T,
        text: &str,
    ) -> String {
        let request = ChatRequest::Onboarding {
            message: text.to_string(),
            step: self.step,
        };

        match transport.send(&request).await {
            Ok(ChatReply::Onboarding(reply)) => {
                self.step = reply.next_phase;
                reply.response
            }
            Ok(other) => {
                tracing::warn!("Unexpected reply to onboarding request: {:?}", other);
                ErrorType::GeneralError.user_message().to_string()
            }
            Err(e) => {
                tracing::error!("Onboarding request failed: {}", e);
                e.user_friendly_message().to_string()
            }
        }
    }

    async fn collect_location<T: ChatTransport + ?Sized>(
        &mut self,
        transport: &T,
        text: &str,
    ) -> String {
        let business_type = self.business_type.clone().unwrap_or_default();
        let request = ChatRequest::FetchInsights {
            location: text.to_string(),
            business_type: business_type.clone(),
        };

        match transport.send(&request).await {
            Ok(ChatReply::Insights(reply)) => {
                self.location = Some(text.to_string());
                self.insights = Some(reply.insights);
                self.insights_origin = Some(reply.source);
                self.step = OnboardingStep::FreeForm;
                insights_ready(text, &business_type)
            }
            Ok(other) => {
                tracing::warn!("Unexpected reply to insights request: {:?}", other);
                ErrorType::GeneralError.user_message().to_string()
            }
            Err(e) => {
                tracing::error!("Insights request failed: {}", e);
                e.user_friendly_message().to_string()
            }
        }
    }

    async fn ask_strategic<T: ChatTransport + ?Sized>(
        &mut self,
        transport: &T,
        text: &str,
    ) -> String {
        let request = ChatRequest::Strategic {
            message: text.to_string(),
            location: self.location.clone().unwrap_or_default(),
            business_type: self.business_type.clone().unwrap_or_default(),
            insights: self.insights.clone(),
        };

        match transport.send(&request).await {
            Ok(ChatReply::Strategic(reply)) => reply.response,
            Ok(other) => {
                tracing::warn!("Unexpected reply to strategic request: {:?}", other);
                ErrorType::GeneralError.user_message().to_string()
            }
            Err(e) => {
                tracing::error!("Strategic request failed: {}", e);
                e.user_friendly_message().to_string()
            }
        }
    }

    pub fn transcript_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.messages)?)
    }

    pub async fn export<S: Storage>(&self, storage: &S, path: &str) -> Result<()> {
        let data = self.transcript_json()?;
        storage.write_file(path, &data).await?;
        tracing::info!("Transcript with {} messages saved to {}", self.messages.len(), path);
        Ok(())
    }
}
