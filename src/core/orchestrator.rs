use crate::adapters::http::{decode_reply, CorsPolicy, HttpReply};
use crate::core::{onboarding, prompt};
use crate::domain::model::{
    ChatReply, ChatRequest, ChatRequestBody, InsightOrigin, InsightsReply, InsightsReport,
    OnboardingReply, OnboardingStep, QlooInsight, StrategicReply,
};
use crate::domain::ports::{ChatTransport, InsightsSource, TextGenerator};
use crate::utils::error::{ErrorType, OrchestratorError, Result};
use async_trait::async_trait;
use chrono::Utc;

/// The chat function: validates a request, branches on its phase and
/// talks to the insights source and the language model.
pub struct ChatOrchestrator<I: InsightsSource, G: TextGenerator> {
    insights: I,
    llm: G,
    cors: CorsPolicy,
}

impl<I: InsightsSource, G: TextGenerator> ChatOrchestrator<I, G> {
    pub fn new(insights: I, llm: G) -> Self {
        Self {
            insights,
            llm,
            cors: CorsPolicy::default(),
        }
    }

    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    /// HTTP boundary: every outcome, including failures, becomes a JSON reply.
    pub async fn handle_http(&self, method: &str, body: &[u8]) -> HttpReply {
        if method.eq_ignore_ascii_case("OPTIONS") {
            return HttpReply::preflight(&self.cors);
        }

        if !method.eq_ignore_ascii_case("POST") {
            tracing::warn!("Rejected {} request", method);
            return HttpReply::error_with_status(ErrorType::InvalidRequest, 405, &self.cors);
        }

        let request = match parse_body(body) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("Invalid request: {}", e);
                return HttpReply::error(e.error_type(), &self.cors);
            }
        };

        match self.handle(request).await {
            Ok(reply) => HttpReply::json(200, &reply, &self.cors),
            Err(e) => {
                tracing::error!("Chat orchestrator error: {}", e);
                HttpReply::error(e.error_type(), &self.cors)
            }
        }
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply> {
        tracing::info!("Handling {} request", request.phase());

        match request {
            ChatRequest::Onboarding { message, step } => {
                Ok(ChatReply::Onboarding(self.onboarding(&message, step).await))
            }
            ChatRequest::FetchInsights {
                location,
                business_type,
            } => {
                let report = self.insights.fetch_insights(&location, &business_type).await?;
                Ok(ChatReply::Insights(InsightsReply {
                    insights: report.insights,
                    source: report.origin,
                    timestamp: Utc::now(),
                }))
            }
            ChatRequest::Strategic {
                message,
                location,
                business_type,
                insights,
            } => Ok(ChatReply::Strategic(
                self.strategic(&message, &location, &business_type, insights)
                    .await?,
            )),
        }
    }

    /// Never fails: a model error yields the canned text for the step.
    pub async fn onboarding(&self, message: &str, step: OnboardingStep) -> OnboardingReply {
        let next_phase = onboarding::next_step(step, message);
        let prompt = prompt::build_onboarding_prompt(message, step, next_phase);

        match self.llm.generate(&prompt).await {
            Ok(response) => OnboardingReply {
                response,
                next_phase,
            },
            Err(e) => {
                tracing::warn!("Onboarding reply falls back to canned text: {}", e);
                onboarding::fallback_reply(step, message)
            }
        }
    }

    pub async fn strategic(
        &self,
        message: &str,
        location: &str,
        business_type: &str,
        insights: Option<QlooInsight>,
    ) -> Result<StrategicReply> {
        let report = match insights {
            Some(insights) => InsightsReport {
                insights,
                origin: InsightOrigin::Client,
            },
            None => self.insights.fetch_insights(location, business_type).await?,
        };

        let prompt =
            prompt::build_strategic_prompt(message, &report.insights, location, business_type);
        let response = self.llm.generate(&prompt).await?;

        Ok(StrategicReply {
            response,
            insights: report.insights,
            source: report.origin,
            timestamp: Utc::now(),
        })
    }
}

fn parse_body(body: &[u8]) -> Result<ChatRequest> {
    let body: ChatRequestBody = serde_json::from_slice(body)
        .map_err(|e| OrchestratorError::invalid_request(format!("invalid JSON: {}", e)))?;
    ChatRequest::try_from(body)
}

/// In-process transport: the request goes through the same HTTP boundary a
/// deployed function would use.
#[async_trait]
impl<I: InsightsSource, G: TextGenerator> ChatTransport for ChatOrchestrator<I, G> {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
        let body = serde_json::to_vec(&ChatRequestBody::from(request))?;
        let reply = self.handle_http("POST", &body).await;
        decode_reply(request.phase(), reply.status, &reply.body)
    }
}
