use crate::utils::error::{ErrorType, OrchestratorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Request `phase` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    OnboardingSubPhase,
    Strategic,
    FetchQlooInsights,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::OnboardingSubPhase => "onboarding_sub_phase",
            Phase::Strategic => "strategic",
            Phase::FetchQlooInsights => "fetch_qloo_insights",
        }
    }
}

impl FromStr for Phase {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "onboarding_sub_phase" => Ok(Phase::OnboardingSubPhase),
            "strategic" => Ok(Phase::Strategic),
            "fetch_qloo_insights" => Ok(Phase::FetchQlooInsights),
            other => Err(OrchestratorError::invalid_request(format!(
                "unknown phase '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scripted introduction sequence:
/// initial question -> explain app -> business type -> location -> free form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    InitialQuestion,
    ExplainingApp,
    CollectingBusinessType,
    CollectingLocation,
    FreeForm,
}

impl OnboardingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::InitialQuestion => "initial_question",
            OnboardingStep::ExplainingApp => "explaining_app",
            OnboardingStep::CollectingBusinessType => "collecting_business_type",
            OnboardingStep::CollectingLocation => "collecting_location",
            OnboardingStep::FreeForm => "free_form",
        }
    }
}

impl FromStr for OnboardingStep {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "initial_question" => Ok(OnboardingStep::InitialQuestion),
            "explaining_app" => Ok(OnboardingStep::ExplainingApp),
            "collecting_business_type" => Ok(OnboardingStep::CollectingBusinessType),
            "collecting_location" => Ok(OnboardingStep::CollectingLocation),
            "free_form" => Ok(OnboardingStep::FreeForm),
            other => Err(OrchestratorError::invalid_request(format!(
                "unknown onboarding sub-phase '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QlooInsight {
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub trends: Vec<String>,
    #[serde(default)]
    pub cultural_clusters: Vec<String>,
}

impl QlooInsight {
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty() && self.trends.is_empty() && self.cultural_clusters.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightOrigin {
    Qloo,
    Mock,
    Client,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightsReport {
    pub insights: QlooInsight,
    pub origin: InsightOrigin,
}

/// Body as it arrives on the wire. Every field is optional here;
/// [`ChatRequest::try_from`] decides what is actually required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_sub_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qloo_insights: Option<QlooInsight>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatRequest {
    Onboarding {
        message: String,
        step: OnboardingStep,
    },
    FetchInsights {
        location: String,
        business_type: String,
    },
    Strategic {
        message: String,
        location: String,
        business_type: String,
        insights: Option<QlooInsight>,
    },
}

impl ChatRequest {
    pub fn phase(&self) -> Phase {
        match self {
            ChatRequest::Onboarding { .. } => Phase::OnboardingSubPhase,
            ChatRequest::FetchInsights { .. } => Phase::FetchQlooInsights,
            ChatRequest::Strategic { .. } => Phase::Strategic,
        }
    }
}

impl TryFrom<ChatRequestBody> for ChatRequest {
    type Error = OrchestratorError;

    fn try_from(body: ChatRequestBody) -> Result<Self> {
        use crate::utils::validation::require_field;

        let phase: Phase = require_field("phase", body.phase.as_deref())?.parse()?;

        match phase {
            Phase::FetchQlooInsights => Ok(ChatRequest::FetchInsights {
                location: require_field("targetLocation", body.target_location.as_deref())?,
                business_type: require_field(
                    "userBusinessType",
                    body.user_business_type.as_deref(),
                )?,
            }),
            Phase::OnboardingSubPhase => {
                let message = require_field("message", body.message.as_deref())?;
                let step = require_field(
                    "onboardingSubPhase",
                    body.onboarding_sub_phase.as_deref(),
                )?
                .parse()?;
                Ok(ChatRequest::Onboarding { message, step })
            }
            Phase::Strategic => Ok(ChatRequest::Strategic {
                message: require_field("message", body.message.as_deref())?,
                location: require_field("targetLocation", body.target_location.as_deref())?,
                business_type: require_field(
                    "userBusinessType",
                    body.user_business_type.as_deref(),
                )?,
                insights: body.qloo_insights,
            }),
        }
    }
}

impl From<&ChatRequest> for ChatRequestBody {
    fn from(request: &ChatRequest) -> Self {
        let mut body = ChatRequestBody {
            phase: Some(request.phase().as_str().to_string()),
            ..Default::default()
        };

        match request {
            ChatRequest::Onboarding { message, step } => {
                body.message = Some(message.clone());
                body.onboarding_sub_phase = Some(step.as_str().to_string());
            }
            ChatRequest::FetchInsights {
                location,
                business_type,
            } => {
                body.target_location = Some(location.clone());
                body.user_business_type = Some(business_type.clone());
            }
            ChatRequest::Strategic {
                message,
                location,
                business_type,
                insights,
            } => {
                body.message = Some(message.clone());
                body.target_location = Some(location.clone());
                body.user_business_type = Some(business_type.clone());
                body.qloo_insights = insights.clone();
            }
        }

        body
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingReply {
    pub response: String,
    pub next_phase: OnboardingStep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReply {
    #[serde(flatten)]
    pub insights: QlooInsight,
    pub source: InsightOrigin,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicReply {
    pub response: String,
    pub insights: QlooInsight,
    pub source: InsightOrigin,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Onboarding(OnboardingReply),
    Strategic(StrategicReply),
    Insights(InsightsReply),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub error_type: ErrorType,
}

impl ErrorBody {
    /// The `error` field is constant; clients branch on `errorType`.
    pub fn from_type(error_type: ErrorType) -> Self {
        Self {
            error: "Internal server error".to_string(),
            message: error_type.user_message().to_string(),
            error_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: usize,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
