use crate::domain::model::{ChatReply, ErrorBody, Phase};
use crate::utils::error::{ErrorType, OrchestratorError, Result};
use serde::Serialize;
use std::time::Duration;

pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: String,
}

impl CorsPolicy {
    pub fn new(allow_origin: impl Into<String>) -> Self {
        Self {
            allow_origin: allow_origin.into(),
        }
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "Access-Control-Allow-Origin".to_string(),
                self.allow_origin.clone(),
            ),
            (
                "Access-Control-Allow-Headers".to_string(),
                ALLOW_HEADERS.to_string(),
            ),
            (
                "Access-Control-Allow-Methods".to_string(),
                ALLOW_METHODS.to_string(),
            ),
        ]
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CORS_ORIGIN)
    }
}

/// Transport-neutral HTTP answer; the Lambda and CLI adapters translate it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpReply {
    pub fn preflight(cors: &CorsPolicy) -> Self {
        Self {
            status: 200,
            headers: cors.headers(),
            body: "ok".to_string(),
        }
    }

    pub fn json<T: Serialize>(status: u16, payload: &T, cors: &CorsPolicy) -> Self {
        let mut headers = cors.headers();
        headers.push(("Content-Type".to_string(), "application/json".to_string()));

        match serde_json::to_string(payload) {
            Ok(body) => Self {
                status,
                headers,
                body,
            },
            Err(e) => {
                tracing::error!("Failed to serialize reply: {}", e);
                Self {
                    status: 500,
                    headers,
                    body: format!(
                        r#"{{"error":"Internal server error","message":"{}","errorType":"GENERAL_ERROR"}}"#,
                        ErrorType::GeneralError.user_message()
                    ),
                }
            }
        }
    }

    pub fn error(error_type: ErrorType, cors: &CorsPolicy) -> Self {
        Self::error_with_status(error_type, error_type.status_code(), cors)
    }

    pub fn error_with_status(error_type: ErrorType, status: u16, cors: &CorsPolicy) -> Self {
        Self::json(status, &ErrorBody::from_type(error_type), cors)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound client with the configured timeout. A builder failure is logged
/// and the default client is used instead.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(
                "⚠️ Could not build HTTP client with {:?} timeout ({}), using defaults",
                timeout,
                e
            );
            reqwest::Client::new()
        }
    }
}

/// Decodes a reply body for the phase that was requested. Non-success
/// statuses become [`OrchestratorError::ServiceError`].
pub fn decode_reply(phase: Phase, status: u16, body: &str) -> Result<ChatReply> {
    if !(200..300).contains(&status) {
        let (error_type, message) = match serde_json::from_str::<ErrorBody>(body) {
            Ok(err) => (err.error_type, err.message),
            Err(_) => (ErrorType::GeneralError, body.to_string()),
        };
        return Err(OrchestratorError::ServiceError {
            status,
            error_type,
            message,
        });
    }

    let reply = match phase {
        Phase::OnboardingSubPhase => serde_json::from_str(body).map(ChatReply::Onboarding),
        Phase::FetchQlooInsights => serde_json::from_str(body).map(ChatReply::Insights),
        Phase::Strategic => serde_json::from_str(body).map(ChatReply::Strategic),
    };
    reply.map_err(|e| OrchestratorError::TransportError {
        message: format!("malformed {} reply: {}", phase, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::OnboardingStep;

    #[test]
    fn test_error_reply_carries_canned_message_and_cors() {
        let reply = HttpReply::error(ErrorType::InvalidRequest, &CorsPolicy::default());

        assert_eq!(reply.status, 400);
        assert_eq!(reply.header("access-control-allow-origin"), Some("*"));
        assert_eq!(reply.header("content-type"), Some("application/json"));

        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(body["errorType"], "INVALID_REQUEST");
        assert_eq!(body["message"], ErrorType::InvalidRequest.user_message());
    }

    #[test]
    fn test_preflight() {
        let reply = HttpReply::preflight(&CorsPolicy::new("https://tastematch.example"));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "ok");
        assert_eq!(
            reply.header("Access-Control-Allow-Origin"),
            Some("https://tastematch.example")
        );
    }

    #[test]
    fn test_decode_reply_by_phase() {
        let reply = decode_reply(
            Phase::OnboardingSubPhase,
            200,
            r#"{"response":"hi","nextPhase":"explaining_app"}"#,
        )
        .unwrap();

        match reply {
            ChatReply::Onboarding(r) => {
                assert_eq!(r.response, "hi");
                assert_eq!(r.next_phase, OnboardingStep::ExplainingApp);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_decode_reply_malformed_success_body_is_general_error() {
        let err = decode_reply(Phase::Strategic, 200, "<html>gateway</html>").unwrap_err();

        assert!(matches!(err, OrchestratorError::TransportError { .. }));
        assert_eq!(err.error_type(), ErrorType::GeneralError);
        assert_eq!(err.user_friendly_message(), ErrorType::GeneralError.user_message());
    }

    #[test]
    fn test_http_client_applies_timeout() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.any_request();
            then.status(200).delay(Duration::from_secs(2));
        });

        let client = http_client(Duration::from_millis(200));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = runtime.block_on(async { client.get(server.url("/slow")).send().await });

        let err = result.unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_decode_reply_error_status() {
        let err = decode_reply(
            Phase::Strategic,
            503,
            r#"{"error":"Internal server error","message":"busy","errorType":"LLM_API_ERROR"}"#,
        )
        .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::LlmApiError);

        let err = decode_reply(Phase::Strategic, 502, "Bad Gateway").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::GeneralError);
    }
}
