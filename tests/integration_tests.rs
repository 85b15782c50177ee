use anyhow::Result;
use httpmock::prelude::*;
use tastematch::adapters::http::HttpReply;
use tastematch::core::insights::mock_insights;
use tastematch::{orchestrator_from_config, EnvConfig, ErrorType};
use tokio_test::{assert_err, assert_ok};

/// 所有外部服務都指向同一個 mock server
fn config_for(server: &MockServer) -> EnvConfig {
    EnvConfig {
        qloo_api_key: Some("qloo-key".to_string()),
        qloo_base_url: server.base_url(),
        gemini_api_key: Some("gem-key".to_string()),
        gemini_base_url: server.base_url(),
        openai_api_key: Some("sk-key".to_string()),
        openai_base_url: server.base_url(),
        ..EnvConfig::default()
    }
}

fn body_of(reply: &HttpReply) -> serde_json::Value {
    serde_json::from_str(&reply.body).unwrap()
}

#[tokio::test]
async fn test_strategic_query_end_to_end() -> Result<()> {
    let server = MockServer::start();
    let qloo_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/insights")
            .query_param("filter.location.query", "Seoul")
            .header("x-api-key", "qloo-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "preferences": ["k-beauty", "cafe culture"],
                "trends": ["wellness"],
                "cultural_clusters": ["early adopters"]
            }));
    });
    let gemini_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-1.5-flash:generateContent")
            .query_param("key", "gem-key")
            .body_contains("k-beauty");
        then.status(200).json_body(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "Lean into cafe culture." }] } }]
        }));
    });
    let openai_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200);
    });

    let orchestrator = orchestrator_from_config(&config_for(&server));
    let reply = orchestrator
        .handle_http(
            "POST",
            br#"{"phase":"strategic","message":"How should I position my skincare brand?","targetLocation":"Seoul","userBusinessType":"skincare"}"#,
        )
        .await;

    qloo_mock.assert();
    gemini_mock.assert();
    openai_mock.assert_hits(0);

    assert_eq!(reply.status, 200);
    assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
    let body = body_of(&reply);
    assert_eq!(body["response"], "Lean into cafe culture.");
    assert_eq!(body["source"], "qloo");
    assert_eq!(body["insights"]["culturalClusters"][0], "early adopters");
    Ok(())
}

#[tokio::test]
async fn test_gemini_failure_falls_back_to_openai() -> Result<()> {
    let server = MockServer::start();
    let gemini_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-1.5-flash:generateContent");
        then.status(429).body("quota exceeded");
    });
    let openai_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer sk-key");
        then.status(200).json_body(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Partner with local bakeries." } }]
        }));
    });

    let orchestrator = orchestrator_from_config(&config_for(&server));
    let reply = orchestrator
        .handle_http(
            "POST",
            br#"{"phase":"strategic","message":"Ideas?","targetLocation":"France","userBusinessType":"coffee","qlooInsights":{"preferences":["gourmet food"],"trends":[],"culturalClusters":[]}}"#,
        )
        .await;

    gemini_mock.assert();
    openai_mock.assert();
    assert_eq!(reply.status, 200);
    let body = body_of(&reply);
    assert_eq!(body["response"], "Partner with local bakeries.");
    assert_eq!(body["source"], "client");
    Ok(())
}

#[tokio::test]
async fn test_qloo_outage_returns_mock_insights() -> Result<()> {
    let server = MockServer::start();
    let qloo_mock = server.mock(|when, then| {
        when.method(GET).path("/v2/insights");
        then.status(500);
    });

    let orchestrator = orchestrator_from_config(&config_for(&server));
    let reply = orchestrator
        .handle_http(
            "POST",
            br#"{"phase":"fetch_qloo_insights","targetLocation":"USA","userBusinessType":"diner"}"#,
        )
        .await;

    qloo_mock.assert();
    assert_eq!(reply.status, 200);
    let body = body_of(&reply);
    assert_eq!(body["source"], "mock");

    let expected = mock_insights("usa");
    assert_eq!(body["preferences"], serde_json::json!(expected.preferences));
    assert_eq!(body["trends"], serde_json::json!(expected.trends));
    Ok(())
}

#[tokio::test]
async fn test_qloo_outage_without_fallback_is_503() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v2/insights");
        then.status(502);
    });

    let config = EnvConfig {
        mock_insights_fallback: false,
        ..config_for(&server)
    };
    let orchestrator = orchestrator_from_config(&config);
    let reply = orchestrator
        .handle_http(
            "POST",
            br#"{"phase":"fetch_qloo_insights","targetLocation":"Peru","userBusinessType":"hotel"}"#,
        )
        .await;

    assert_eq!(reply.status, 503);
    let body = body_of(&reply);
    assert_eq!(body["errorType"], "QLOO_API_ERROR");
    assert_eq!(body["message"], ErrorType::QlooApiError.user_message());
    Ok(())
}

#[tokio::test]
async fn test_missing_keys() -> Result<()> {
    let orchestrator = orchestrator_from_config(&EnvConfig::default());

    // onboarding still answers with canned text
    let reply = orchestrator
        .handle_http(
            "POST",
            br#"{"phase":"onboarding_sub_phase","onboardingSubPhase":"initial_question","message":"Comment ca marche ?"}"#,
        )
        .await;
    assert_eq!(reply.status, 200);
    let body = body_of(&reply);
    assert_eq!(body["nextPhase"], "explaining_app");
    assert!(body["response"].as_str().unwrap().contains("Cultural AI Assistant"));

    // strategic queries cannot be answered at all
    let reply = orchestrator
        .handle_http(
            "POST",
            br#"{"phase":"strategic","message":"Go?","targetLocation":"Japan","userBusinessType":"shop"}"#,
        )
        .await;
    assert_eq!(reply.status, 503);
    assert_eq!(body_of(&reply)["errorType"], "MISSING_API_KEYS");
    Ok(())
}

#[tokio::test]
async fn test_invalid_requests_are_rejected() -> Result<()> {
    let orchestrator = orchestrator_from_config(&EnvConfig::default());

    let cases: [&[u8]; 6] = [
        br#"{"phase":"strategic","targetLocation":"Japan","userBusinessType":"shop"}"#,
        br#"{"message":"hello"}"#,
        br#"{"phase":"smalltalk","message":"hello"}"#,
        br#"{"phase":"onboarding_sub_phase","message":"hello"}"#,
        br#"{"phase":"onboarding_sub_phase","onboardingSubPhase":"finished","message":"hello"}"#,
        br#"{"phase":"fetch_qloo_insights","targetLocation":"Japan"}"#,
    ];

    for case in cases {
        let reply = orchestrator.handle_http("POST", case).await;
        assert_eq!(reply.status, 400, "body: {}", String::from_utf8_lossy(case));
        assert_eq!(body_of(&reply)["errorType"], "INVALID_REQUEST");
    }
    Ok(())
}

#[tokio::test]
async fn test_config_from_env_builds_working_orchestrator() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello from OpenAI" } }]
        }));
    });

    let base_url = server.base_url();
    let config = assert_ok!(EnvConfig::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("sk-env".to_string()),
        "OPENAI_API_URL" => Some(base_url.clone()),
        _ => None,
    }));
    assert_err!(EnvConfig::from_lookup(|key| match key {
        "REQUEST_TIMEOUT_SECONDS" => Some("-1".to_string()),
        _ => None,
    }));

    let orchestrator = orchestrator_from_config(&config);
    let reply = orchestrator
        .onboarding("hi", tastematch::core::OnboardingStep::InitialQuestion)
        .await;

    assert_eq!(reply.response, "Hello from OpenAI");
    Ok(())
}
