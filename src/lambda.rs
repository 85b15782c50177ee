#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use std::sync::Arc;
#[cfg(feature = "lambda")]
use tastematch::adapters::gateway::{ProxyRequest, ProxyResponse};
#[cfg(feature = "lambda")]
use tastematch::adapters::http::HttpReply;
#[cfg(feature = "lambda")]
use tastematch::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use tastematch::{orchestrator_from_config, DefaultOrchestrator, EnvConfig, ErrorType};

#[cfg(feature = "lambda")]
async fn function_handler(
    orchestrator: Arc<DefaultOrchestrator>,
    event: LambdaEvent<ProxyRequest>,
) -> Result<ProxyResponse, Error> {
    let method = event.payload.method().to_string();
    tracing::info!(request_id = %event.context.request_id, %method, "Chat request received");

    let reply = match event.payload.body_bytes() {
        Some(body) => orchestrator.handle_http(&method, &body).await,
        None => HttpReply::error(ErrorType::InvalidRequest, orchestrator.cors()),
    };

    tracing::info!(status = reply.status, "Chat request completed");
    Ok(ProxyResponse::from(reply))
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 建立配置 (環境變數)
    let config = EnvConfig::from_env()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    config
        .validate()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    // 冷啟動時建立一次，之後每次呼叫共用
    let orchestrator = Arc::new(orchestrator_from_config(&config));

    run(service_fn(move |event: LambdaEvent<ProxyRequest>| {
        let orchestrator = Arc::clone(&orchestrator);
        async move { function_handler(orchestrator, event).await }
    }))
    .await
}
