use crate::adapters::http::{decode_reply, http_client};
use crate::domain::model::{ChatReply, ChatRequest, ChatRequestBody};
use crate::domain::ports::ChatTransport;
use crate::utils::error::{OrchestratorError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Talks to a deployed chat function over HTTP.
pub struct RemoteEndpoint {
    client: Client,
    url: String,
    bearer: Option<String>,
}

impl RemoteEndpoint {
    pub fn new(url: impl Into<String>, bearer: Option<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        validate_url("endpoint", &url)?;

        Ok(Self {
            client: http_client(timeout),
            url,
            bearer,
        })
    }
}

fn transport_error(e: reqwest::Error) -> OrchestratorError {
    OrchestratorError::TransportError {
        message: e.to_string(),
    }
}

#[async_trait]
impl ChatTransport for RemoteEndpoint {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
        let body = ChatRequestBody::from(request);

        tracing::debug!("POST {} ({})", self.url, request.phase());
        let mut builder = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;
        tracing::debug!("Chat endpoint answered {}", status);

        decode_reply(request.phase(), status, &text)
    }
}
