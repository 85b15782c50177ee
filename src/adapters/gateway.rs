//! API Gateway proxy event shapes (REST v1 and HTTP API v2) used by the
//! Lambda deployment.

use crate::adapters::http::HttpReply;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// REST API (payload v1)
    pub http_method: Option<String>,
    pub request_context: Option<RequestContext>,
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    /// HTTP API (payload v2)
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpContext {
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ProxyRequest {
    pub fn method(&self) -> &str {
        self.http_method
            .as_deref()
            .or_else(|| {
                self.request_context
                    .as_ref()
                    .and_then(|c| c.http.as_ref())
                    .and_then(|h| h.method.as_deref())
            })
            .unwrap_or("POST")
    }

    /// Raw body bytes. An undecodable base64 body yields `None`, which the
    /// handler then rejects as malformed.
    pub fn body_bytes(&self) -> Option<Vec<u8>> {
        let body = self.body.as_deref().unwrap_or_default();
        if self.is_base64_encoded {
            match STANDARD.decode(body) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!("Body is not valid base64: {}", e);
                    None
                }
            }
        } else {
            Some(body.as_bytes().to_vec())
        }
    }
}

impl From<HttpReply> for ProxyResponse {
    fn from(reply: HttpReply) -> Self {
        Self {
            status_code: reply.status,
            headers: reply.headers.into_iter().collect(),
            body: reply.body,
            is_base64_encoded: false,
        }
    }
}
