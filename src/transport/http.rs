//! HTTP transport backed by `reqwest`.

use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::config::TransportConfig;
use crate::error::{ResourceError, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncates long bodies and strips non-printable characters before logging.
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// JSON when the body parses, the raw text otherwise, `null` when empty.
fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Production [`Transport`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Option<String>,
    bearer_token: Option<String>,
}

impl ReqwestTransport {
    pub fn from_config(config: &TransportConfig) -> Result<Self, ResourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ResourceError::TransportSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    pub fn new() -> Result<Self, ResourceError> {
        Self::from_config(&TransportConfig::default())
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.target(self.base_url.as_deref());
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(Self::method(request.method), &url);
        let query = request.query_pairs();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            tracing::warn!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(TransportError::response(status.as_u16(), parse_body(&body)));
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            data: parse_body(&body),
        })
    }
}
