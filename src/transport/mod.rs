//! # Transport
//!
//! The HTTP boundary of the crate. Built-in remote effects only ever talk to a
//! [`Transport`]; which one is used is decided per resource at definition time.
//!
//! - [`ReqwestTransport`] - the production transport, built from a
//!   [`TransportConfig`](crate::config::TransportConfig)
//! - [`MockTransport`](crate::mock::MockTransport) - in-memory expectations for tests

pub mod http;

pub use http::ReqwestTransport;

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

/// HTTP methods used by the built-in remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request shaped by a remote effect.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Origin taken from the resource path, if it carried one.
    pub base_url: Option<String>,
    /// Concrete path, template already rendered.
    pub url: String,
    pub query: Option<Map<String, Value>>,
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Joins the request's origin (or `fallback_base` when it has none) and path.
    pub fn target(&self, fallback_base: Option<&str>) -> String {
        match self.base_url.as_deref().or(fallback_base) {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), self.url),
            None => self.url.clone(),
        }
    }

    /// Query values flattened to strings; `null` entries are dropped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .flatten()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), text)
            })
            .collect()
    }
}

/// A successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub data: Value,
}

/// Performs remote calls for built-in effects.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolves with the parsed response, or fails with the status and body of a
    /// non-success response (or with neither, when nothing was received).
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(base_url: Option<&str>) -> HttpRequest {
        HttpRequest {
            method: Method::Get,
            base_url: base_url.map(str::to_string),
            url: "/todos/5".to_string(),
            query: json!({"page": 2, "q": "milk", "skip": null})
                .as_object()
                .cloned(),
            body: None,
        }
    }

    #[test]
    fn test_target_prefers_request_origin() {
        assert_eq!(
            request(Some("http://a.test/")).target(Some("http://b.test")),
            "http://a.test/todos/5"
        );
        assert_eq!(
            request(None).target(Some("http://b.test")),
            "http://b.test/todos/5"
        );
        assert_eq!(request(None).target(None), "/todos/5");
    }

    #[test]
    fn test_query_pairs_stringify_values() {
        let pairs = request(None).query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("q".to_string(), "milk".to_string())
            ]
        );
    }
}
