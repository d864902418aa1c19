//! # Mock Transport
//!
//! An in-memory [`Transport`] for testing effects without a server.
//!
//! Register expectations up front with [`MockTransport::expect`], hand a clone of the
//! mock to the resource, then call [`MockTransport::verify`] at the end of the test.
//!
//! # Example
//! ```ignore
//! let mock = MockTransport::new();
//! mock.expect(Method::Get, "/todos/5").respond_ok(json!({"title": "x"}));
//! mock.expect(Method::Get, "/todos/6")
//!     .delay(Duration::from_millis(50))
//!     .respond_err(TransportError::response(404, json!({"message": "nf"})));
//!
//! let definition = ResourceDefinition::new("todos")
//!     .path("/todos/:id")
//!     .transport(Arc::new(mock.clone()));
//! // dispatch, await...
//! mock.verify();
//! ```

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// An expected call and the response it produces.
struct Expectation {
    method: Method,
    url: String,
    delay: Option<Duration>,
    response: Result<Value, TransportError>,
}

/// A transport answering from a queue of expectations.
///
/// A request is matched against the first pending expectation with the same method
/// and rendered path, so expectations for different paths can be consumed in any
/// order. Requests with no matching expectation fail with a network error.
#[derive(Clone, Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects one `method` request to `url` (the rendered path, without origin).
    pub fn expect(&self, method: Method, url: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            method,
            url: url.into(),
            delay: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let exps = lock(&self.expectations);
        if !exps.is_empty() {
            let pending: Vec<String> = exps
                .iter()
                .map(|e| format!("{} {}", e.method, e.url))
                .collect();
            panic!(
                "Not all expectations were met. {} remaining: {:?}",
                exps.len(),
                pending
            );
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let expectation = {
            let mut exps = lock(&self.expectations);
            let index = exps
                .iter()
                .position(|e| e.method == request.method && e.url == request.url);
            index.and_then(|index| exps.remove(index))
        };
        let method = request.method;
        let url = request.url.clone();
        lock(&self.requests).push(request);

        let Some(expectation) = expectation else {
            return Err(TransportError::network(format!(
                "Unexpected request: {} {}",
                method, url
            )));
        };
        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        expectation
            .response
            .map(|data| HttpResponse { status: 200, data })
    }
}

/// Builder returned by [`MockTransport::expect`].
pub struct ExpectationBuilder {
    method: Method,
    url: String,
    delay: Option<Duration>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    /// Holds the response back for `delay`.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Responds with status 200 and `data`.
    pub fn respond_ok(self, data: Value) {
        self.push(Ok(data));
    }

    pub fn respond_err(self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Value, TransportError>) {
        lock(&self.expectations).push_back(Expectation {
            method: self.method,
            url: self.url,
            delay: self.delay,
            response,
        });
    }
}
