//! In-memory transport for tests
//!
//! Routes are keyed by `path_and_query()`. A gated route holds every request
//! until the test releases it, which lets tests control resolution order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::{ClientError, Result};

use super::{ApiRequest, Transport};

#[derive(Clone)]
enum MockReply {
    Ok(Value),
    Err { status: u16, message: String },
}

#[derive(Clone)]
struct MockRoute {
    reply: MockReply,
    gate: Option<Arc<Notify>>,
}

/// Mock transport for testing
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, MockRoute>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, key: &str, body: Value) {
        self.set_reply(key, MockReply::Ok(body));
    }

    pub fn fail(&self, key: &str, status: u16, message: &str) {
        self.set_reply(
            key,
            MockReply::Err {
                status,
                message: message.to_string(),
            },
        );
    }

    /// Hold requests for `key` until the returned handle is notified.
    /// Each `notify_one` releases one request.
    pub fn gate(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        let mut routes = self.routes.lock();
        let route = routes.entry(key.to_string()).or_insert(MockRoute {
            reply: MockReply::Ok(Value::Null),
            gate: None,
        });
        route.gate = Some(gate.clone());
        gate
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Yield until at least `count` requests have been received
    pub async fn wait_for_requests(&self, count: usize) {
        while self.request_count() < count {
            tokio::task::yield_now().await;
        }
    }

    fn set_reply(&self, key: &str, reply: MockReply) {
        let mut routes = self.routes.lock();
        match routes.get_mut(key) {
            Some(route) => route.reply = reply,
            None => {
                routes.insert(key.to_string(), MockRoute { reply, gate: None });
            }
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let key = request.path_and_query();
        self.requests.lock().push(request);

        let route = self.routes.lock().get(&key).cloned();
        let route = match route {
            Some(route) => route,
            None => {
                return Err(ClientError::Api {
                    status: 404,
                    message: format!("No mock route for {}", key),
                })
            }
        };

        if let Some(gate) = route.gate {
            gate.notified().await;
        }

        match route.reply {
            MockReply::Ok(body) => Ok(body),
            MockReply::Err { status, message } => Err(ClientError::Api { status, message }),
        }
    }
}
