use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ApiRequest, HttpResponse, Transport, TransportFailure};

/// Canned reply for one endpoint path.
#[derive(Debug, Clone)]
pub(crate) struct Scripted {
    reply: Result<HttpResponse, TransportFailure>,
    delay: Option<Duration>,
}

impl Scripted {
    pub(crate) fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(HttpResponse {
                status,
                body: body.to_string(),
            }),
            delay: None,
        }
    }

    pub(crate) fn fail(message: &str) -> Self {
        Self {
            reply: Err(TransportFailure(message.to_string())),
            delay: None,
        }
    }

    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// In-memory transport that replies per path and records every request.
/// Paths without a script answer 404.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: HashMap<&'static str, Scripted>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, path: &'static str, reply: Scripted) -> Self {
        self.replies.insert(path, reply);
        self
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, request: &ApiRequest) -> Result<HttpResponse, TransportFailure> {
        self.calls.lock().unwrap().push(request.clone());
        let Some(scripted) = self.replies.get(request.path).cloned() else {
            return Ok(HttpResponse {
                status: 404,
                body: "not found".into(),
            });
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.reply
    }
}
