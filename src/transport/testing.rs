//! In-memory `Transport` with scripted replies, for dispatcher/session tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

use super::{Method, Transport, TransportError};

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
}

enum Reply {
    Ready(Result<String, TransportError>),
    Held(oneshot::Receiver<Result<String, TransportError>>),
}

/// Replies are queued per endpoint and consumed in order.
/// An endpoint with nothing queued answers 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, endpoint: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn reply(&self, endpoint: &str, body: &str) -> &Self {
        self.push(endpoint, Reply::Ready(Ok(body.to_string())));
        self
    }

    pub fn fail(&self, endpoint: &str, err: TransportError) -> &Self {
        self.push(endpoint, Reply::Ready(Err(err)));
        self
    }

    /// Queue a reply that is only delivered once the returned sender fires.
    pub fn hold(&self, endpoint: &str) -> oneshot::Sender<Result<String, TransportError>> {
        let (tx, rx) = oneshot::channel();
        self.push(endpoint, Reply::Held(rx));
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.endpoint == endpoint)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<String, TransportError> {
        self.calls.lock().unwrap().push(Call {
            method,
            endpoint: endpoint.to_string(),
            body,
        });

        let next = self
            .replies
            .lock()
            .unwrap()
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Held(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Network("reply dropped".into()))),
            None => Err(TransportError::Status {
                status: 404,
                body: format!("no scripted reply for {endpoint}"),
            }),
        }
    }
}
