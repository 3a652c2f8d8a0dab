//! Session context: the player's handle and the write-once session id.
//!
//! One `SessionContext` is created at startup and shared (`Arc`) with the
//! dispatcher. The id goes from absent to present at most once, when `/start`
//! succeeds; commands issued while it is absent still go out, carrying `null`.

use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::transport::{Method, Transport, TransportError};

pub const DEFAULT_HANDLE: &str = "anon";

#[derive(Debug)]
pub struct SessionContext {
    handle: String,
    session_id: OnceLock<String>,
}

#[derive(Deserialize)]
struct StartReply {
    #[serde(alias = "sessionId")]
    session_id: String,
}

impl SessionContext {
    /// Blank handles fall back to [`DEFAULT_HANDLE`].
    pub fn new(handle: impl Into<String>) -> Self {
        let handle = handle.into();
        let handle = match handle.trim() {
            "" => DEFAULT_HANDLE.to_string(),
            h => h.to_string(),
        };
        Self {
            handle,
            session_id: OnceLock::new(),
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }

    /// `POST /start {username}` and remember the returned id.
    ///
    /// Once an id is held, later calls return it without touching the network.
    pub async fn establish(&self, transport: &dyn Transport) -> Result<String, TransportError> {
        if let Some(id) = self.session_id() {
            return Ok(id.to_string());
        }

        let body = json!({ "username": self.handle, "handle": self.handle });
        let reply = transport
            .request(Method::Post, "/start", Some(body))
            .await
            .inspect_err(|e| warn!(handle = %self.handle, error = %e, "session establishment failed"))?;

        let StartReply { session_id } =
            serde_json::from_str(&reply).map_err(TransportError::decode)?;
        let id = self.session_id.get_or_init(|| session_id).clone();
        info!(handle = %self.handle, session = %id, "session established");
        Ok(id)
    }

    #[cfg(test)]
    pub fn set_session_id_for_test(&self, id: &str) {
        let _ = self.session_id.set(id.to_string());
    }
}
