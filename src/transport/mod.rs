//! Request transport (method + endpoint + JSON body -> response text).
//!
//! parse_server -> validated base `Url` for the game service
//! Transport    -> async request contract the dispatcher depends on
//! HttpTransport (http.rs) -> reqwest implementation used by the binary
//!
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use url::Url;

pub mod http;

#[cfg(test)]
pub mod testing;

pub use http::HttpTransport;

/// HTTP-style verb used by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Any failure between issuing a request and holding a usable payload.
///
/// The dispatcher never branches on the variant: the `Display` text is the
/// one line the user sees.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, reset, DNS failure, body read failure...
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload did not have the shape the command expects.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn decode(err: impl fmt::Display) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// Request/response contract of the remote game service.
///
/// Returns the raw response body on success; decoding is left to the caller
/// so that commands with text replies and JSON replies share one path.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<String, TransportError>;
}

/// Parse a `--server` value into a base URL suitable for `Url::join`.
///
/// Only http/https are accepted. The path always ends with `/` so that
/// endpoints resolve beneath it instead of replacing its last segment.
pub fn parse_server(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Server URL is empty");
    }

    let mut url =
        Url::parse(trimmed).with_context(|| format!("Failed to parse server URL: '{trimmed}'"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!("Unsupported server scheme '{other}' (expected http or https)"),
    }
    if url.cannot_be_a_base() {
        bail!("Server URL cannot be used as a base: '{trimmed}'");
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Resolve an endpoint such as `/scan` beneath a base produced by [`parse_server`].
pub fn endpoint_url(base: &Url, endpoint: &str) -> Result<Url, TransportError> {
    base.join(endpoint.trim_start_matches('/'))
        .map_err(|e| TransportError::Network(format!("invalid endpoint '{endpoint}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_host() {
        let url = parse_server("http://127.0.0.1:5000").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/");
    }

    #[test]
    fn parse_keeps_mount_path() {
        let url = parse_server(" https://games.example/infiltr8 ").unwrap();
        assert_eq!(url.as_str(), "https://games.example/infiltr8/");
        let scan = endpoint_url(&url, "/scan").unwrap();
        assert_eq!(scan.as_str(), "https://games.example/infiltr8/scan");
    }

    #[test]
    fn parse_rejects_other_schemes() {
        let err = parse_server("ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("Unsupported server scheme"));
    }

    #[test]
    fn empty_server_rejected() {
        let err = parse_server("   ").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn garbage_server_rejected() {
        assert!(parse_server("not a url").is_err());
    }

    #[test]
    fn error_display_is_single_line_detail() {
        let err = TransportError::Status {
            status: 404,
            body: r#"{"error":"Node not found"}"#.into(),
        };
        assert_eq!(
            err.to_string(),
            r#"server returned 404: {"error":"Node not found"}"#
        );
        assert_eq!(Method::Post.to_string(), "POST");
    }
}
