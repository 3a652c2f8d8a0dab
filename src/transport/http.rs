/*!
http.rs - reqwest-backed `Transport`.

Every command is a single request against `<base>/<endpoint>`. JSON bodies are
sent with `Content-Type: application/json`; the reply body is returned as text
on 2xx and turned into `TransportError::Status` otherwise. Extra headers given
on the command line (`-H KEY=VALUE`) are installed as client defaults.
*/

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{Method, Transport, TransportError, endpoint_url};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(base: Url, headers: &[(String, String)]) -> Result<Self> {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .with_context(|| format!("invalid header name: {k}"))?;
            let value =
                HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
            map.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(map)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<String, TransportError> {
        let url = endpoint_url(&self.base, endpoint)?;
        debug!(%method, %url, "issuing request");

        let mut builder = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(%method, endpoint, error = %e, "request failed");
            TransportError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(%method, endpoint, status = status.as_u16(), "non-success status");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text.lines().map(str::trim).collect::<Vec<_>>().join(" "),
            });
        }

        Ok(text)
    }
}
