//! Request-processor bridge adapter.
//!
//! The accounting engine only accepts qbXML through its local request
//! processor. A bridge process on the engine host exposes that processor over
//! HTTP:
//!
//! - `POST {bridge}/sessions` with `{companyPath, multiUser}` returns `{ticket}`
//! - `POST {bridge}/sessions/{ticket}/requests` exchanges one request document
//! - `DELETE {bridge}/sessions/{ticket}` ends the session
//!
//! Any network error or non-2xx answer is a [`GatewayError::Transport`].

use std::time::Duration;

use async_trait::async_trait;
use qbsync_core::gateway::{GatewayError, RequestProcessor, SessionTicket};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default per-request timeout. Large batches keep a session open for
/// minutes, but each exchange is short.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OpenSession<'a> {
    company_path: &'a str,
    multi_user: bool,
}

#[derive(Debug, Deserialize)]
struct OpenedSession {
    ticket: String,
}

/// [`RequestProcessor`] that talks to a request-processor bridge over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRequestProcessor {
    client: Client,
    base_url: String,
}

impl HttpRequestProcessor {
    /// Creates an adapter for the bridge at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Bridge base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn session_url(&self, ticket: &SessionTicket) -> String {
        format!("{}/sessions/{}", self.base_url, ticket.as_str())
    }
}

#[async_trait]
impl RequestProcessor for HttpRequestProcessor {
    async fn open(&self, company_path: &str, multi_user: bool) -> Result<SessionTicket, GatewayError> {
        let response = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .json(&OpenSession {
                company_path,
                multi_user,
            })
            .send()
            .await
            .map_err(transport)?;
        let opened: OpenedSession = checked(response, "open session")
            .await?
            .json()
            .await
            .map_err(transport)?;
        debug!(company_path, "bridge session opened");
        Ok(SessionTicket::new(opened.ticket))
    }

    async fn exchange(&self, ticket: &SessionTicket, request: &str) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(format!("{}/requests", self.session_url(ticket)))
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(request.to_string())
            .send()
            .await
            .map_err(transport)?;
        checked(response, "exchange")
            .await?
            .text()
            .await
            .map_err(transport)
    }

    async fn close(&self, ticket: &SessionTicket) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.session_url(ticket))
            .send()
            .await
            .map_err(transport)?;
        checked(response, "close session").await?;
        Ok(())
    }
}

async fn checked(response: Response, action: &str) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Transport(format!(
        "bridge refused to {action}: {status} {}",
        body.trim()
    )))
}

#[allow(clippy::needless_pass_by_value)]
fn transport(err: reqwest::Error) -> GatewayError {
    if err.is_connect() {
        GatewayError::Transport(format!("cannot reach request-processor bridge: {err}"))
    } else {
        GatewayError::Transport(err.to_string())
    }
}
