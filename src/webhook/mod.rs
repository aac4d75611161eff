//! Outbound webhook client.
//!
//! One request per user message, bounded by the configured timeout. Every
//! outcome collapses into a [`WebhookResult`]: `Ok(reply text)` or a
//! [`WebhookError`] tagged with an [`ErrorKind`]. Nothing here panics or
//! propagates transport errors any further.

pub mod reply;


use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::WebhookSettings;
use crate::core::schedule::{self, Completion};
use crate::utils::url::{parse_endpoint, with_chat_input};

pub const ACCEPT_ANY: &str = "application/json, text/plain, */*";
pub const ACCEPT_TEXT: &str = "text/plain, */*";

pub const TIMEOUT_MESSAGE: &str = "Request timeout - AI systems not responding";
pub const NETWORK_MESSAGE: &str = "Network connection failed - check your internet";
pub const NOT_CONFIGURED_MESSAGE: &str = "webhook URL is not configured";

/// Characters of an error response body kept for debug output.
pub const ERROR_BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    HttpError,
    NetworkError,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::HttpError => "http error",
            ErrorKind::NetworkError => "network error",
            ErrorKind::Unknown => "unknown error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    /// Underlying transport error text, shown only in debug mode.
    pub detail: Option<String>,
}

impl WebhookError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            detail: None,
        }
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, TIMEOUT_MESSAGE)
    }

    pub fn http(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        Self {
            status: Some(status.as_u16()),
            ..Self::new(
                ErrorKind::HttpError,
                format!("HTTP {}: {}", status.as_u16(), reason),
            )
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Worth another attempt: the server was unreachable or failed on its side.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ErrorKind::NetworkError => true,
            ErrorKind::HttpError => self.status.is_some_and(|status| status >= 500),
            ErrorKind::Timeout | ErrorKind::Unknown => false,
        }
    }
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WebhookError {}

pub type WebhookResult = Result<String, WebhookError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
        }
    }
}

/// One outbound request. `message: None` is the bare GET used by the
/// parameterless diagnostic probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookRequest {
    pub message: Option<String>,
    pub method: RequestMethod,
}

impl WebhookRequest {
    pub fn post(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            method: RequestMethod::Post,
        }
    }

    pub fn bare() -> Self {
        Self {
            message: None,
            method: RequestMethod::Get,
        }
    }
}

#[derive(Serialize)]
struct ChatInputBody<'a> {
    #[serde(rename = "chatInput")]
    chat_input: &'a str,
}

/// Anything that can turn a user message into reply text.
#[async_trait]
pub trait ReplySource: Send + Sync {
    async fn send(&self, message: &str, debug: bool) -> WebhookResult;

    /// Endpoint shown in debug diagnostics.
    fn endpoint(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    endpoint: Result<Url, String>,
    method: RequestMethod,
    timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
    shutdown: CancellationToken,
}

pub fn user_agent() -> String {
    format!("matrix-terminal/{}", env!("CARGO_PKG_VERSION"))
}

impl WebhookClient {
    pub fn new(settings: &WebhookSettings) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| WebhookError::new(ErrorKind::Unknown, err.to_string()))?;
        Ok(Self::with_http_client(http, settings))
    }

    pub fn with_http_client(http: reqwest::Client, settings: &WebhookSettings) -> Self {
        let endpoint = match settings.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => parse_endpoint(url),
            _ => Err(NOT_CONFIGURED_MESSAGE.to_string()),
        };
        Self {
            http,
            endpoint,
            method: if settings.use_post {
                RequestMethod::Post
            } else {
                RequestMethod::Get
            },
            timeout: settings.timeout(),
            retry_attempts: settings.retry_attempts,
            retry_delay: settings.retry_delay(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn endpoint_url(&self) -> Option<&Url> {
        self.endpoint.as_ref().ok()
    }

    /// Abort every in-flight request; used when the session ends.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// The request a chat message turns into under the configured method.
    pub fn request_for(&self, message: &str) -> WebhookRequest {
        WebhookRequest {
            message: Some(message.to_string()),
            method: self.method,
        }
    }

    fn build(
        &self,
        request: &WebhookRequest,
        debug: bool,
    ) -> Result<reqwest::RequestBuilder, WebhookError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .map_err(|reason| WebhookError::new(ErrorKind::Unknown, reason.clone()))?;

        let builder = match (request.method, request.message.as_deref()) {
            (RequestMethod::Get, Some(message)) => {
                let url = with_chat_input(endpoint, message);
                if debug {
                    info!(url = %url, "webhook GET");
                }
                self.http.get(url).header(ACCEPT, ACCEPT_ANY)
            }
            (RequestMethod::Get, None) => {
                if debug {
                    info!(url = %endpoint, "webhook GET without parameters");
                }
                self.http.get(endpoint.clone()).header(ACCEPT, ACCEPT_TEXT)
            }
            (RequestMethod::Post, message) => {
                if debug {
                    info!(url = %endpoint, "webhook POST");
                }
                let body = ChatInputBody {
                    chat_input: message.unwrap_or_default(),
                };
                self.http
                    .post(endpoint.clone())
                    .header(ACCEPT, ACCEPT_ANY)
                    .header(CONTENT_TYPE, "application/json")
                    .json(&body)
            }
        };
        Ok(builder.header(USER_AGENT, user_agent()))
    }

    /// Send `request` once and return the raw body of a 2xx response.
    pub async fn execute(&self, request: &WebhookRequest, debug: bool) -> WebhookResult {
        let builder = self.build(request, debug)?;
        let cancel = self.shutdown.child_token();

        let exchange = async {
            let response = builder.send().await.map_err(transport_error)?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(http_failure(status, &body));
            }
            response.text().await.map_err(transport_error)
        };

        match schedule::with_deadline(exchange, self.timeout, &cancel).await {
            Completion::Finished(Ok(body)) => {
                if debug {
                    info!(length = body.len(), body = %body, "webhook response");
                }
                Ok(body)
            }
            Completion::Finished(Err(err)) => Err(err),
            Completion::TimedOut => Err(WebhookError::timeout()),
            Completion::Cancelled => {
                Err(WebhookError::new(ErrorKind::Unknown, "request cancelled"))
            }
        }
    }

    /// Like [`execute`](Self::execute), with the configured retry policy.
    ///
    /// Only [retryable](WebhookError::is_retryable) failures are retried.
    /// Shutdown interrupts the wait between attempts; the next attempt then
    /// fails as cancelled.
    pub async fn execute_with_retry(&self, request: &WebhookRequest, debug: bool) -> WebhookResult {
        let backoff = ConstantBuilder::default()
            .with_delay(self.retry_delay)
            .with_max_times(self.retry_attempts as usize);
        let shutdown = self.shutdown.clone();

        (|| self.execute(request, debug))
            .retry(backoff)
            .sleep(move |delay| {
                let shutdown = shutdown.clone();
                async move {
                    schedule::delay(delay, &shutdown).await;
                }
            })
            .when(WebhookError::is_retryable)
            .notify(|err, delay| {
                warn!(
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    max = self.retry_attempts,
                    "webhook attempt failed, retrying"
                );
            })
            .await
    }
}

#[async_trait]
impl ReplySource for WebhookClient {
    async fn send(&self, message: &str, debug: bool) -> WebhookResult {
        let request = self.request_for(message);
        let body = self.execute_with_retry(&request, debug).await?;
        let reply = reply::extract_reply(&body);
        if debug {
            info!(shape = ?reply.shape, reply = %reply.text, "webhook reply parsed");
        } else {
            debug!(shape = ?reply.shape, "webhook reply parsed");
        }
        Ok(reply.text)
    }

    fn endpoint(&self) -> Option<String> {
        self.endpoint_url().map(Url::to_string)
    }
}

fn http_failure(status: StatusCode, body: &str) -> WebhookError {
    let err = WebhookError::http(status);
    let body = body.trim();
    if body.is_empty() {
        return err;
    }
    let preview: String = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
    let ellipsis = if preview.len() < body.len() { "..." } else { "" };
    err.with_detail(format!("Response body: {preview}{ellipsis}"))
}

fn transport_error(err: reqwest::Error) -> WebhookError {
    let detail = err.to_string();
    if err.is_timeout() {
        WebhookError::timeout().with_detail(detail)
    } else if err.is_connect() || err.is_request() {
        WebhookError::new(ErrorKind::NetworkError, NETWORK_MESSAGE).with_detail(detail)
    } else {
        WebhookError::new(ErrorKind::Unknown, detail)
    }
}
