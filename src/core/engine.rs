//! Webhook-versus-mock selection for a single chat message.
//!
//! Each call to [`ResponseEngine::respond`] is one dispatch. For its own
//! events the ordering is always `Connecting`, then `Online` or `Offline`,
//! then exactly one reply path: the webhook text, a fallback notice followed
//! by a mock reply, or a terminal failure notice.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::connection::ConnectionState;
use crate::core::mock::MockResponder;
use crate::core::render::{RenderEvent, RenderSink};
use crate::core::schedule::{self, Completion};
use crate::core::session::FeatureFlags;
use crate::webhook::{ReplySource, WebhookError};

pub const FALLBACK_NOTICE: &str = "Connection unstable. Switching to local mode...";
pub const FAILURE_NOTICE: &str = "Connection to AI systems failed. Please try again.";
pub const SYSTEM_CHECK_MESSAGE: &str = "system_check";

/// Which reply path a dispatch took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Webhook,
    /// Webhook disabled; mock reply only.
    MockOnly,
    MockFallback,
    TerminalFailure,
    /// Session ended while the mock delay was pending.
    Abandoned,
}

#[derive(Clone)]
pub struct ResponseEngine {
    source: Arc<dyn ReplySource>,
    mock: MockResponder,
    cancel: CancellationToken,
}

impl ResponseEngine {
    pub fn new(source: Arc<dyn ReplySource>) -> Self {
        Self {
            source,
            mock: MockResponder::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_mock(mut self, mock: MockResponder) -> Self {
        self.mock = mock;
        self
    }

    /// Stops pending mock delays and the initial probe.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub async fn respond(
        &self,
        message: &str,
        flags: FeatureFlags,
        sink: &RenderSink,
    ) -> DispatchOutcome {
        sink.emit(RenderEvent::Thinking(true));
        sink.connection(ConnectionState::Connecting);

        if !flags.webhook_enabled {
            sink.connection(ConnectionState::Offline);
            return match self.mock_reply(message, sink).await {
                Completion::Finished(()) => DispatchOutcome::MockOnly,
                _ => DispatchOutcome::Abandoned,
            };
        }

        match self.source.send(message, flags.debug).await {
            Ok(text) => {
                sink.connection(ConnectionState::Online);
                sink.emit(RenderEvent::Thinking(false));
                sink.bot(text);
                DispatchOutcome::Webhook
            }
            Err(err) => {
                warn!(kind = err.kind.as_str(), error = %err, "webhook dispatch failed");
                sink.connection(ConnectionState::Offline);
                if flags.fallback_to_mock {
                    sink.system(self.failure_text(FALLBACK_NOTICE, &err, flags.debug));
                    match self.mock_reply(message, sink).await {
                        Completion::Finished(()) => DispatchOutcome::MockFallback,
                        _ => DispatchOutcome::Abandoned,
                    }
                } else {
                    sink.emit(RenderEvent::Thinking(false));
                    sink.system(self.failure_text(FAILURE_NOTICE, &err, flags.debug));
                    sink.error_cue();
                    DispatchOutcome::TerminalFailure
                }
            }
        }
    }

    /// Sleep out the simulated latency, then emit a canned reply.
    async fn mock_reply(&self, message: &str, sink: &RenderSink) -> Completion<()> {
        let latency = self.mock.latency();
        debug!(latency_ms = latency.as_millis() as u64, "mock reply scheduled");
        let completion = schedule::delay(latency, &self.cancel).await;
        sink.emit(RenderEvent::Thinking(false));
        if completion == Completion::Finished(()) {
            sink.bot(self.mock.reply_for(message));
        }
        completion
    }

    fn failure_text(&self, notice: &str, err: &WebhookError, debug: bool) -> String {
        if !debug {
            return notice.to_string();
        }
        let endpoint = self
            .source
            .endpoint()
            .unwrap_or_else(|| "<unset>".to_string());
        let mut text = format!(
            "{notice}\nDebug: {} from {endpoint}: {}",
            err.kind.as_str(),
            err.message
        );
        if let Some(detail) = &err.detail {
            text.push_str(&format!("\n{detail}"));
        }
        text
    }

    /// One-shot connectivity check, run once `delay` after session start.
    pub async fn initial_probe(&self, delay: Duration, flags: FeatureFlags, sink: &RenderSink) {
        if schedule::delay(delay, &self.cancel).await == Completion::Cancelled {
            return;
        }
        if !flags.webhook_enabled {
            sink.connection(ConnectionState::Offline);
            return;
        }
        match self.source.send(SYSTEM_CHECK_MESSAGE, flags.debug).await {
            Ok(_) => {
                info!("initial connection test successful");
                sink.connection(ConnectionState::Online);
            }
            Err(err) => {
                warn!(error = %err, "initial connection test failed");
                sink.connection(ConnectionState::Offline);
            }
        }
    }
}
