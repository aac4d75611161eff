//! Diagnostic webhook probes behind `/connection`, `/testpost`,
//! `/testsimple` and `/testecho`.
//!
//! Probes report through system messages only. They never touch the
//! connection indicator and never fall back to mock replies.

use tracing::{error, info};

use crate::core::render::RenderSink;
use crate::core::session::FeatureFlags;
use crate::webhook::{ReplySource, WebhookClient, WebhookError, WebhookRequest};

pub const PROBE_MESSAGE: &str = "hello";
pub const ECHO_MESSAGE: &str = "Echo test - please respond with this exact message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// Regular chat request with the configured method.
    Connection,
    TestPost,
    /// GET without the `chatInput` parameter.
    TestSimple,
    TestEcho,
}

impl ProbeKind {
    pub fn command(self) -> &'static str {
        match self {
            ProbeKind::Connection => "/connection",
            ProbeKind::TestPost => "/testpost",
            ProbeKind::TestSimple => "/testsimple",
            ProbeKind::TestEcho => "/testecho",
        }
    }

    fn announcement(self) -> &'static str {
        match self {
            ProbeKind::Connection => "Testing webhook connection...",
            ProbeKind::TestPost => "Testing POST webhook...",
            ProbeKind::TestSimple => "Testing simple webhook (no parameters)...",
            ProbeKind::TestEcho => "Testing webhook with echo message...",
        }
    }

    fn failure_label(self) -> &'static str {
        match self {
            ProbeKind::Connection => "Webhook connection failed",
            ProbeKind::TestPost => "POST webhook failed",
            ProbeKind::TestSimple => "Simple webhook failed",
            ProbeKind::TestEcho => "Echo test failed",
        }
    }

    /// Characters of the reply shown on success; `None` shows it whole.
    fn preview_chars(self) -> Option<usize> {
        match self {
            ProbeKind::Connection | ProbeKind::TestPost => Some(100),
            ProbeKind::TestSimple => Some(150),
            ProbeKind::TestEcho => None,
        }
    }
}

fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Run one probe to completion, emitting its report into `sink`.
/// Returns whether the webhook answered successfully.
pub async fn run_probe(
    client: &WebhookClient,
    kind: ProbeKind,
    flags: FeatureFlags,
    sink: &RenderSink,
) -> bool {
    sink.system(kind.announcement());

    let result = match kind {
        ProbeKind::Connection => client.send(PROBE_MESSAGE, flags.debug).await,
        ProbeKind::TestPost => {
            client
                .execute(&WebhookRequest::post(PROBE_MESSAGE), flags.debug)
                .await
        }
        ProbeKind::TestSimple => client.execute(&WebhookRequest::bare(), flags.debug).await,
        ProbeKind::TestEcho => client.send(ECHO_MESSAGE, flags.debug).await,
    };

    match result {
        Ok(reply) => {
            info!(probe = kind.command(), reply = %reply, "probe succeeded");
            report_success(kind, &reply, sink);
            true
        }
        Err(err) => {
            error!(probe = kind.command(), error = %err, "probe failed");
            report_failure(client, kind, &err, flags, sink);
            false
        }
    }
}

fn report_success(kind: ProbeKind, reply: &str, sink: &RenderSink) {
    match kind {
        ProbeKind::Connection => sink.system("✅ Webhook connection successful"),
        ProbeKind::TestPost => sink.system("✅ POST webhook successful"),
        ProbeKind::TestSimple => sink.system("✅ Simple webhook successful"),
        ProbeKind::TestEcho => {
            sink.system("✅ Echo test response received");
            if reply.trim().is_empty() {
                sink.system("❌ Response was empty or null");
                sink.system("Check n8n workflow - missing Respond to Webhook node?");
            } else {
                sink.system(format!("Response: \"{reply}\""));
            }
            return;
        }
    }
    if let Some(limit) = kind.preview_chars() {
        sink.system(format!("Response: {}...", preview(reply, limit)));
    }
}

fn report_failure(
    client: &WebhookClient,
    kind: ProbeKind,
    err: &WebhookError,
    flags: FeatureFlags,
    sink: &RenderSink,
) {
    sink.system(format!("❌ {}: {}", kind.failure_label(), err.message));
    if kind == ProbeKind::Connection && flags.debug {
        sink.system("Debug: Check n8n workflow configuration");
        sink.system(format!(
            "URL: {}",
            client.endpoint().unwrap_or_else(|| "<unset>".to_string())
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WebhookSettings;
    use crate::core::render::{drain, RenderEvent};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer one request with `body`, whatever it asked for.
    async fn one_shot_server(body: impl Into<String>) -> String {
        let body = body.into();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("local addr should resolve");
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
            let mut seen = Vec::new();
            while !seen.windows(4).any(|window| window == b"\r\n\r\n") {
                let mut chunk = [0_u8; 1024];
                let read = stream
                    .read(&mut chunk)
                    .await
                    .map_err(|err| err.to_string())?;
                if read == 0 {
                    break;
                }
                seen.extend_from_slice(&chunk[..read]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nconnection: close\r\ncontent-length: {}\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .await
                .map_err(|err| err.to_string())?;
            Ok::<(), String>(())
        });
        format!("http://{addr}/webhook/chat")
    }

    fn client(url: Option<String>) -> WebhookClient {
        let settings = WebhookSettings {
            url,
            ..WebhookSettings::default()
        };
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("client should build");
        WebhookClient::with_http_client(http, &settings)
    }

    fn system_texts(events: Vec<RenderEvent>) -> Vec<String> {
        events
            .into_iter()
            .map(|event| match event {
                RenderEvent::SystemMessage(text) => text,
                other => panic!("probes emit system messages only, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn preview_counts_characters() {
        assert_eq!(preview("ünïcødé", 3), "ünï");
        assert_eq!(preview("short", 100), "short");
    }

    #[tokio::test]
    async fn connection_probe_reports_truncated_reply() {
        let url = one_shot_server(format!("{{\"message\":\"{}\"}}", "x".repeat(120))).await;
        let (sink, mut rx) = RenderSink::new();

        let ok = run_probe(
            &client(Some(url)),
            ProbeKind::Connection,
            FeatureFlags::default(),
            &sink,
        )
        .await;

        assert!(ok);
        assert_eq!(
            system_texts(drain(&mut rx)),
            vec![
                "Testing webhook connection...".to_string(),
                "✅ Webhook connection successful".to_string(),
                format!("Response: {}...", "x".repeat(100)),
            ]
        );
    }

    #[tokio::test]
    async fn echo_probe_shows_whole_reply() {
        let url = one_shot_server(r#"[{"text":"Echo test - please respond with this exact message"}]"#).await;
        let (sink, mut rx) = RenderSink::new();

        run_probe(
            &client(Some(url)),
            ProbeKind::TestEcho,
            FeatureFlags::default(),
            &sink,
        )
        .await;

        let texts = system_texts(drain(&mut rx));
        assert_eq!(texts[1], "✅ Echo test response received");
        assert_eq!(texts[2], format!("Response: \"{ECHO_MESSAGE}\""));
    }

    #[tokio::test]
    async fn simple_probe_returns_raw_body() {
        let url = one_shot_server(r#"{"message":"raw"}"#).await;
        let (sink, mut rx) = RenderSink::new();

        run_probe(
            &client(Some(url)),
            ProbeKind::TestSimple,
            FeatureFlags::default(),
            &sink,
        )
        .await;

        let texts = system_texts(drain(&mut rx));
        assert_eq!(texts[2], r#"Response: {"message":"raw"}..."#);
    }

    #[tokio::test]
    async fn failed_connection_probe_adds_debug_hints() {
        let (sink, mut rx) = RenderSink::new();
        let flags = FeatureFlags {
            debug: true,
            ..FeatureFlags::default()
        };

        let ok = run_probe(&client(None), ProbeKind::Connection, flags, &sink).await;

        assert!(!ok);
        assert_eq!(
            system_texts(drain(&mut rx)),
            vec![
                "Testing webhook connection...".to_string(),
                "❌ Webhook connection failed: webhook URL is not configured".to_string(),
                "Debug: Check n8n workflow configuration".to_string(),
                "URL: <unset>".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn failed_post_probe_has_no_debug_hints() {
        let (sink, mut rx) = RenderSink::new();
        let flags = FeatureFlags {
            debug: true,
            ..FeatureFlags::default()
        };

        run_probe(&client(None), ProbeKind::TestPost, flags, &sink).await;

        assert_eq!(
            system_texts(drain(&mut rx)),
            vec![
                "Testing POST webhook...".to_string(),
                "❌ POST webhook failed: webhook URL is not configured".to_string(),
            ]
        );
    }
}
