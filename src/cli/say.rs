//! TUI-less "say" command
//!
//! Runs one line through the same session and response engine the terminal
//! uses, then prints what the terminal would have shown. Bot replies go to
//! stdout; system notices go to stderr so the reply can be piped.

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use crate::commands::probes::run_probe;
use crate::core::config::Config;
use crate::core::engine::{DispatchOutcome, ResponseEngine};
use crate::core::message::Role;
use crate::core::render::{drain, RenderSink};
use crate::core::session::{Session, Submission};
use crate::utils::logging::LoggingState;
use crate::webhook::WebhookClient;

pub async fn run_say(
    text: String,
    config: &Config,
    log: LoggingState,
    client: Arc<WebhookClient>,
) -> Result<(), Box<dyn Error>> {
    if text.trim().is_empty() {
        return Err("Usage: matrix-terminal say <message>".into());
    }

    let engine = ResponseEngine::new(client.clone());
    let mut session = Session::new(config, log);
    let since = session.appended();
    let outcome = say_once(&mut session, &engine, &client, &text).await;

    let stdout = io::stdout();
    let stderr = io::stderr();
    print_replies(&session, since, &mut stdout.lock(), &mut stderr.lock())?;

    eprintln!("[connection] {}", session.connection().label());
    match outcome {
        SayOutcome::Failed => Err("no reply was received".into()),
        SayOutcome::Done => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SayOutcome {
    Done,
    Failed,
}

async fn say_once(
    session: &mut Session,
    engine: &ResponseEngine,
    client: &WebhookClient,
    text: &str,
) -> SayOutcome {
    let (sink, mut events) = RenderSink::new();
    let outcome = match session.submit(text) {
        Submission::Ignored | Submission::Handled { .. } => SayOutcome::Done,
        Submission::Rejected { .. } => SayOutcome::Failed,
        Submission::Probe { kind, flags } => {
            if run_probe(client, kind, flags, &sink).await {
                SayOutcome::Done
            } else {
                SayOutcome::Failed
            }
        }
        Submission::Dispatch { message, flags } => {
            match engine.respond(&message, flags, &sink).await {
                DispatchOutcome::TerminalFailure | DispatchOutcome::Abandoned => SayOutcome::Failed,
                _ => SayOutcome::Done,
            }
        }
    };
    session.apply_all(drain(&mut events));
    outcome
}

/// Messages appended after the echoed input line, counted from the `since`
/// watermark. Only the ones the bounded transcript still holds are printed.
fn print_replies<O: Write, E: Write>(
    session: &Session,
    since: u64,
    out: &mut O,
    err: &mut E,
) -> io::Result<()> {
    let fresh = session.appended().saturating_sub(since).saturating_sub(1);
    let fresh = usize::try_from(fresh).unwrap_or(usize::MAX);
    let transcript = session.transcript();
    let skip = transcript.len().saturating_sub(fresh);
    for message in transcript.iter().skip(skip) {
        match message.role() {
            Role::Bot => writeln!(out, "{}", message.text())?,
            Role::System | Role::User => writeln!(err, "{}", message.text())?,
        }
    }
    out.flush()
}
