//! Interactive session: terminal setup, key handling and the render loop.
//!
//! The loop owns the [`Session`]. Responses and probes run as spawned tasks
//! that report through a [`RenderSink`]; each pass of the loop drains the
//! queued events, applies them in arrival order, then redraws.

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::commands::probes::run_probe;
use crate::core::config::Config;
use crate::core::engine::ResponseEngine;
use crate::core::history::HistoryView;
use crate::core::message::Role;
use crate::core::render::{drain, RenderEvent, RenderSink};
use crate::core::schedule::{self, Completion};
use crate::core::session::{Session, Submission};
use crate::ui::input_line::{map_key_event_to_action, InputAction, InputLine, InputOutcome};
use crate::ui::lifecycle::{restore_terminal, ring_bell, setup_terminal, ChatTerminal};
use crate::ui::renderer::{ui, FrameState};
use crate::ui::typewriter::Typewriter;
use crate::utils::logging::LoggingState;
use crate::webhook::WebhookClient;

pub const WELCOME_MESSAGE: &str = "Matrix Terminal initialized. Connection established.";
const GREETING_DELAY: Duration = Duration::from_secs(1);
const POLL_INTERVAL: Duration = Duration::from_millis(33);
const THINKING_FRAME: Duration = Duration::from_millis(400);

pub fn greeting(user_name: &str) -> String {
    format!("Hello, {user_name}. I am your AI assistant. How may I help you today?")
}

struct ChatLoop {
    session: Session,
    engine: ResponseEngine,
    client: Arc<WebhookClient>,
    sink: RenderSink,
    events: UnboundedReceiver<RenderEvent>,
    input: InputLine,
    typewriter: Typewriter,
    seen_appended: u64,
    cancel: CancellationToken,
    started: Instant,
}

pub async fn run_chat(
    config: Config,
    log: LoggingState,
    client: Arc<WebhookClient>,
) -> Result<(), Box<dyn Error>> {
    let (sink, events) = RenderSink::new();
    let mut chat = ChatLoop {
        session: Session::new(&config, log),
        engine: ResponseEngine::new(client.clone()),
        client,
        sink,
        events,
        input: InputLine::default(),
        typewriter: Typewriter::new(config.ui.typing_speed()),
        seen_appended: 0,
        cancel: CancellationToken::new(),
        started: Instant::now(),
    };

    chat.start_background(&config);

    let mut terminal = setup_terminal()?;
    let result = chat.run(&mut terminal).await;
    chat.shutdown();
    let restored = restore_terminal(&mut terminal);
    result.and(restored)
}

impl ChatLoop {
    /// Welcome sequence and the one-shot connectivity probe.
    fn start_background(&mut self, config: &Config) {
        self.sink.system(WELCOME_MESSAGE);

        let sink = self.sink.clone();
        let cancel = self.cancel.clone();
        let greeting = greeting(self.session.user_name());
        tokio::spawn(async move {
            if schedule::delay(GREETING_DELAY, &cancel).await == Completion::Finished(()) {
                sink.bot(greeting);
            }
        });

        let engine = self.engine.clone();
        let sink = self.sink.clone();
        let flags = self.session.flags;
        let delay = config.ui.initial_probe_delay();
        tokio::spawn(async move {
            engine.initial_probe(delay, flags, &sink).await;
        });
    }

    async fn run(&mut self, terminal: &mut ChatTerminal) -> Result<(), Box<dyn Error>> {
        loop {
            self.apply_pending(terminal)?;

            let now = Instant::now();
            self.typewriter.tick(now);
            let frame_state = FrameState {
                input: &self.input,
                reveal: self.typewriter.visible(now),
                tick: (now.duration_since(self.started).as_millis() / THINKING_FRAME.as_millis())
                    as u64,
            };
            let session = &self.session;
            terminal.draw(|f| ui(f, session, &frame_state))?;

            if !event::poll(POLL_INTERVAL)? {
                // Let spawned dispatches make progress on this worker too.
                tokio::task::yield_now().await;
                continue;
            }

            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match map_key_event_to_action(&key) {
                        Some(action) => action,
                        None => continue,
                    }
                }
                Event::Paste(text) => InputAction::Paste(text),
                _ => continue,
            };

            match self.input.apply(action) {
                InputOutcome::Continue { .. } => {}
                InputOutcome::Submit(text) => self.submit(&text, terminal)?,
                InputOutcome::HistoryOlder => {
                    let view = self.session.history_older();
                    apply_history_view(&mut self.input, view);
                }
                InputOutcome::HistoryNewer => {
                    let view = self.session.history_newer();
                    apply_history_view(&mut self.input, view);
                }
                InputOutcome::Quit => {
                    info!("session ended by user");
                    return Ok(());
                }
            }
        }
    }

    fn submit(&mut self, text: &str, terminal: &mut ChatTerminal) -> Result<(), Box<dyn Error>> {
        match self.session.submit(text) {
            Submission::Ignored => {}
            Submission::Handled { error_cue } | Submission::Rejected { error_cue } => {
                if error_cue {
                    ring_bell(terminal.backend_mut())?;
                }
            }
            Submission::Probe { kind, flags } => {
                debug!(probe = kind.command(), "running probe");
                let client = self.client.clone();
                let sink = self.sink.clone();
                tokio::spawn(async move {
                    run_probe(&client, kind, flags, &sink).await;
                });
            }
            Submission::Dispatch { message, flags } => {
                let engine = self.engine.clone();
                let sink = self.sink.clone();
                tokio::spawn(async move {
                    let outcome = engine.respond(&message, flags, &sink).await;
                    debug!(?outcome, "dispatch finished");
                });
            }
        }
        self.sync_typewriter();
        Ok(())
    }

    fn apply_pending(&mut self, terminal: &mut ChatTerminal) -> Result<(), Box<dyn Error>> {
        let events = drain(&mut self.events);
        if events.is_empty() {
            return Ok(());
        }
        if self.session.apply_all(events) {
            ring_bell(terminal.backend_mut())?;
        }
        self.sync_typewriter();
        Ok(())
    }

    /// Start typing out a newly arrived bot message; anything else arriving
    /// after it ends the reveal.
    fn sync_typewriter(&mut self) {
        if self.session.appended() == self.seen_appended {
            return;
        }
        self.seen_appended = self.session.appended();
        match self.session.transcript().last() {
            Some(message) if message.role() == Role::Bot => {
                self.typewriter.start(message.text(), Instant::now())
            }
            _ => self.typewriter.finish(),
        }
    }

    fn shutdown(&self) {
        self.cancel.cancel();
        self.engine.shutdown();
        self.client.shutdown();
    }
}

fn apply_history_view(input: &mut InputLine, view: HistoryView<'_>) {
    match view {
        HistoryView::Unchanged => {}
        HistoryView::Entry(entry) => input.set_text(entry),
        HistoryView::Blank => input.clear(),
    }
}
