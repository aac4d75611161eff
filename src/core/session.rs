//! Session-scoped state: feature flags, transcript, input history and the
//! connection indicator.
//!
//! A [`Session`] is owned by exactly one front end (the TUI loop or the
//! one-shot `say` runner). Dispatch tasks never borrow it; they report back
//! through [`RenderEvent`]s that the owner feeds to [`Session::apply`].

use std::io;

use tracing::warn;

use crate::commands::{self, CommandContext, CommandResult, ProbeKind};
use crate::core::config::{Config, Environment, FeatureSettings};
use crate::core::connection::{ConnectionState, ConnectionTracker};
use crate::core::history::{HistoryView, InputHistory};
use crate::core::message::{Message, Transcript};
use crate::core::render::RenderEvent;
use crate::utils::logging::LoggingState;

pub const LOG_PAUSED_NOTICE: &str = "Transcript logging paused";

/// Runtime toggles. Copied into each dispatch when it starts, so a toggle
/// only affects dispatches issued after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub webhook_enabled: bool,
    pub fallback_to_mock: bool,
    pub sound_enabled: bool,
    pub debug: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        FeatureFlags::from(&FeatureSettings::default())
    }
}

impl From<&FeatureSettings> for FeatureFlags {
    fn from(settings: &FeatureSettings) -> Self {
        Self {
            webhook_enabled: settings.webhook_enabled,
            fallback_to_mock: settings.fallback_to_mock,
            sound_enabled: settings.sound_effects,
            debug: settings.debugging,
        }
    }
}

/// What a submitted line turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Blank input; nothing happened.
    Ignored,
    /// A command ran synchronously and its output is already applied.
    Handled { error_cue: bool },
    /// Unknown or malformed command; the notice is already applied.
    Rejected { error_cue: bool },
    /// A diagnostic probe must be run against the webhook.
    Probe { kind: ProbeKind, flags: FeatureFlags },
    /// A chat message for the response engine.
    Dispatch { message: String, flags: FeatureFlags },
}

pub struct Session {
    pub flags: FeatureFlags,
    environment: Environment,
    user_name: String,
    connection: ConnectionTracker,
    transcript: Transcript,
    history: InputHistory,
    log: LoggingState,
    pending: usize,
    appended: u64,
}

impl Session {
    pub fn new(config: &Config, log: LoggingState) -> Self {
        Self {
            flags: FeatureFlags::from(&config.features),
            environment: config.environment(),
            user_name: config.ui.user_name.clone(),
            connection: ConnectionTracker::new(),
            transcript: Transcript::new(config.ui.max_messages),
            history: InputHistory::new(),
            log,
            pending: 0,
            appended: 0,
        }
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn history(&self) -> &InputHistory {
        &self.history
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// True while at least one response dispatch is outstanding.
    pub fn is_thinking(&self) -> bool {
        self.pending > 0
    }

    /// Number of messages ever appended; changes whenever a message lands.
    pub fn appended(&self) -> u64 {
        self.appended
    }

    pub fn history_older(&mut self) -> HistoryView<'_> {
        self.history.older()
    }

    pub fn history_newer(&mut self) -> HistoryView<'_> {
        self.history.newer()
    }

    /// Record and route one submitted line.
    ///
    /// Non-blank input is stored in history and echoed as a user message
    /// before anything else happens.
    pub fn submit(&mut self, raw: &str) -> Submission {
        let input = raw.trim();
        if input.is_empty() {
            return Submission::Ignored;
        }

        self.history.push(input);
        self.apply(RenderEvent::UserMessageEcho(input.to_string()));

        let mut ctx = CommandContext {
            flags: &mut self.flags,
            environment: self.environment,
            user_name: &self.user_name,
        };
        match commands::process_input(&mut ctx, input) {
            CommandResult::ProcessAsMessage(message) => Submission::Dispatch {
                message,
                flags: self.flags,
            },
            CommandResult::Handled(events) => {
                let error_cue = self.apply_all(events);
                Submission::Handled { error_cue }
            }
            CommandResult::Rejected(events) => {
                let error_cue = self.apply_all(events);
                Submission::Rejected { error_cue }
            }
            CommandResult::Probe(kind) => Submission::Probe {
                kind,
                flags: self.flags,
            },
        }
    }

    /// Apply a batch; returns whether any of them asked for an audible cue.
    pub fn apply_all(&mut self, events: impl IntoIterator<Item = RenderEvent>) -> bool {
        events
            .into_iter()
            .fold(false, |cue, event| self.apply(event) || cue)
    }

    /// Apply one event. Returns `true` when the front end should sound the
    /// error cue (an [`RenderEvent::ErrorCue`] while sound is enabled).
    pub fn apply(&mut self, event: RenderEvent) -> bool {
        match event {
            RenderEvent::SystemMessage(text) => self.append(Message::system(text)),
            RenderEvent::BotMessage(text) => self.append(Message::bot(text)),
            RenderEvent::UserMessageEcho(text) => self.append(Message::user(text)),
            RenderEvent::ConnectionStateChanged(state) => {
                self.connection.set(state);
            }
            RenderEvent::ErrorCue => return self.flags.sound_enabled,
            RenderEvent::TranscriptCleared => {
                self.transcript.clear();
                if let Err(err) = self.log.log_marker("transcript cleared") {
                    self.pause_log(err);
                }
            }
            RenderEvent::Thinking(true) => self.pending += 1,
            RenderEvent::Thinking(false) => self.pending = self.pending.saturating_sub(1),
        }
        false
    }

    fn append(&mut self, message: Message) {
        let logged = self.log.log_message(&message);
        self.push(message);
        if let Err(err) = logged {
            self.pause_log(err);
        }
    }

    fn push(&mut self, message: Message) {
        self.transcript.push(message);
        self.appended += 1;
    }

    /// The first write failure is reported in the transcript; later
    /// messages are not logged at all.
    fn pause_log(&mut self, err: io::Error) {
        warn!(error = %err, "transcript log write failed, pausing log");
        self.log.pause();
        self.push(Message::system(format!("{LOG_PAUSED_NOTICE}: {err}")));
    }
}
