//! Events the dispatch core produces for whatever is drawing the session.
//!
//! Dispatch tasks never touch session state directly. They push
//! [`RenderEvent`]s into a [`RenderSink`]; the owner of the receiving end
//! applies them in arrival order, which is the order dispatches complete.

use tokio::sync::mpsc;

use crate::core::connection::ConnectionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    SystemMessage(String),
    BotMessage(String),
    UserMessageEcho(String),
    ConnectionStateChanged(ConnectionState),
    ErrorCue,
    TranscriptCleared,
    /// A response dispatch started (`true`) or finished (`false`).
    Thinking(bool),
}

impl RenderEvent {
    pub fn system(text: impl Into<String>) -> Self {
        RenderEvent::SystemMessage(text.into())
    }

    pub fn bot(text: impl Into<String>) -> Self {
        RenderEvent::BotMessage(text.into())
    }

    pub fn is_error_cue(&self) -> bool {
        matches!(self, RenderEvent::ErrorCue)
    }
}

#[derive(Clone, Debug)]
pub struct RenderSink {
    tx: mpsc::UnboundedSender<RenderEvent>,
}

impl RenderSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RenderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// A closed receiver means the session is shutting down; the event is dropped.
    pub fn emit(&self, event: RenderEvent) {
        let _ = self.tx.send(event);
    }

    pub fn system(&self, text: impl Into<String>) {
        self.emit(RenderEvent::system(text));
    }

    pub fn bot(&self, text: impl Into<String>) {
        self.emit(RenderEvent::bot(text));
    }

    pub fn connection(&self, state: ConnectionState) {
        self.emit(RenderEvent::ConnectionStateChanged(state));
    }

    pub fn error_cue(&self) {
        self.emit(RenderEvent::ErrorCue);
    }
}

/// Drain everything currently queued without waiting.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<RenderEvent>) -> Vec<RenderEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_emission_order() {
        let (sink, mut rx) = RenderSink::new();
        sink.connection(ConnectionState::Connecting);
        sink.system("notice");
        sink.bot("reply");
        sink.error_cue();

        assert_eq!(
            drain(&mut rx),
            vec![
                RenderEvent::ConnectionStateChanged(ConnectionState::Connecting),
                RenderEvent::SystemMessage("notice".to_string()),
                RenderEvent::BotMessage("reply".to_string()),
                RenderEvent::ErrorCue,
            ]
        );
    }

    #[test]
    fn emitting_after_receiver_drop_is_silent() {
        let (sink, rx) = RenderSink::new();
        drop(rx);
        sink.system("nobody listening");
    }
}
