use std::fmt;

/// Status-bar indicator for the webhook link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Online,
    Offline,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Online => "ONLINE",
            ConnectionState::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Holds the session's single connection state.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    state: ConnectionState,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns `true` when the state actually changed.
    pub fn set(&mut self, next: ConnectionState) -> bool {
        if self.state == next {
            return false;
        }
        tracing::debug!(from = %self.state, to = %next, "connection state changed");
        self.state = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.state(), ConnectionState::Connecting);
    }

    #[test]
    fn repeated_state_is_not_a_transition() {
        let mut tracker = ConnectionTracker::new();
        assert!(tracker.set(ConnectionState::Online));
        assert!(!tracker.set(ConnectionState::Online));
        assert!(tracker.set(ConnectionState::Offline));
        assert_eq!(tracker.state(), ConnectionState::Offline);
    }

    #[test]
    fn labels_match_status_bar_text() {
        assert_eq!(ConnectionState::Online.to_string(), "ONLINE");
        assert_eq!(ConnectionState::Offline.label(), "OFFLINE");
    }
}
