//! Character-by-character reveal of the newest bot message.
//!
//! Purely presentational: the transcript always holds the full text, and the
//! renderer asks how many characters of the last message to show.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Typewriter {
    speed: Duration,
    active: Option<Reveal>,
}

#[derive(Debug, Clone, Copy)]
struct Reveal {
    total: usize,
    started: Instant,
}

impl Typewriter {
    pub fn new(speed: Duration) -> Self {
        Self {
            speed,
            active: None,
        }
    }

    /// Begin revealing `text`, replacing any reveal still in progress.
    pub fn start(&mut self, text: &str, now: Instant) {
        if self.speed.is_zero() {
            self.active = None;
            return;
        }
        self.active = Some(Reveal {
            total: text.chars().count(),
            started: now,
        });
    }

    pub fn finish(&mut self) {
        self.active = None;
    }

    /// Characters to show at `now`, or `None` once the reveal is complete.
    pub fn visible(&self, now: Instant) -> Option<usize> {
        let reveal = self.active?;
        let elapsed = now.saturating_duration_since(reveal.started);
        let shown = (elapsed.as_millis() / self.speed.as_millis().max(1)) as usize;
        (shown < reveal.total).then_some(shown)
    }

    /// Drop a finished reveal; returns whether one is still running.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.visible(now).is_none() {
            self.active = None;
        }
        self.active.is_some()
    }
}
