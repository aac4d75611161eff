//! Local canned responder used when the webhook is disabled or unreachable.

use std::time::Duration;

use chrono::Local;

use crate::utils::random::{choose, duration_between};

/// Keyword categories, listed in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Greeting,
    MatrixLore,
    HelpRequest,
    TimeDate,
    Default,
}

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Greeting, &["hello", "hi"]),
    (Category::MatrixLore, &["matrix"]),
    (Category::HelpRequest, &["help", "?"]),
    (Category::TimeDate, &["time", "date"]),
];

const GREETING_REPLIES: &[&str] = &[
    "Greetings, Neo. Welcome to the Matrix.",
    "Hello there. The One has arrived.",
    "Salutations. You've taken the red pill, I see.",
];

const MATRIX_REPLIES: &[&str] = &[
    "The Matrix has you...",
    "There is no spoon.",
    "Welcome to the real world.",
    "Free your mind.",
];

const HELP_REPLIES: &[&str] = &[
    "I can assist you with various queries. Try typing /help for commands.",
    "How may I assist you in navigating the Matrix?",
    "I'm here to help guide you through the digital realm.",
];

const DEFAULT_REPLIES: &[&str] = &[
    "Interesting perspective. Tell me more.",
    "The code flows through everything.",
    "I see the patterns in your words.",
    "Processing your input through the Matrix...",
    "The Oracle would find this fascinating.",
    "Your query has been logged in the mainframe.",
    "Morpheus would be proud of your curiosity.",
    "The machines are listening...",
    "Reality is what you make of it in the Matrix.",
];

pub const MIN_LATENCY: Duration = Duration::from_millis(1000);
pub const MAX_LATENCY: Duration = Duration::from_millis(3000);

/// First category whose keywords appear (case-insensitively) in `message`.
pub fn classify(message: &str) -> Category {
    let lowered = message.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Default)
}

impl Category {
    /// Candidate replies; time/date answers are rendered at call time.
    pub fn replies(self) -> Vec<String> {
        match self {
            Category::Greeting => fixed(GREETING_REPLIES),
            Category::MatrixLore => fixed(MATRIX_REPLIES),
            Category::HelpRequest => fixed(HELP_REPLIES),
            Category::TimeDate => {
                let now = Local::now();
                vec![
                    format!(
                        "In the Matrix, time is an illusion. But it's {}",
                        now.format("%Y-%m-%d %H:%M:%S")
                    ),
                    "Time moves differently here in the code.".to_string(),
                    format!("Current timestamp: {}", now.timestamp_millis()),
                ]
            }
            Category::Default => fixed(DEFAULT_REPLIES),
        }
    }
}

fn fixed(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

/// Picks canned replies and the artificial latency to apply before showing them.
#[derive(Debug, Clone)]
pub struct MockResponder {
    min_latency: Duration,
    max_latency: Duration,
}

impl Default for MockResponder {
    fn default() -> Self {
        Self {
            min_latency: MIN_LATENCY,
            max_latency: MAX_LATENCY,
        }
    }
}

impl MockResponder {
    pub fn with_latency(min_latency: Duration, max_latency: Duration) -> Self {
        Self {
            min_latency,
            max_latency,
        }
    }

    pub fn reply_for(&self, message: &str) -> String {
        let replies = classify(message).replies();
        choose(&replies)
            .cloned()
            .unwrap_or_else(|| DEFAULT_REPLIES[0].to_string())
    }

    pub fn latency(&self) -> Duration {
        duration_between(self.min_latency, self.max_latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_priority_order() {
        assert_eq!(classify("Hello there"), Category::Greeting);
        assert_eq!(classify("hello, what is the matrix?"), Category::Greeting);
        assert_eq!(classify("Tell me about the MATRIX"), Category::MatrixLore);
        assert_eq!(classify("can you help me?"), Category::HelpRequest);
        assert_eq!(classify("what is the date today"), Category::TimeDate);
        assert_eq!(classify("red pill"), Category::Default);
    }

    #[test]
    fn substring_matching_is_not_word_based() {
        // "this" contains "hi"
        assert_eq!(classify("this one"), Category::Greeting);
        assert_eq!(classify("update"), Category::TimeDate);
    }

    #[test]
    fn reply_comes_from_matched_category() {
        let responder = MockResponder::default();
        for _ in 0..20 {
            let reply = responder.reply_for("hello");
            assert!(GREETING_REPLIES.contains(&reply.as_str()));
        }
    }

    #[test]
    fn time_replies_are_rendered_fresh() {
        let replies = Category::TimeDate.replies();
        assert_eq!(replies.len(), 3);
        assert!(replies[0].starts_with("In the Matrix, time is an illusion. But it's "));
        assert!(replies[2].starts_with("Current timestamp: "));
    }

    #[test]
    fn latency_defaults_to_one_to_three_seconds() {
        let responder = MockResponder::default();
        for _ in 0..50 {
            let latency = responder.latency();
            assert!(latency >= MIN_LATENCY && latency <= MAX_LATENCY);
        }
    }
}
