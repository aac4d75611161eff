use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Bot,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
            Role::System => "system",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "bot" => Ok(Role::Bot),
            "system" => Ok(Role::System),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// A single transcript entry. Fields are private so a message cannot change
/// after it has been created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    text: String,
    timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self::at(role, text, Local::now())
    }

    pub fn at(role: Role, text: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// `[HH:MM:SS]` prefix shown in front of every transcript line.
    pub fn clock_label(&self) -> String {
        self.timestamp.format("[%H:%M:%S]").to_string()
    }
}

/// Ordered message log that evicts its oldest entries once `max_messages`
/// is exceeded.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: VecDeque<Message>,
    max_messages: usize,
}

impl Transcript {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_messages: max_messages.max(1),
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_evicts_oldest_past_capacity() {
        let mut transcript = Transcript::new(3);
        for i in 0..5 {
            transcript.push(Message::user(format!("msg {i}")));
        }
        let texts: Vec<&str> = transcript.iter().map(Message::text).collect();
        assert_eq!(texts, vec!["msg 2", "msg 3", "msg 4"]);
    }

    #[test]
    fn zero_capacity_keeps_latest_message() {
        let mut transcript = Transcript::new(0);
        transcript.push(Message::system("a"));
        transcript.push(Message::system("b"));
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.last().map(Message::text), Some("b"));
    }

    #[test]
    fn clock_label_uses_24_hour_clock() {
        let ts = Local::now()
            .date_naive()
            .and_hms_opt(21, 5, 9)
            .and_then(|naive| naive.and_local_timezone(Local).single());
        if let Some(ts) = ts {
            let message = Message::at(Role::Bot, "hi", ts);
            assert_eq!(message.clock_label(), "[21:05:09]");
        }
    }

    #[test]
    fn role_strings_round_trip() {
        for role in [Role::User, Role::Bot, Role::System] {
            assert_eq!(Role::try_from(role.as_str()), Ok(role));
        }
        assert!(Role::try_from("assistant").is_err());
    }
}
