use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable message identifier. Seed history uses short numeric
/// strings, messages sent during a session get a v4 UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// A fresh identifier that cannot collide with any existing one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    System,
    User,
    AiAstrologer,
    HumanAstrologer,
}

/// Rendering category. Only `Ai` messages are eligible for feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Event,
    Text,
    Ai,
    Human,
}

/// Active judgment on an AI message. "No feedback" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Liked,
    Disliked,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feedback type '{0}' (expected 'liked' or 'disliked')")]
pub struct ParseFeedbackError(String);

impl FromStr for FeedbackType {
    type Err = ParseFeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "liked" | "like" => Ok(Self::Liked),
            "disliked" | "dislike" => Ok(Self::Disliked),
            _ => Err(ParseFeedbackError(s.to_string())),
        }
    }
}

/// Structured reason attached to a dislike. Serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DislikeReason {
    #[serde(rename = "Inaccurate")]
    Inaccurate,
    #[serde(rename = "Too Vague")]
    TooVague,
    #[serde(rename = "Too Long")]
    TooLong,
}

impl DislikeReason {
    /// Every reason, in chip display order.
    pub const ALL: [DislikeReason; 3] = [Self::Inaccurate, Self::TooVague, Self::TooLong];

    pub fn label(self) -> &'static str {
        match self {
            Self::Inaccurate => "Inaccurate",
            Self::TooVague => "Too Vague",
            Self::TooLong => "Too Long",
        }
    }
}

impl fmt::Display for DislikeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dislike reason '{0}'")]
pub struct ParseReasonError(String);

impl FromStr for DislikeReason {
    type Err = ParseReasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reason| reason.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseReasonError(s.to_string()))
    }
}

/// A single entry in the conversation thread.
///
/// Only reaction and feedback fields ever change after creation. The store
/// hands out shared references, so the invariants below hold for anything
/// read back from it:
/// - `dislike_reasons` is empty unless `feedback_type` is `Disliked`
/// - `reactions` holds no duplicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub has_feedback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_type: Option<FeedbackType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dislike_reasons: Vec<DislikeReason>,
    /// Weak reference; may point at an id that no longer (or never) resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<String>,
}

impl Message {
    pub fn new(
        id: impl Into<MessageId>,
        sender: Sender,
        kind: MessageKind,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            sender,
            text: text.into(),
            timestamp,
            kind,
            has_feedback: false,
            feedback_type: None,
            dislike_reasons: Vec::new(),
            reply_to: None,
            reactions: Vec::new(),
        }
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<MessageId>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn with_feedback(mut self, feedback_type: Option<FeedbackType>) -> Self {
        self.has_feedback = true;
        self.feedback_type = feedback_type;
        self
    }

    pub fn is_event(&self) -> bool {
        self.kind == MessageKind::Event
    }

    pub fn accepts_feedback(&self) -> bool {
        self.kind == MessageKind::Ai
    }

    pub fn has_reaction(&self, emoji: &str) -> bool {
        self.reactions.iter().any(|r| r == emoji)
    }

    pub fn is_disliked(&self) -> bool {
        self.feedback_type == Some(FeedbackType::Disliked)
    }
}
