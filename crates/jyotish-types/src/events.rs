use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DislikeReason, FeedbackType, Message, MessageId};

/// Change notifications published to store subscribers.
///
/// A notification is only published when state actually changed; no-op
/// mutations stay silent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatEvent {
    /// A message was appended to the thread
    MessageCreate { message: Message },

    /// A reaction was added to a message
    ReactionAdd { message_id: MessageId, emoji: String },

    /// A reaction was removed from a message
    ReactionRemove { message_id: MessageId, emoji: String },

    /// Feedback or dislike reasons changed on a message
    FeedbackUpdate {
        message_id: MessageId,
        feedback_type: Option<FeedbackType>,
        dislike_reasons: Vec<DislikeReason>,
    },

    /// The pending reply target was set or cleared
    ReplyTargetUpdate { message_id: Option<MessageId> },

    /// A message was scrolled to and highlighted
    MessageFocused { message_id: MessageId, position: usize },

    /// End-of-session rating prompt was shown
    RatingOpened,

    /// A star count was selected on the rating prompt
    RatingSelected { stars: u8, label: String },

    /// The session rating was recorded
    RatingSubmitted {
        stars: u8,
        acknowledgement: String,
        submitted_at: DateTime<Utc>,
    },

    /// Rating prompt dismissed
    RatingClosed,

    /// Full thread state, sent in reply to a snapshot request
    Snapshot {
        messages: Vec<Message>,
        replying_to: Option<MessageId>,
    },
}

impl ChatEvent {
    /// Returns the message this event re-renders, if it is scoped to one.
    /// Events that return `None` affect the composer, the rating prompt or
    /// the whole thread.
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            Self::MessageCreate { message } => Some(&message.id),
            Self::ReactionAdd { message_id, .. } => Some(message_id),
            Self::ReactionRemove { message_id, .. } => Some(message_id),
            Self::FeedbackUpdate { message_id, .. } => Some(message_id),
            Self::MessageFocused { message_id, .. } => Some(message_id),
            _ => None,
        }
    }
}
