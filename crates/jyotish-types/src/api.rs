use serde::{Deserialize, Serialize};

use crate::models::{DislikeReason, FeedbackType, MessageId};

/// Button pressed in the feedback row under an AI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Like,
    Dislike,
}

impl FeedbackAction {
    /// The feedback type this button turns on.
    pub fn feedback_type(self) -> FeedbackType {
        match self {
            Self::Like => FeedbackType::Liked,
            Self::Dislike => FeedbackType::Disliked,
        }
    }
}

/// Commands issued by a presentation layer.
///
/// The `Set*` commands map one-to-one onto store operations; the `Toggle*`
/// commands go through the feedback adapter, which owns toggle semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatCommand {
    /// Submit the composer text
    SendMessage { text: String },

    /// Pick (or clear) the message the next send replies to
    SetReplyingTo { message_id: Option<MessageId> },

    /// Swipe gesture on a message bubble; ignored on event messages
    SwipeReply { message_id: MessageId },

    /// Tap on a reply preview: scroll to and highlight the original
    FocusMessage { message_id: MessageId },

    /// Attach an emoji to a message
    AddReaction { message_id: MessageId, emoji: String },

    /// Detach an emoji from a message
    RemoveReaction { message_id: MessageId, emoji: String },

    /// Set the exact feedback value, `None` clears it
    SetFeedback {
        message_id: MessageId,
        feedback_type: Option<FeedbackType>,
    },

    /// Overwrite the dislike reason set
    SetDislikeReasons {
        message_id: MessageId,
        reasons: Vec<DislikeReason>,
    },

    /// Like/dislike button press with toggle-off on repeat
    ToggleFeedback {
        message_id: MessageId,
        action: FeedbackAction,
    },

    /// Reason chip press
    ToggleDislikeReason {
        message_id: MessageId,
        reason: DislikeReason,
    },

    /// Open the end-of-session rating prompt
    EndChat,

    /// Select a star count on the rating prompt
    RateSession { stars: u8 },

    /// Submit the selected rating
    SubmitRating,

    /// Dismiss the rating prompt without submitting
    SkipRating,

    /// Ask for the full thread state
    Snapshot,
}
