//! Toggle semantics for the like/dislike row and the dislike reason chips.
//!
//! The store only ever sets exact values. Pressing the active button again
//! turns feedback off, pressing the other button switches directly, and the
//! reason chips are only live while the message is disliked.

use tracing::debug;

use jyotish_types::{DislikeReason, FeedbackAction, FeedbackType, Message, MessageId};

use crate::store::MessageStore;

/// Reason chips, in display order.
pub const DISLIKE_REASONS: [DislikeReason; 3] = DislikeReason::ALL;

/// Feedback state after pressing `action` while in `current`.
pub fn next_feedback(current: Option<FeedbackType>, action: FeedbackAction) -> Option<FeedbackType> {
    let pressed = action.feedback_type();
    if current == Some(pressed) { None } else { Some(pressed) }
}

/// Apply a like/dislike press. Returns false when the message is unknown or
/// not an AI message.
pub fn toggle_feedback(store: &mut MessageStore, id: &MessageId, action: FeedbackAction) -> bool {
    let Some(message) = store.resolve(id) else {
        return false;
    };
    if !message.accepts_feedback() {
        debug!("Message {} does not take feedback", id);
        return false;
    }

    let next = next_feedback(message.feedback_type, action);
    store.set_feedback(id, next);
    true
}

/// Apply a reason chip press: add the reason if absent, remove it if present.
/// Returns false when the chips are not available for this message.
pub fn toggle_dislike_reason(store: &mut MessageStore, id: &MessageId, reason: DislikeReason) -> bool {
    let Some(message) = store.resolve(id) else {
        return false;
    };
    if !chips_expanded(message) {
        debug!("Reason chips are collapsed on message {}", id);
        return false;
    }

    let mut reasons = message.dislike_reasons.clone();
    if let Some(pos) = reasons.iter().position(|r| *r == reason) {
        reasons.remove(pos);
    } else {
        reasons.push(reason);
    }
    store.set_dislike_reasons(id, &reasons);
    true
}

/// Whether the reason chips are shown under `message`.
pub fn chips_expanded(message: &Message) -> bool {
    message.accepts_feedback() && message.is_disliked()
}
