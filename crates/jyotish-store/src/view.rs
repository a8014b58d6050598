use std::time::{Duration, Instant};

use jyotish_types::{Message, MessageId, Sender};

use crate::store::MessageStore;

/// Emoji offered by the long-press reaction picker.
pub const REACTION_EMOJIS: [&str; 6] = ["🙏", "✨", "🌙", "❤️", "👍", "😊"];

/// How long a message stays highlighted after jumping to it from a reply.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(1500);

/// Quoted original shown above a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyPreview<'a> {
    pub id: &'a MessageId,
    pub sender: Sender,
    pub text: &'a str,
}

/// Resolve the message `message` replies to. Dangling references give `None`.
pub fn reply_preview<'a>(store: &'a MessageStore, message: &Message) -> Option<ReplyPreview<'a>> {
    let original = store.resolve(message.reply_to.as_ref()?)?;
    Some(ReplyPreview {
        id: &original.id,
        sender: original.sender,
        text: &original.text,
    })
}

/// Reaction picked from the picker. The picker only ever adds.
pub fn pick_reaction(store: &mut MessageStore, id: &MessageId, emoji: &str) {
    store.add_reaction(id, emoji);
}

/// Swipe-to-reply. Event messages cannot be replied to; unknown ids are
/// ignored. Returns whether a reply target was set.
pub fn begin_reply(store: &mut MessageStore, id: &MessageId) -> bool {
    let Some(message) = store.resolve(id).filter(|m| !m.is_event()).cloned() else {
        return false;
    };
    store.set_replying_to(Some(message));
    true
}

pub fn cancel_reply(store: &mut MessageStore) {
    store.set_replying_to(None);
}

/// Heading shown above astrologer messages.
pub fn sender_label(sender: Sender, astrologer: &str) -> Option<&str> {
    match sender {
        Sender::AiAstrologer => Some("AI Astrologer"),
        Sender::HumanAstrologer => Some(astrologer),
        Sender::System | Sender::User => None,
    }
}

/// Temporary highlight on the original of a tapped reply preview.
#[derive(Debug, Clone, Default)]
pub struct Highlight {
    target: Option<(MessageId, Instant)>,
}

impl Highlight {
    /// Highlight `id` until `now + HIGHLIGHT_DURATION`, replacing any current
    /// highlight. Returns the display position to scroll to, or `None` (and
    /// leaves the highlight untouched) if the id does not resolve.
    pub fn focus(&mut self, store: &MessageStore, id: &MessageId, now: Instant) -> Option<usize> {
        let position = store.resolve(id).and_then(|m| store.position(&m.id))?;
        self.target = Some((id.clone(), now + HIGHLIGHT_DURATION));
        Some(position)
    }

    pub fn is_highlighted(&self, id: &MessageId, now: Instant) -> bool {
        matches!(&self.target, Some((target, until)) if target == id && now < *until)
    }

    /// Currently highlighted id, if the highlight has not expired.
    pub fn current(&self, now: Instant) -> Option<&MessageId> {
        match &self.target {
            Some((id, until)) if now < *until => Some(id),
            _ => None,
        }
    }
}
