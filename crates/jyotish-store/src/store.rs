use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

use jyotish_types::{ChatEvent, DislikeReason, FeedbackType, Message, MessageId, MessageKind, Sender};

use crate::index::ThreadIndex;
use crate::seed;

/// Capacity of the change-notification channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Most notifications a single operation publishes (a send with a reply
/// target raises `ReplyTargetUpdate` then `MessageCreate`). The channel never
/// holds fewer, so a subscriber draining after each operation sees them all.
pub const MAX_EVENTS_PER_OPERATION: usize = 2;

/// Owns the conversation thread and the pending reply target.
///
/// Every operation is synchronous and total: mutations addressing an unknown
/// id are ignored, and subscribers are only notified when state changed.
pub struct MessageStore {
    messages: Vec<Message>,
    index: ThreadIndex,
    replying_to: Option<Message>,
    last_sent_at: Option<DateTime<Utc>>,
    events_tx: broadcast::Sender<ChatEvent>,
}

impl MessageStore {
    /// Create a store over `history`. The history is normalized first, see
    /// [`seed::normalize`]. `event_capacity` is raised to at least
    /// [`MAX_EVENTS_PER_OPERATION`].
    pub fn new(history: Vec<Message>, event_capacity: usize) -> Self {
        let messages = seed::normalize(history);
        let index = ThreadIndex::build(&messages);
        let (events_tx, _) = broadcast::channel(event_capacity.max(MAX_EVENTS_PER_OPERATION));

        Self {
            messages,
            index,
            replying_to: None,
            last_sent_at: None,
            events_tx,
        }
    }

    /// Store seeded with the built-in consultation history.
    pub fn with_seed_history() -> Self {
        Self::new(seed::seed_messages(), DEFAULT_EVENT_CAPACITY)
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events_tx.subscribe()
    }

    fn publish(&self, event: ChatEvent) {
        // No subscribers is not an error.
        let _ = self.events_tx.send(event);
    }

    // -- Reads --

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn replying_to(&self) -> Option<&Message> {
        self.replying_to.as_ref()
    }

    /// Look a message up by id. Unknown ids resolve to `None`.
    pub fn resolve(&self, id: &MessageId) -> Option<&Message> {
        self.index.resolve(&self.messages, id)
    }

    /// Display position of a message, used to scroll to it.
    pub fn position(&self, id: &MessageId) -> Option<usize> {
        self.index.position(id)
    }

    fn message_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        let position = self.index.position(id)?;
        self.messages.get_mut(position).filter(|message| &message.id == id)
    }

    // -- Mutations --

    /// Append a user message replying to the pending reply target, then clear
    /// the target. Whitespace-only text is ignored. Returns the new id.
    pub fn send_message(&mut self, text: &str) -> Option<MessageId> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring empty send");
            return None;
        }

        // New messages never go back in time relative to the previous send.
        let mut timestamp = Utc::now();
        if let Some(last) = self.last_sent_at {
            timestamp = timestamp.max(last);
        }
        self.last_sent_at = Some(timestamp);

        let mut message = Message::new(MessageId::generate(), Sender::User, MessageKind::Text, text, timestamp);
        message.reply_to = self.replying_to.take().map(|target| target.id);

        let id = message.id.clone();
        let position = self.messages.len();
        self.index.insert(id.clone(), position);
        self.messages.push(message.clone());

        info!(
            "Message {} sent{}",
            id,
            message.reply_to.as_ref().map(|r| format!(" in reply to {}", r)).unwrap_or_default()
        );

        if message.reply_to.is_some() {
            self.publish(ChatEvent::ReplyTargetUpdate { message_id: None });
        }
        self.publish(ChatEvent::MessageCreate { message });

        Some(id)
    }

    /// Set or clear the pending reply target. Any message is accepted.
    pub fn set_replying_to(&mut self, message: Option<Message>) {
        let unchanged = self.replying_to.as_ref().map(|m| &m.id) == message.as_ref().map(|m| &m.id);
        self.replying_to = message;
        if unchanged {
            return;
        }

        self.publish(ChatEvent::ReplyTargetUpdate {
            message_id: self.replying_to.as_ref().map(|m| m.id.clone()),
        });
    }

    /// Attach `emoji` to a message unless it already carries it.
    pub fn add_reaction(&mut self, message_id: &MessageId, emoji: &str) {
        let Some(message) = self.message_mut(message_id) else {
            debug!("add_reaction: unknown message {}", message_id);
            return;
        };
        if message.has_reaction(emoji) {
            return;
        }
        message.reactions.push(emoji.to_string());

        self.publish(ChatEvent::ReactionAdd {
            message_id: message_id.clone(),
            emoji: emoji.to_string(),
        });
    }

    /// Detach `emoji` from a message if present.
    pub fn remove_reaction(&mut self, message_id: &MessageId, emoji: &str) {
        let Some(message) = self.message_mut(message_id) else {
            debug!("remove_reaction: unknown message {}", message_id);
            return;
        };
        let before = message.reactions.len();
        message.reactions.retain(|r| r != emoji);
        if message.reactions.len() == before {
            return;
        }

        self.publish(ChatEvent::ReactionRemove {
            message_id: message_id.clone(),
            emoji: emoji.to_string(),
        });
    }

    /// Set exactly `feedback_type` and mark the message as having feedback.
    /// Anything other than `Disliked` clears the dislike reasons.
    pub fn set_feedback(&mut self, message_id: &MessageId, feedback_type: Option<FeedbackType>) {
        let Some(message) = self.message_mut(message_id) else {
            debug!("set_feedback: unknown message {}", message_id);
            return;
        };

        let changed = !message.has_feedback
            || message.feedback_type != feedback_type
            || (feedback_type != Some(FeedbackType::Disliked) && !message.dislike_reasons.is_empty());

        message.has_feedback = true;
        message.feedback_type = feedback_type;
        if feedback_type != Some(FeedbackType::Disliked) {
            message.dislike_reasons.clear();
        }

        if changed {
            let event = feedback_event(message);
            self.publish(event);
        }
    }

    /// Replace the dislike reason set. Duplicates in `reasons` collapse to
    /// their first occurrence. Ignored unless the message is disliked.
    pub fn set_dislike_reasons(&mut self, message_id: &MessageId, reasons: &[DislikeReason]) {
        let Some(message) = self.message_mut(message_id) else {
            debug!("set_dislike_reasons: unknown message {}", message_id);
            return;
        };
        if !message.is_disliked() {
            debug!("set_dislike_reasons: message {} is not disliked", message_id);
            return;
        }

        let mut next = Vec::with_capacity(reasons.len());
        for reason in reasons {
            if !next.contains(reason) {
                next.push(*reason);
            }
        }
        if message.dislike_reasons == next {
            return;
        }
        message.dislike_reasons = next;

        let event = feedback_event(message);
        self.publish(event);
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_EVENT_CAPACITY)
    }
}

fn feedback_event(message: &Message) -> ChatEvent {
    ChatEvent::FeedbackUpdate {
        message_id: message.id.clone(),
        feedback_type: message.feedback_type,
        dislike_reasons: message.dislike_reasons.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn id(s: &str) -> MessageId {
        MessageId::from(s)
    }

    fn drain(rx: &mut broadcast::Receiver<ChatEvent>) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => return events,
                Err(e) => panic!("receiver error: {:?}", e),
            }
        }
    }

    #[test]
    fn add_reaction_is_idempotent() {
        let mut store = MessageStore::with_seed_history();
        store.add_reaction(&id("3"), "🙏");
        store.add_reaction(&id("3"), "🙏");
        assert_eq!(store.resolve(&id("3")).unwrap().reactions, vec!["🙏"]);
    }

    #[test]
    fn reactions_keep_insertion_order() {
        let mut store = MessageStore::with_seed_history();
        store.add_reaction(&id("2"), "✨");
        store.add_reaction(&id("2"), "🌙");
        store.add_reaction(&id("2"), "✨");
        store.remove_reaction(&id("2"), "✨");
        store.add_reaction(&id("2"), "✨");
        assert_eq!(store.resolve(&id("2")).unwrap().reactions, vec!["🌙", "✨"]);
    }

    #[test]
    fn remove_missing_reaction_is_noop() {
        let mut store = MessageStore::with_seed_history();
        let before = store.messages().to_vec();
        let mut rx = store.subscribe();

        store.remove_reaction(&id("4"), "❤️");
        store.remove_reaction(&id("nope"), "❤️");

        assert_eq!(store.messages(), before.as_slice());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut store = MessageStore::with_seed_history();
        let before = store.messages().to_vec();

        store.add_reaction(&id("99"), "🙏");
        store.set_feedback(&id("99"), Some(FeedbackType::Liked));
        store.set_dislike_reasons(&id("99"), &[DislikeReason::Inaccurate]);

        assert_eq!(store.messages(), before.as_slice());
    }

    #[test]
    fn set_feedback_switches_directly() {
        let mut store = MessageStore::with_seed_history();
        store.set_feedback(&id("6"), Some(FeedbackType::Liked));
        store.set_feedback(&id("6"), Some(FeedbackType::Disliked));

        let msg = store.resolve(&id("6")).unwrap();
        assert_eq!(msg.feedback_type, Some(FeedbackType::Disliked));
        assert!(msg.has_feedback);
    }

    #[test]
    fn leaving_disliked_clears_reasons() {
        let mut store = MessageStore::with_seed_history();
        store.set_feedback(&id("6"), Some(FeedbackType::Disliked));
        store.set_dislike_reasons(&id("6"), &[DislikeReason::TooLong, DislikeReason::Inaccurate]);
        assert_eq!(store.resolve(&id("6")).unwrap().dislike_reasons.len(), 2);

        store.set_feedback(&id("6"), None);
        let msg = store.resolve(&id("6")).unwrap();
        assert_eq!(msg.feedback_type, None);
        assert!(msg.has_feedback);
        assert!(msg.dislike_reasons.is_empty());
    }

    #[test]
    fn reapplying_disliked_keeps_reasons() {
        let mut store = MessageStore::with_seed_history();
        store.set_feedback(&id("6"), Some(FeedbackType::Disliked));
        store.set_dislike_reasons(&id("6"), &[DislikeReason::TooVague]);
        store.set_feedback(&id("6"), Some(FeedbackType::Disliked));
        assert_eq!(store.resolve(&id("6")).unwrap().dislike_reasons, vec![DislikeReason::TooVague]);
    }

    #[test]
    fn reasons_ignored_unless_disliked() {
        let mut store = MessageStore::with_seed_history();
        store.set_dislike_reasons(&id("3"), &[DislikeReason::TooLong]);
        assert!(store.resolve(&id("3")).unwrap().dislike_reasons.is_empty());
    }

    #[test]
    fn reasons_overwrite_and_dedupe() {
        let mut store = MessageStore::with_seed_history();
        store.set_feedback(&id("6"), Some(FeedbackType::Disliked));
        store.set_dislike_reasons(&id("6"), &[DislikeReason::Inaccurate]);
        store.set_dislike_reasons(
            &id("6"),
            &[DislikeReason::TooLong, DislikeReason::TooVague, DislikeReason::TooLong],
        );
        assert_eq!(
            store.resolve(&id("6")).unwrap().dislike_reasons,
            vec![DislikeReason::TooLong, DislikeReason::TooVague]
        );
    }

    #[test]
    fn whitespace_send_is_noop() {
        let mut store = MessageStore::with_seed_history();
        let target = store.resolve(&id("4")).cloned();
        store.set_replying_to(target);

        assert_eq!(store.send_message("  \n\t "), None);
        assert_eq!(store.len(), 6);
        assert_eq!(store.replying_to().map(|m| m.id.as_str()), Some("4"));
    }

    #[test]
    fn send_replies_to_target_and_clears_it() {
        let mut store = MessageStore::with_seed_history();
        let target = store.resolve(&id("3")).cloned();
        store.set_replying_to(target);

        let new_id = store.send_message("  Hello ").unwrap();
        let sent = store.messages().last().unwrap();

        assert_eq!(sent.id, new_id);
        assert_eq!(sent.sender, Sender::User);
        assert_eq!(sent.kind, MessageKind::Text);
        assert_eq!(sent.text, "Hello");
        assert_eq!(sent.reply_to, Some(id("3")));
        assert!(store.replying_to().is_none());
        assert_eq!(store.position(&new_id), Some(6));
    }

    #[test]
    fn reply_target_outside_thread_dangles() {
        let mut store = MessageStore::with_seed_history();
        let stranger = Message::new(
            "elsewhere",
            Sender::HumanAstrologer,
            MessageKind::Human,
            "From another chat",
            Utc::now(),
        );
        store.set_replying_to(Some(stranger));
        assert_eq!(store.replying_to().map(|m| m.id.as_str()), Some("elsewhere"));

        let new_id = store.send_message("Following up").unwrap();
        let sent = store.resolve(&new_id).unwrap();

        assert_eq!(sent.reply_to, Some(id("elsewhere")));
        assert!(store.resolve(&id("elsewhere")).is_none());
        assert!(crate::view::reply_preview(&store, sent).is_none());
        assert!(store.replying_to().is_none());
    }

    #[test]
    fn tiny_capacity_keeps_one_operations_events() {
        let mut store = MessageStore::new(seed::seed_messages(), 1);
        let target = store.resolve(&id("4")).cloned();
        store.set_replying_to(target);
        let mut rx = store.subscribe();

        store.send_message("Hello");
        let events = drain(&mut rx);
        assert_eq!(events.len(), MAX_EVENTS_PER_OPERATION);
        assert_eq!(events[0], ChatEvent::ReplyTargetUpdate { message_id: None });
        assert!(matches!(&events[1], ChatEvent::MessageCreate { .. }));
    }

    #[test]
    fn sent_ids_are_unique_and_timestamps_non_decreasing() {
        let mut store = MessageStore::default();
        let ids: Vec<_> = (0..20).filter_map(|i| store.send_message(&format!("msg {}", i))).collect();

        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), 20);

        let stamps: Vec<_> = store.messages().iter().map(|m| m.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn notifications_only_on_change() {
        let mut store = MessageStore::with_seed_history();
        let mut rx = store.subscribe();

        store.add_reaction(&id("5"), "😊");
        store.add_reaction(&id("5"), "😊");
        store.set_feedback(&id("3"), Some(FeedbackType::Liked)); // already liked
        store.set_feedback(&id("6"), Some(FeedbackType::Liked));

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                ChatEvent::ReactionAdd { message_id: id("5"), emoji: "😊".into() },
                ChatEvent::FeedbackUpdate {
                    message_id: id("6"),
                    feedback_type: Some(FeedbackType::Liked),
                    dislike_reasons: vec![],
                },
            ]
        );
    }

    #[test]
    fn send_with_target_publishes_reply_clear_then_create() {
        let mut store = MessageStore::with_seed_history();
        let target = store.resolve(&id("1")).cloned();
        store.set_replying_to(target);
        let mut rx = store.subscribe();

        store.send_message("ok");
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ChatEvent::ReplyTargetUpdate { message_id: None });
        assert!(matches!(&events[1], ChatEvent::MessageCreate { message } if message.text == "ok"));
    }
}
