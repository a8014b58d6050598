use std::time::Instant;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use jyotish_store::feedback::{toggle_dislike_reason, toggle_feedback};
use jyotish_store::view::{self, Highlight};
use jyotish_store::{MessageStore, RatingPrompt};
use jyotish_types::{ChatCommand, ChatEvent, Message};

/// One consultation: the thread, the rating prompt and the reply highlight,
/// driven by `ChatCommand`s.
pub struct Session {
    store: MessageStore,
    store_rx: broadcast::Receiver<ChatEvent>,
    rating: RatingPrompt,
    highlight: Highlight,
    astrologer: String,
}

impl Session {
    pub fn new(store: MessageStore, astrologer: String) -> Self {
        let store_rx = store.subscribe();
        Self {
            store,
            store_rx,
            rating: RatingPrompt::new(),
            highlight: Highlight::default(),
            astrologer,
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Apply a command. Returns the store notifications it raised, in order,
    /// followed by any session-level events.
    pub fn apply(&mut self, command: ChatCommand) -> Vec<ChatEvent> {
        let mut extra = Vec::new();

        match command {
            ChatCommand::SendMessage { text } => {
                self.store.send_message(&text);
            }
            ChatCommand::SetReplyingTo { message_id: None } => {
                self.store.set_replying_to(None);
            }
            ChatCommand::SetReplyingTo { message_id: Some(id) } => match self.store.resolve(&id).cloned() {
                Some(message) => self.store.set_replying_to(Some(message)),
                None => debug!("SetReplyingTo: unknown message {}", id),
            },
            ChatCommand::SwipeReply { message_id } => {
                if !view::begin_reply(&mut self.store, &message_id) {
                    debug!("SwipeReply: message {} cannot be replied to", message_id);
                }
            }
            ChatCommand::FocusMessage { message_id } => {
                match self.highlight.focus(&self.store, &message_id, Instant::now()) {
                    Some(position) => extra.push(ChatEvent::MessageFocused { message_id, position }),
                    None => debug!("FocusMessage: unknown message {}", message_id),
                }
            }
            ChatCommand::AddReaction { message_id, emoji } => {
                self.store.add_reaction(&message_id, &emoji);
            }
            ChatCommand::RemoveReaction { message_id, emoji } => {
                self.store.remove_reaction(&message_id, &emoji);
            }
            ChatCommand::SetFeedback {
                message_id,
                feedback_type,
            } => {
                self.store.set_feedback(&message_id, feedback_type);
            }
            ChatCommand::SetDislikeReasons { message_id, reasons } => {
                self.store.set_dislike_reasons(&message_id, &reasons);
            }
            ChatCommand::ToggleFeedback { message_id, action } => {
                toggle_feedback(&mut self.store, &message_id, action);
            }
            ChatCommand::ToggleDislikeReason { message_id, reason } => {
                toggle_dislike_reason(&mut self.store, &message_id, reason);
            }
            ChatCommand::EndChat => {
                if !self.rating.is_visible() {
                    info!("Chat ended, asking for a rating");
                    self.rating.open();
                    extra.push(ChatEvent::RatingOpened);
                }
            }
            ChatCommand::RateSession { stars } => match self.rating.select(stars) {
                Ok(label) => extra.push(ChatEvent::RatingSelected {
                    stars,
                    label: label.to_string(),
                }),
                Err(e) => warn!("Rating rejected: {}", e),
            },
            ChatCommand::SubmitRating => match self.rating.submit() {
                Ok(rating) => {
                    extra.push(ChatEvent::RatingSubmitted {
                        stars: rating.stars,
                        acknowledgement: rating.acknowledgement(),
                        submitted_at: rating.submitted_at,
                    });
                    self.rating.close();
                    extra.push(ChatEvent::RatingClosed);
                }
                Err(e) => warn!("Rating not submitted: {}", e),
            },
            ChatCommand::SkipRating => {
                if self.rating.is_visible() {
                    self.rating.skip();
                    extra.push(ChatEvent::RatingClosed);
                }
            }
            ChatCommand::Snapshot => extra.push(ChatEvent::Snapshot {
                messages: self.store.messages().to_vec(),
                replying_to: self.store.replying_to().map(|m| m.id.clone()),
            }),
        }

        let mut events = self.drain_store_events();
        events.extend(extra);
        events
    }

    fn drain_store_events(&mut self) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        loop {
            match self.store_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(n)) => {
                    warn!("Store receiver lagged by {} events", n);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return events,
            }
        }
    }

    /// Plain-text rendering of the thread, one line per message.
    pub fn transcript(&self) -> Vec<String> {
        self.store
            .messages()
            .iter()
            .map(|message| self.render_line(message))
            .collect()
    }

    fn render_line(&self, message: &Message) -> String {
        if message.is_event() {
            return format!("-- {} --", message.text);
        }

        let mut line = match view::sender_label(message.sender, &self.astrologer) {
            Some(label) => format!("[{}] ", label),
            None => String::from("[You] "),
        };
        if let Some(preview) = view::reply_preview(&self.store, message) {
            line.push_str(&format!("(re: \"{}\") ", preview.text));
        }
        line.push_str(&message.text);
        if !message.reactions.is_empty() {
            line.push_str(&format!(" {}", message.reactions.join("")));
        }
        if let Some(feedback) = message.feedback_type {
            line.push_str(&format!(" <{:?}>", feedback));
        }
        line
    }
}
