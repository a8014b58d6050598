/// Shared data model for the consultation chat.
///
/// - `models`: messages and the enums that classify them
/// - `api`: commands a presentation layer issues against the store
/// - `events`: change notifications the store publishes to subscribers

pub mod api;
pub mod events;
pub mod models;

pub use api::{ChatCommand, FeedbackAction};
pub use events::ChatEvent;
pub use models::{
    DislikeReason, FeedbackType, Message, MessageId, MessageKind, ParseFeedbackError,
    ParseReasonError, Sender,
};
