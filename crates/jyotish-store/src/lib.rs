/// In-memory state model for a consultation chat thread.
///
/// - `store`: the message list, the pending reply target and every mutation
/// - `index`: id -> position lookup used to resolve reply references
/// - `seed`: built-in session history and seed-file loading
/// - `feedback`: like/dislike toggle semantics layered over the store
/// - `rating`: end-of-session star rating prompt
/// - `view`: reaction picker, swipe-to-reply and reply highlight helpers

pub mod feedback;
pub mod index;
pub mod rating;
pub mod seed;
pub mod store;
pub mod view;

pub use feedback::{DISLIKE_REASONS, chips_expanded, toggle_dislike_reason, toggle_feedback};
pub use index::ThreadIndex;
pub use rating::{RatingError, RatingPrompt, SessionRating};
pub use store::{DEFAULT_EVENT_CAPACITY, MAX_EVENTS_PER_OPERATION, MessageStore};
pub use view::{Highlight, REACTION_EMOJIS, ReplyPreview};
