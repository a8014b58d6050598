use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

pub const MAX_STARS: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("rating must be between 1 and 5 stars, got {0}")]
    OutOfRange(u8),

    #[error("no rating selected")]
    NothingSelected,

    #[error("rating prompt is not open")]
    NotOpen,

    #[error("rating already submitted")]
    AlreadySubmitted,
}

/// A recorded end-of-session rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionRating {
    pub stars: u8,
    pub submitted_at: DateTime<Utc>,
}

impl SessionRating {
    pub fn acknowledgement(&self) -> String {
        format!(
            "Your {}-star rating has been recorded. We appreciate your feedback!",
            self.stars
        )
    }
}

/// End-of-session prompt shown after "End Chat".
#[derive(Debug, Clone, Default)]
pub struct RatingPrompt {
    visible: bool,
    stars: Option<u8>,
    submitted: bool,
}

impl RatingPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.visible = true;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn stars(&self) -> Option<u8> {
        self.stars
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Select a star count. Returns the label for the new selection.
    pub fn select(&mut self, stars: u8) -> Result<&'static str, RatingError> {
        if !self.visible {
            return Err(RatingError::NotOpen);
        }
        if !(1..=MAX_STARS).contains(&stars) {
            return Err(RatingError::OutOfRange(stars));
        }
        self.stars = Some(stars);
        Ok(label_for(stars))
    }

    pub fn label(&self) -> Option<&'static str> {
        self.stars.map(label_for)
    }

    /// Record the selected rating. The prompt stays open until closed.
    pub fn submit(&mut self) -> Result<SessionRating, RatingError> {
        if !self.visible {
            return Err(RatingError::NotOpen);
        }
        if self.submitted {
            return Err(RatingError::AlreadySubmitted);
        }
        let stars = self.stars.ok_or(RatingError::NothingSelected)?;
        self.submitted = true;

        info!("Session rated {} stars", stars);
        Ok(SessionRating {
            stars,
            submitted_at: Utc::now(),
        })
    }

    /// Hide the prompt and forget the selection.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// Dismiss without rating.
    pub fn skip(&mut self) {
        self.close();
    }
}

fn label_for(stars: u8) -> &'static str {
    match stars {
        5 => "Excellent!",
        4 => "Great!",
        3 => "Good",
        2 => "Fair",
        _ => "Poor",
    }
}
