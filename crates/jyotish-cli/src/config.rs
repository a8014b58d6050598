use std::path::PathBuf;

use anyhow::{Context, Result};

use jyotish_store::DEFAULT_EVENT_CAPACITY;

pub const DEFAULT_ASTROLOGER: &str = "Astrologer Vikram";

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON seed history replacing the built-in one
    pub seed_path: Option<PathBuf>,
    /// Display name of the human astrologer
    pub astrologer: String,
    /// Change-notification channel capacity
    pub event_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let seed_path = lookup("JYOTISH_SEED_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let astrologer = lookup("JYOTISH_ASTROLOGER").unwrap_or_else(|| DEFAULT_ASTROLOGER.into());
        let event_capacity = match lookup("JYOTISH_EVENT_CAPACITY") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("JYOTISH_EVENT_CAPACITY must be a positive integer, got '{}'", raw))?,
            None => DEFAULT_EVENT_CAPACITY,
        };
        anyhow::ensure!(event_capacity > 0, "JYOTISH_EVENT_CAPACITY must be greater than zero");

        Ok(Self {
            seed_path,
            astrologer,
            event_capacity,
        })
    }
}
