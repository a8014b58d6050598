use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use jyotish_types::{FeedbackType, Message, MessageKind, Sender};

/// The consultation history every fresh session starts from.
pub fn seed_messages() -> Vec<Message> {
    vec![
        Message::new(
            "1",
            Sender::System,
            MessageKind::Event,
            "Your session with Astrologer Vikram has started.",
            at(1734681480000),
        ),
        Message::new(
            "2",
            Sender::User,
            MessageKind::Text,
            "Namaste. I am feeling very anxious about my current job. Can you look at my chart?",
            at(1734681600000),
        ),
        Message::new(
            "3",
            Sender::AiAstrologer,
            MessageKind::Ai,
            "Namaste! I am analyzing your birth details. Currently, you are running through Shani Mahadasha. This often brings pressure but builds resilience.",
            at(1734681660000),
        )
        .with_feedback(Some(FeedbackType::Liked)),
        Message::new(
            "4",
            Sender::HumanAstrologer,
            MessageKind::Human,
            "I see the same. Look at your 6th house; Saturn is transiting there. This is why you feel the workload is heavy.",
            at(1734681720000),
        ),
        Message::new(
            "5",
            Sender::User,
            MessageKind::Text,
            "Is there any remedy for this? I find it hard to focus.",
            at(1734681780000),
        )
        .with_reply_to("4"),
        Message::new(
            "6",
            Sender::AiAstrologer,
            MessageKind::Ai,
            "I suggest chanting the Shani Mantra 108 times on Saturdays. Would you like the specific mantra text?",
            at(1734681840000),
        ),
    ]
}

fn at(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Load a JSON array of messages to use as session history.
pub fn load_seed_file(path: &Path) -> Result<Vec<Message>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let messages: Vec<Message> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

    info!("Loaded {} seed messages from {}", messages.len(), path.display());
    Ok(messages)
}

/// Bring arbitrary history in line with the thread invariants:
/// - later messages reusing an earlier id are dropped
/// - repeated reactions collapse to their first occurrence
/// - dislike reasons on messages that are not disliked are cleared
pub fn normalize(history: Vec<Message>) -> Vec<Message> {
    let mut seen = HashSet::with_capacity(history.len());
    let mut messages = Vec::with_capacity(history.len());

    for mut message in history {
        if !seen.insert(message.id.clone()) {
            warn!("Dropping seed message with duplicate id {}", message.id);
            continue;
        }

        let mut emojis = HashSet::new();
        let before = message.reactions.len();
        message.reactions.retain(|emoji| emojis.insert(emoji.clone()));
        if message.reactions.len() != before {
            warn!("Collapsed duplicate reactions on seed message {}", message.id);
        }

        if !message.dislike_reasons.is_empty() && !message.is_disliked() {
            warn!("Clearing dislike reasons on seed message {} (not disliked)", message.id);
            message.dislike_reasons.clear();
        }

        let mut reasons = Vec::with_capacity(message.dislike_reasons.len());
        for reason in message.dislike_reasons.drain(..) {
            if !reasons.contains(&reason) {
                reasons.push(reason);
            }
        }
        message.dislike_reasons = reasons;

        messages.push(message);
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use jyotish_types::DislikeReason;

    #[test]
    fn seed_history_shape() {
        let messages = seed_messages();
        let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6"]);

        assert!(messages[0].is_event());
        assert_eq!(messages[2].feedback_type, Some(FeedbackType::Liked));
        assert!(messages[2].has_feedback);
        assert_eq!(messages[4].reply_to.as_ref().map(|r| r.as_str()), Some("4"));
        assert!(!messages[5].has_feedback);
        assert_eq!(messages[0].timestamp.timestamp_millis(), 1734681480000);
    }

    #[test]
    fn normalize_enforces_invariants() {
        let mut liked = Message::new("a", Sender::AiAstrologer, MessageKind::Ai, "x", Utc::now())
            .with_feedback(Some(FeedbackType::Liked));
        liked.dislike_reasons = vec![DislikeReason::TooLong];
        liked.reactions = vec!["🙏".into(), "✨".into(), "🙏".into()];

        let duplicate = Message::new("a", Sender::User, MessageKind::Text, "dup", Utc::now());

        let mut disliked = Message::new("b", Sender::AiAstrologer, MessageKind::Ai, "y", Utc::now())
            .with_feedback(Some(FeedbackType::Disliked));
        disliked.dislike_reasons = vec![DislikeReason::Inaccurate, DislikeReason::Inaccurate];

        let messages = normalize(vec![liked, duplicate, disliked]);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "x");
        assert!(messages[0].dislike_reasons.is_empty());
        assert_eq!(messages[0].reactions, vec!["🙏", "✨"]);
        assert_eq!(messages[1].dislike_reasons, vec![DislikeReason::Inaccurate]);
    }

    #[test]
    fn load_seed_file_reads_json() {
        let path = std::env::temp_dir().join(format!("jyotish_seed_{}.json", std::process::id()));
        let json = serde_json::to_string(&seed_messages()).unwrap();
        std::fs::write(&path, json).unwrap();

        let loaded = load_seed_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, seed_messages());
    }

    #[test]
    fn load_seed_file_reports_path() {
        let err = load_seed_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
