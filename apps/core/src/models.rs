use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brain::{KnowledgeStats, MatchKind, MatchResult};

/// One answered question, as handed to the chat UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// The unique identifier for the reply (UUID v4).
    pub id: Uuid,
    /// The chat session the question came from.
    pub session_id: String,
    /// The question exactly as the user typed it.
    pub question: String,
    /// The answer to display.
    pub answer: String,
    /// Which matching pass produced the answer.
    pub kind: MatchKind,
    /// Normalized edit distance when the fuzzy pass ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Whether the answer was served from the actor's cache.
    pub cached: bool,
    pub created_at: DateTime<Utc>,
}

impl Reply {
    pub fn new(session_id: String, question: String, result: MatchResult, cached: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            question,
            answer: result.answer,
            kind: result.kind,
            score: result.score,
            cached,
            created_at: Utc::now(),
        }
    }
}

/// Counters reported by the assistant actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantStats {
    pub questions: u64,
    pub answered: u64,
    pub fallbacks: u64,
    pub cache_hits: u64,
    pub rate_limited: u64,
    /// Matches that ran past the request timeout and got the fallback.
    pub timeouts: u64,
    pub cached_entries: usize,
    pub knowledge: Option<KnowledgeStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_serialization() {
        let result = MatchResult {
            answer: "The capital of France is Paris.".to_string(),
            kind: MatchKind::Containment,
            variant: Some("capital of france".to_string()),
            score: None,
        };
        let reply = Reply::new("s1".to_string(), "Capital of France?".to_string(), result, false);

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["kind"], "containment");
        assert_eq!(json["session_id"], "s1");
        assert!(json.get("score").is_none());

        let back: Reply = serde_json::from_value(json).unwrap();
        assert_eq!(back, reply);
    }

    #[test]
    fn test_reply_ids_are_unique() {
        let result = MatchResult {
            answer: "a".to_string(),
            kind: MatchKind::Fallback,
            variant: None,
            score: Some(0.9),
        };
        let a = Reply::new("s".into(), "q".into(), result.clone(), false);
        let b = Reply::new("s".into(), "q".into(), result, false);
        assert_ne!(a.id, b.id);
    }
}
