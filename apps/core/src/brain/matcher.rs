//! Intent matcher: maps one free-text question to the best answer in the knowledge base.
//!
//! Two passes over the flattened variant list:
//! 1. Containment: the first variant that contains, or is contained in, the query wins.
//! 2. Fuzzy: the variant with the lowest normalized Levenshtein score wins, provided
//!    the score is below the threshold.
//!
//! Anything else gets the fallback answer. The matcher never fails.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::distance::normalized_score;
use super::knowledge::{normalize, KnowledgeBase};

/// Answer given when nothing matches well enough.
pub const FALLBACK_ANSWER: &str = "I'm not sure about that. Could you try rephrasing your question? I can help with technology, science, math, and general knowledge topics!";

/// Fuzzy scores must be strictly below this to count as a match.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

/// Queries longer than this (in chars) are truncated before matching.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 500;

/// How an answer was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Query and variant contain one another
    Containment,
    /// Closest variant by edit distance, under the threshold
    Fuzzy,
    /// Nothing close enough
    Fallback,
    /// Blank query, both passes skipped
    Empty,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl MatchKind {
    pub fn label(&self) -> &'static str {
        match self {
            MatchKind::Containment => "containment",
            MatchKind::Fuzzy => "fuzzy",
            MatchKind::Fallback => "fallback",
            MatchKind::Empty => "empty",
        }
    }

    /// Whether the answer came from the knowledge base.
    pub fn is_match(&self) -> bool {
        matches!(self, MatchKind::Containment | MatchKind::Fuzzy)
    }
}

/// Outcome of matching one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub answer: String,
    pub kind: MatchKind,
    /// Variant that produced the answer, or the closest one for a fuzzy miss
    pub variant: Option<String>,
    /// Best normalized edit distance; only set when the fuzzy pass ran
    pub score: Option<f64>,
}

/// Stateless matcher over a shared, read-only knowledge base.
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    knowledge: Arc<KnowledgeBase>,
    threshold: f64,
    max_input_chars: usize,
    fallback: String,
}

impl IntentMatcher {
    /// Create a matcher with the default threshold, input cap and fallback.
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            knowledge,
            threshold: DEFAULT_MATCH_THRESHOLD,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            fallback: FALLBACK_ANSWER.to_string(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars.max(1);
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Lower-case, trim and cap a raw query. This is also the cache key used by
    /// the assistant actor.
    pub fn normalize_query(&self, input: &str) -> String {
        let normalized = normalize(input);
        if normalized.chars().count() <= self.max_input_chars {
            return normalized;
        }
        debug!(
            max_input_chars = self.max_input_chars,
            "Truncating oversized query"
        );
        normalized.chars().take(self.max_input_chars).collect()
    }

    /// Best answer for `input`, or the fallback answer.
    pub fn find_answer(&self, input: &str) -> String {
        self.match_query(input).answer
    }

    /// Match `input` and report how the answer was chosen.
    pub fn match_query(&self, input: &str) -> MatchResult {
        let query = self.normalize_query(input);
        self.match_normalized(&query)
    }

    /// Match a query that already went through [`IntentMatcher::normalize_query`].
    pub fn match_normalized(&self, query: &str) -> MatchResult {
        if query.is_empty() {
            return self.fallback_result(MatchKind::Empty, None, None);
        }

        let result = self
            .containment_pass(query)
            .unwrap_or_else(|| self.fuzzy_pass(query));

        debug!(
            kind = %result.kind,
            variant = result.variant.as_deref().unwrap_or(""),
            score = result.score.unwrap_or(0.0),
            "Matched query"
        );
        result
    }

    fn containment_pass(&self, query: &str) -> Option<MatchResult> {
        self.knowledge
            .pairs()
            .iter()
            .find(|pair| query.contains(pair.variant.as_str()) || pair.variant.contains(query))
            .map(|pair| MatchResult {
                answer: pair.answer.clone(),
                kind: MatchKind::Containment,
                variant: Some(pair.variant.clone()),
                score: None,
            })
    }

    fn fuzzy_pass(&self, query: &str) -> MatchResult {
        let mut best: Option<(f64, usize)> = None;

        for (index, pair) in self.knowledge.pairs().iter().enumerate() {
            let score = normalized_score(query, &pair.variant);
            // Strict comparison keeps the first of equally close variants.
            if best.map_or(true, |(best_score, _)| score < best_score) {
                best = Some((score, index));
            }
        }

        let Some((score, index)) = best else {
            return self.fallback_result(MatchKind::Fallback, None, None);
        };
        let pair = &self.knowledge.pairs()[index];

        if score < self.threshold {
            MatchResult {
                answer: pair.answer.clone(),
                kind: MatchKind::Fuzzy,
                variant: Some(pair.variant.clone()),
                score: Some(score),
            }
        } else {
            self.fallback_result(MatchKind::Fallback, Some(pair.variant.clone()), Some(score))
        }
    }

    fn fallback_result(
        &self,
        kind: MatchKind,
        variant: Option<String>,
        score: Option<f64>,
    ) -> MatchResult {
        MatchResult {
            answer: self.fallback.clone(),
            kind,
            variant,
            score,
        }
    }
}
