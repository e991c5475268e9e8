//! # Brain Module
//!
//! Offline question answering for the Mega-AI widget. No model, no network:
//! user input is matched against a static knowledge base.
//!
//! ## Components
//! - `knowledge`: corpus loading, validation and flattening
//! - `distance`: Levenshtein edit distance and normalized score
//! - `matcher`: two-pass containment + fuzzy matcher

pub mod distance;
pub mod knowledge;
pub mod matcher;

// Re-export main types for convenience
pub use distance::{levenshtein, normalized_score};
pub use knowledge::{
    normalize, KnowledgeBase, KnowledgeCategory, KnowledgeEntry, KnowledgeStats, ShadowedVariant,
    VariantPair,
};
pub use matcher::{
    IntentMatcher, MatchKind, MatchResult, DEFAULT_MATCH_THRESHOLD, DEFAULT_MAX_INPUT_CHARS,
    FALLBACK_ANSWER,
};
