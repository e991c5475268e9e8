//! Mega-AI assistant core.
//!
//! Offline question answering for the portfolio chat widget: a static knowledge
//! base, a two-pass containment + fuzzy matcher, and an async actor that serves
//! it with caching and per-session rate limiting.

pub mod actors;
pub mod brain;
pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod preflight;
pub mod rate_limiter;

#[cfg(test)]
mod tests;

pub use actors::{Assistant, AssistantHandle};
pub use brain::{IntentMatcher, KnowledgeBase, MatchKind, MatchResult, FALLBACK_ANSWER};
pub use config::AssistantConfig;
pub use error::AppError;
