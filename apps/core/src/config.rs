//! Assistant configuration, read from the environment.
//!
//! The binary loads a `.env` file (through `dotenv`) before calling
//! [`AssistantConfig::from_env`]. Every setting has a default, so an empty
//! environment yields a working assistant.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use crate::brain::{
    IntentMatcher, KnowledgeBase, DEFAULT_MATCH_THRESHOLD, DEFAULT_MAX_INPUT_CHARS,
    FALLBACK_ANSWER,
};
use crate::error::AppError;

/// Runtime settings for the matcher and the assistant actor.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssistantConfig {
    /// Fuzzy scores strictly below this are accepted. Between 0.0 and 1.0.
    #[validate(range(min = 0.0, max = 1.0))]
    pub match_threshold: f64,
    /// Queries are truncated to this many characters before matching.
    #[validate(range(min = 1))]
    pub max_input_chars: usize,
    /// Number of recent answers kept by the actor.
    #[validate(range(min = 1))]
    pub cache_size: usize,
    /// Requests allowed per session within `rate_window_secs`.
    #[validate(range(min = 1))]
    pub rate_limit: usize,
    #[validate(range(min = 1))]
    pub rate_window_secs: u64,
    /// Upper bound for a single match on the blocking pool.
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,
    /// Cosmetic pause before the chat loop prints an answer.
    pub typing_delay_ms: u64,
    /// Replace the embedded corpus with a JSON file.
    pub knowledge_path: Option<PathBuf>,
    #[validate(length(min = 1))]
    pub fallback_answer: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            cache_size: 256,
            rate_limit: 30,
            rate_window_secs: 60,
            request_timeout_ms: 2000,
            typing_delay_ms: 0,
            knowledge_path: None,
            fallback_answer: FALLBACK_ANSWER.to_string(),
        }
    }
}

impl AssistantConfig {
    /// Read the `ASSISTANT_*` variables on top of the defaults and validate.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Self {
            match_threshold: env_or("ASSISTANT_MATCH_THRESHOLD", defaults.match_threshold)?,
            max_input_chars: env_or("ASSISTANT_MAX_INPUT_CHARS", defaults.max_input_chars)?,
            cache_size: env_or("ASSISTANT_CACHE_SIZE", defaults.cache_size)?,
            rate_limit: env_or("ASSISTANT_RATE_LIMIT", defaults.rate_limit)?,
            rate_window_secs: env_or("ASSISTANT_RATE_WINDOW_SECS", defaults.rate_window_secs)?,
            request_timeout_ms: env_or(
                "ASSISTANT_REQUEST_TIMEOUT_MS",
                defaults.request_timeout_ms,
            )?,
            typing_delay_ms: env_or("ASSISTANT_TYPING_DELAY_MS", defaults.typing_delay_ms)?,
            knowledge_path: env::var("ASSISTANT_KNOWLEDGE_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            fallback_answer: env::var("ASSISTANT_FALLBACK")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.fallback_answer),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    /// The configured corpus file, or the embedded corpus.
    pub fn load_knowledge(&self) -> Result<KnowledgeBase, AppError> {
        match &self.knowledge_path {
            Some(path) => KnowledgeBase::from_path(path),
            None => KnowledgeBase::embedded(),
        }
    }

    /// Apply the matching settings to a matcher over `knowledge`.
    pub fn build_matcher(&self, knowledge: std::sync::Arc<KnowledgeBase>) -> IntentMatcher {
        IntentMatcher::new(knowledge)
            .with_threshold(self.match_threshold)
            .with_max_input_chars(self.max_input_chars)
            .with_fallback(self.fallback_answer.clone())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} = {:?}: {}", key, raw, e))),
        _ => Ok(default),
    }
}
