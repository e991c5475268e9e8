use crate::actors::messages::AppError;
use crate::models::{AssistantStats, Reply};
use async_trait::async_trait;

/// Defines the public interface of the question-answering assistant.
///
/// The chat loop only depends on this trait, so tests can swap in a mock
/// instead of the real actor.
#[async_trait]
pub trait Assistant: Send + Sync + 'static {
    /// Answers one question for a chat session.
    async fn ask(&self, session_id: String, question: String) -> Result<Reply, AppError>;

    /// Returns counters about questions served so far.
    async fn stats(&self) -> Result<AssistantStats, AppError>;
}
