use tokio::sync::oneshot;

use crate::models::{AssistantStats, Reply};

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to the `AssistantActor`.
#[derive(Debug)]
pub enum AssistantMessage {
    /// A question typed into the chat widget.
    Ask {
        session_id: String,
        question: String,
        /// A channel to send the reply (or a rate limit / timeout error) back.
        responder: oneshot::Sender<Result<Reply, AppError>>,
    },
    /// A request for the actor's counters.
    Stats {
        responder: oneshot::Sender<AssistantStats>,
    },
    /// Stop the actor after the messages already queued.
    Shutdown,
}
