//! Async front-end for the matcher.
//!
//! `AssistantHandle` is a cloneable sender into a single `AssistantActor` task that
//! owns the answer cache and the rate limiter. Matching itself runs on tokio's
//! blocking pool.

pub mod assistant;
pub mod messages;
pub mod traits;

pub use assistant::AssistantHandle;
pub use messages::AssistantMessage;
pub use traits::Assistant;
