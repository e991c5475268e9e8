//! Line-oriented chat loop: one question per line in, one answer per line out.
//!
//! Stands in for the widget UI. Slash commands:
//! - `/stats` prints the assistant counters as JSON
//! - `/quit` (or end of input) ends the conversation

use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::actors::Assistant;
use crate::error::AppError;

/// Printed instead of an answer when the session is over its rate limit.
pub const RATE_LIMITED_REPLY: &str =
    "You're sending messages a bit fast. Give me a moment and try again!";

/// Printed when the assistant did not answer in time.
pub const TIMEOUT_REPLY: &str = "Sorry, that took too long to answer. Could you try asking again?";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Ask(&'a str),
    Stats,
    Quit,
}

impl<'a> ChatCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => ChatCommand::Quit,
            "/stats" => ChatCommand::Stats,
            _ => ChatCommand::Ask(line),
        }
    }
}

/// Answer every line from `reader` on `writer` until `/quit` or end of input.
pub async fn run_chat_loop<A, R, W>(
    assistant: &A,
    session_id: &str,
    reader: R,
    mut writer: W,
    typing_delay: Duration,
) -> Result<(), AppError>
where
    A: Assistant,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!(session_id, "Chat session started");
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        match ChatCommand::parse(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Stats => {
                let stats = assistant.stats().await?;
                let json = serde_json::to_string(&stats)
                    .map_err(|e| AppError::Internal(format!("cannot encode stats: {}", e)))?;
                writer.write_all(json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            ChatCommand::Ask(question) => {
                match assistant
                    .ask(session_id.to_string(), question.to_string())
                    .await
                {
                    Ok(reply) => {
                        debug!(kind = %reply.kind, cached = reply.cached, "Reply ready");
                        if !typing_delay.is_zero() {
                            sleep(typing_delay).await;
                        }
                        writer.write_all(reply.answer.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                    Err(AppError::RateLimited) => {
                        writer.write_all(RATE_LIMITED_REPLY.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                    Err(AppError::Timeout(reason)) => {
                        warn!(session_id, %reason, "Question timed out");
                        writer.write_all(TIMEOUT_REPLY.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        writer.flush().await?;
    }

    info!(session_id, "Chat session ended");
    Ok(())
}
