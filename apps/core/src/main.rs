// Mega-AI Assistant Entry Point
// Reads questions from stdin and answers them from the embedded knowledge base.

use anyhow::{bail, Context};
use mega_assistant::chat::run_chat_loop;
use mega_assistant::logging::{self, LogFormat};
use mega_assistant::preflight::run_preflight_checks;
use mega_assistant::{AssistantConfig, AssistantHandle};
use std::sync::Arc;
use tokio::io::{stdin, stdout, BufReader};
use tracing::{error, info};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is the normal case.
    let _ = dotenv::dotenv();

    logging::init(LogFormat::from_env()?)?;

    let config = AssistantConfig::from_env().context("failed to load configuration")?;
    let knowledge = Arc::new(
        config
            .load_knowledge()
            .context("failed to load knowledge base")?,
    );
    let matcher = config.build_matcher(knowledge);

    let report = run_preflight_checks(&config, &matcher);
    info!("Preflight: {} ({} ms)", report.summary, report.duration_ms);
    if !report.ready_to_start {
        for check in report.checks.iter().filter(|c| c.details.is_some()) {
            error!("{}: {:?}", check.name, check.details);
        }
        bail!("preflight checks failed: {}", report.summary);
    }

    let assistant = AssistantHandle::new(matcher, &config);
    let session_id = Uuid::new_v4().to_string();

    run_chat_loop(
        &assistant,
        &session_id,
        BufReader::new(stdin()),
        stdout(),
        config.typing_delay(),
    )
    .await?;

    assistant.shutdown().await?;
    Ok(())
}
