use crate::actors::messages::{AppError, AssistantMessage};
use crate::actors::traits::Assistant;
use crate::brain::{IntentMatcher, MatchKind, MatchResult};
use crate::config::AssistantConfig;
use crate::models::{AssistantStats, Reply};
use crate::rate_limiter::RateLimiter;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Time a message may spend queued on top of the actor's own match timeout.
const QUEUE_GRACE: Duration = Duration::from_secs(30);

/// Idle sessions are pruned from the rate limiter once this many are tracked.
const PRUNE_THRESHOLD: usize = 1024;

/// A handle to the `AssistantActor`.
///
/// Cheap to clone; every clone talks to the same actor, cache and rate limiter.
#[derive(Clone)]
pub struct AssistantHandle {
    sender: mpsc::Sender<AssistantMessage>,
    /// How long a caller waits for the actor to pick up and answer a message.
    response_timeout: Duration,
}

impl AssistantHandle {
    /// Spawns an `AssistantActor` around `matcher` and returns a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(matcher: IntentMatcher, config: &AssistantConfig) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let actor = AssistantActor::new(receiver, matcher, config);
        tokio::spawn(async move { actor.run().await });
        Self {
            sender,
            response_timeout: config.request_timeout().saturating_add(QUEUE_GRACE),
        }
    }

    /// Loads the knowledge base named by `config` and spawns the actor.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AppError> {
        let knowledge = Arc::new(config.load_knowledge()?);
        Ok(Self::new(config.build_matcher(knowledge), config))
    }

    /// Asks the actor to stop once the messages already queued are handled.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sender
            .send(AssistantMessage::Shutdown)
            .await
            .map_err(|_| AppError::Actor("Assistant actor closed".to_string()))
    }
}

#[async_trait]
impl Assistant for AssistantHandle {
    #[instrument(skip(self, question))]
    async fn ask(&self, session_id: String, question: String) -> Result<Reply, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = AssistantMessage::Ask {
            session_id,
            question,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|_| AppError::Actor("Assistant actor closed".to_string()))?;
        timeout(self.response_timeout, recv)
            .await?
            .map_err(|_| AppError::Actor("Assistant actor failed to respond".to_string()))?
    }

    async fn stats(&self) -> Result<AssistantStats, AppError> {
        let (send, recv) = oneshot::channel();
        self.sender
            .send(AssistantMessage::Stats { responder: send })
            .await
            .map_err(|_| AppError::Actor("Assistant actor closed".to_string()))?;
        timeout(self.response_timeout, recv)
            .await?
            .map_err(|_| AppError::Actor("Assistant actor failed to respond".to_string()))
    }
}

// --- Actor Runner (Internal Logic) ---
struct AssistantActor {
    receiver: mpsc::Receiver<AssistantMessage>,
    matcher: Arc<IntentMatcher>,
    /// Recent results keyed by normalized query.
    cache: LruCache<String, MatchResult>,
    limiter: RateLimiter,
    request_timeout: Duration,
    stats: AssistantStats,
}

impl AssistantActor {
    fn new(
        receiver: mpsc::Receiver<AssistantMessage>,
        matcher: IntentMatcher,
        config: &AssistantConfig,
    ) -> Self {
        let capacity = NonZeroUsize::new(config.cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            receiver,
            matcher: Arc::new(matcher),
            cache: LruCache::new(capacity),
            limiter: RateLimiter::new(config.rate_limit, config.rate_window()),
            request_timeout: config.request_timeout(),
            stats: AssistantStats::default(),
        }
    }

    async fn run(mut self) {
        let knowledge = self.matcher.knowledge().stats();
        info!(
            variants = knowledge.variants,
            cache_capacity = self.cache.cap().get(),
            "AssistantActor started"
        );

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                AssistantMessage::Ask {
                    session_id,
                    question,
                    responder,
                } => {
                    let result = self.handle_ask(session_id, question).await;
                    if let Err(e) = &result {
                        warn!("Question not answered: {}", e);
                    }
                    let _ = responder.send(result);
                }
                AssistantMessage::Stats { responder } => {
                    let _ = responder.send(self.snapshot());
                }
                AssistantMessage::Shutdown => {
                    info!("AssistantActor shutting down...");
                    break;
                }
            }
        }
        info!("AssistantActor stopped");
    }

    #[instrument(skip(self, question))]
    async fn handle_ask(&mut self, session_id: String, question: String) -> Result<Reply, AppError> {
        self.stats.questions += 1;

        if self.limiter.tracked_sessions() > PRUNE_THRESHOLD {
            let pruned = self.limiter.prune();
            debug!(pruned, "Pruned idle sessions");
        }
        if !self.limiter.check(&session_id) {
            self.stats.rate_limited += 1;
            return Err(AppError::RateLimited);
        }

        let key = self.matcher.normalize_query(&question);

        if let Some(hit) = self.cache.get(&key) {
            let result = hit.clone();
            self.stats.cache_hits += 1;
            self.record(&result);
            return Ok(Reply::new(session_id, question, result, true));
        }

        let matcher = Arc::clone(&self.matcher);
        let query = key.clone();
        let task = tokio::task::spawn_blocking(move || matcher.match_normalized(&query));
        let result = match timeout(self.request_timeout, task).await {
            Ok(joined) => {
                let result = joined?;
                self.cache.put(key, result.clone());
                result
            }
            Err(_) => {
                // The blocking task runs to completion; its result is dropped.
                self.stats.timeouts += 1;
                warn!(
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "Match timed out, answering with the fallback"
                );
                self.timed_out_result()
            }
        };

        self.record(&result);
        Ok(Reply::new(session_id, question, result, false))
    }

    /// Not cached, so the same question gets a real match next time.
    fn timed_out_result(&self) -> MatchResult {
        MatchResult {
            answer: self.matcher.fallback().to_string(),
            kind: MatchKind::Fallback,
            variant: None,
            score: None,
        }
    }

    fn record(&mut self, result: &MatchResult) {
        if result.kind.is_match() {
            self.stats.answered += 1;
        } else {
            self.stats.fallbacks += 1;
        }
    }

    fn snapshot(&self) -> AssistantStats {
        AssistantStats {
            cached_entries: self.cache.len(),
            knowledge: Some(self.matcher.knowledge().stats()),
            ..self.stats.clone()
        }
    }
}
