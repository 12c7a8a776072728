//! The target-seeking action loop.
//!
//! Progress is measured in confirmed successes, never attempts: the loop
//! pulls candidates off a queue, filters duplicates, performs the action,
//! and refills the queue from discovery until the success target is met or
//! the source is exhausted. One item's failure is recorded and never fatal
//! to the run.

use crate::cache::ActionCache;
use crate::discovery::{self, DiscoveryOptions};
use crate::generator::{GenerationError, TextGenerator};
use crate::suppress::{self, SkipDecision};
use plume_core::protocol::{ActionKind, ActionPayload, ItemOutcome, ItemResult, LoopResult};
use plume_core::{AdapterError, ContentAdapter, ContentId, CriteriaError, SearchCriteria};
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Consecutive empty discovery rounds before the run is declared exhausted.
const MAX_DISCOVERY_FAILURES: u32 = 3;

/// Cooperative cancellation flag, checked at each loop iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Where the action text comes from.
#[derive(Debug, Clone)]
pub enum TextSource {
    /// Same operator-provided text for every item.
    Fixed(String),
    /// Generate per item from the extracted content.
    Generated,
    /// Text-less action (plain likes).
    None,
}

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub action: ActionKind,
    pub target_successes: usize,
    pub text: TextSource,
    /// Like the content after a successful primary action.
    pub secondary_like: bool,
    /// How many new candidates to ask discovery for per refill.
    pub refill_size: usize,
    /// Scroll/pagination budget per refill.
    pub max_pages_per_refill: usize,
    /// Politeness delay between successful actions, milliseconds.
    pub delay_ms: (u64, u64),
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            action: ActionKind::Comment,
            target_successes: 5,
            text: TextSource::Generated,
            secondary_like: false,
            refill_size: 10,
            max_pages_per_refill: 8,
            delay_ms: (2_000, 6_000),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ItemError {
    #[error("Content fetch failed: {0}")]
    Fetch(AdapterError),
    #[error("Text generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("Action failed: {0}")]
    Action(AdapterError),
    #[error("AI text requested but no generator configured")]
    NoGenerator,
}

enum Processed {
    Performed { comment: Option<String> },
    SkippedByAdapter { reason: String },
}

pub struct Runner<'a> {
    adapter: &'a mut dyn ContentAdapter,
    cache: &'a mut ActionCache,
    generator: Option<&'a dyn TextGenerator>,
    actor: String,
    opts: RunnerOptions,
}

impl<'a> Runner<'a> {
    pub fn new(
        adapter: &'a mut dyn ContentAdapter,
        cache: &'a mut ActionCache,
        generator: Option<&'a dyn TextGenerator>,
        actor: impl Into<String>,
        opts: RunnerOptions,
    ) -> Self {
        Self {
            adapter,
            cache,
            generator,
            actor: actor.into(),
            opts,
        }
    }

    /// Run until `target_successes` confirmed actions, the source is
    /// exhausted, or `cancel` fires. Only invalid criteria aborts up front;
    /// everything mid-loop is isolated to the offending item.
    pub async fn run(
        &mut self,
        criteria: &SearchCriteria,
        cancel: &CancelFlag,
    ) -> Result<LoopResult, CriteriaError> {
        criteria.validate()?;

        let mut successes = 0usize;
        let mut attempts = 0usize;
        let mut discovery_failures = 0u32;
        let mut queue: VecDeque<ContentId> = VecDeque::new();
        let mut seen: HashSet<ContentId> = HashSet::new();
        let mut items: Vec<ItemResult> = Vec::new();

        while successes < self.opts.target_successes {
            if cancel.is_cancelled() {
                info!("Run cancelled");
                break;
            }

            if queue.is_empty() {
                let more = discovery::discover(
                    self.adapter,
                    criteria,
                    &mut seen,
                    DiscoveryOptions {
                        min_needed: self.opts.refill_size,
                        max_pages: self.opts.max_pages_per_refill,
                    },
                )
                .await?;

                if more.is_empty() {
                    discovery_failures += 1;
                    if discovery_failures >= MAX_DISCOVERY_FAILURES {
                        info!(successes, attempts, "Content source exhausted, stopping");
                        break;
                    }
                    continue;
                }
                discovery_failures = 0;
                queue.extend(more);
            }

            let Some(id) = queue.pop_front() else {
                continue;
            };

            match suppress::should_skip(self.adapter, self.cache, &id, &self.actor).await {
                SkipDecision::Skip(reason) => {
                    // Skips never count toward the attempt total.
                    items.push(ItemResult {
                        content_id: id,
                        outcome: ItemOutcome::Skipped { reason },
                    });
                    continue;
                }
                SkipDecision::Proceed => {}
            }

            match self.process(&id).await {
                Ok(Processed::SkippedByAdapter { reason }) => {
                    items.push(ItemResult {
                        content_id: id,
                        outcome: ItemOutcome::Skipped {
                            reason: plume_core::protocol::SkipReason::Live(reason),
                        },
                    });
                    continue;
                }
                Ok(Processed::Performed { comment }) => {
                    attempts += 1;
                    self.cache.record_action(&id, &self.actor, "performed").await;
                    successes += 1;

                    let liked = if self.opts.secondary_like {
                        self.try_secondary(&id).await
                    } else {
                        false
                    };

                    items.push(ItemResult {
                        content_id: id,
                        outcome: ItemOutcome::Performed { comment, liked },
                    });

                    if successes >= self.opts.target_successes {
                        break;
                    }
                    self.politeness_delay().await;
                }
                Err(e) => {
                    attempts += 1;
                    warn!(content_id = %id, error = %e, "Item failed, continuing");
                    items.push(ItemResult {
                        content_id: id,
                        outcome: ItemOutcome::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        info!(
            successes,
            attempts,
            target = self.opts.target_successes,
            "Run finished"
        );
        Ok(LoopResult {
            successes,
            attempts,
            target: self.opts.target_successes,
            items,
        })
    }

    async fn process(&mut self, id: &ContentId) -> Result<Processed, ItemError> {
        let text = match &self.opts.text {
            TextSource::Fixed(t) => Some(t.clone()),
            TextSource::None => None,
            TextSource::Generated => {
                let generator = self.generator.ok_or(ItemError::NoGenerator)?;
                let content = self
                    .adapter
                    .extract_content(id)
                    .await
                    .map_err(ItemError::Fetch)?;
                Some(generator.generate(&content, None).await?)
            }
        };

        let payload = ActionPayload {
            kind: self.opts.action,
            text: text.clone(),
        };
        let outcome = self
            .adapter
            .perform_action(id, &payload)
            .await
            .map_err(ItemError::Action)?;

        if outcome.skipped {
            return Ok(Processed::SkippedByAdapter {
                reason: outcome
                    .reason
                    .unwrap_or_else(|| "adapter-skipped".to_string()),
            });
        }
        if !outcome.success {
            return Err(ItemError::Action(AdapterError::Action(
                outcome.reason.unwrap_or_else(|| "unspecified".to_string()),
            )));
        }
        Ok(Processed::Performed { comment: text })
    }

    /// Secondary action failures are logged and never revert the primary
    /// success.
    async fn try_secondary(&mut self, id: &ContentId) -> bool {
        match self.adapter.secondary_action(id).await {
            Ok(outcome) if outcome.success => true,
            Ok(outcome) => {
                warn!(content_id = %id, reason = ?outcome.reason, "Secondary action did not succeed");
                false
            }
            Err(e) => {
                warn!(content_id = %id, error = %e, "Secondary action failed");
                false
            }
        }
    }

    async fn politeness_delay(&self) {
        let (min, max) = self.opts.delay_ms;
        if max == 0 {
            return;
        }
        let ms = if max > min {
            rand::rng().random_range(min..=max)
        } else {
            min
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
