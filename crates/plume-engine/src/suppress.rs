//! Two-tier duplicate suppression.
//!
//! The cache lookup is the cheap politeness optimization; the live check
//! against the platform is the correctness backstop for fresh machines and
//! content the cache never saw. A live hit is written back into the cache
//! so the next run skips the expensive check.

use crate::cache::ActionCache;
use plume_core::protocol::{LiveStatus, SkipReason};
use plume_core::{ContentAdapter, ContentId};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipDecision {
    Proceed,
    Skip(SkipReason),
}

impl SkipDecision {
    pub fn is_skip(&self) -> bool {
        matches!(self, SkipDecision::Skip(_))
    }
}

/// Decide skip vs. proceed for one candidate. Cheapest check first.
///
/// `Proceed` does not assume the action will succeed; the caller records
/// into the cache itself once the platform confirms.
pub async fn should_skip<A: ContentAdapter + ?Sized>(
    adapter: &mut A,
    cache: &mut ActionCache,
    id: &ContentId,
    actor: &str,
) -> SkipDecision {
    if cache.has_acted(id) {
        debug!(content_id = %id, "Skipping: already in cache");
        return SkipDecision::Skip(SkipReason::InCache);
    }

    match adapter.already_acted(id, actor).await {
        Ok(LiveStatus::Found { reason }) => {
            debug!(content_id = %id, %reason, "Skipping: detected live, healing cache");
            cache.record_action(id, actor, &reason).await;
            SkipDecision::Skip(SkipReason::Live(reason))
        }
        Ok(LiveStatus::NotFound) => SkipDecision::Proceed,
        Err(e) => {
            // A broken live check must not stall the run; the adapter's own
            // re-check during perform_action still catches duplicates.
            warn!(content_id = %id, error = %e, "Live duplicate check failed, proceeding");
            SkipDecision::Proceed
        }
    }
}
