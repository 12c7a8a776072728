//! Candidate discovery: page/scroll the content source until enough new
//! candidates are collected or the page budget is spent.

use plume_core::{ContentAdapter, ContentId, CriteriaError, SearchCriteria};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct DiscoveryOptions {
    /// Stop as soon as this many new candidates are collected.
    pub min_needed: usize,
    /// Hard bound on scroll/pagination rounds.
    pub max_pages: usize,
}

/// Collect up to `min_needed` candidates not yet in `seen`.
///
/// Every returned id is inserted into `seen` so a later call in the same
/// run cannot re-surface it. Zero-item pages and adapter errors mid-round
/// degrade to an empty round; the accumulated set is returned even when it
/// falls short of `min_needed`. Only invalid criteria is a hard failure.
pub async fn discover<A: ContentAdapter + ?Sized>(
    adapter: &mut A,
    criteria: &SearchCriteria,
    seen: &mut HashSet<ContentId>,
    opts: DiscoveryOptions,
) -> Result<Vec<ContentId>, CriteriaError> {
    criteria.validate()?;

    let mut collected = Vec::new();

    for page in 0..opts.max_pages {
        let visible = match adapter.discover_page(criteria).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(page, error = %e, "Discovery page failed, treating as empty");
                Vec::new()
            }
        };

        let mut fresh = 0usize;
        for id in visible {
            // De-duplication is by canonical id; `seen` doubles as the
            // run-lifetime discovered set.
            if seen.insert(id.clone()) {
                collected.push(id);
                fresh += 1;
            }
        }
        debug!(page, fresh, total = collected.len(), "Discovery round");

        if collected.len() >= opts.min_needed {
            break;
        }

        if page + 1 < opts.max_pages {
            if let Err(e) = adapter.reveal_more().await {
                warn!(page, error = %e, "Could not reveal more content, stopping discovery");
                break;
            }
        }
    }

    Ok(collected)
}
