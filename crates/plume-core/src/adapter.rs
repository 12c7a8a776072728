use crate::browser::BrowserError;
use crate::content::ContentId;
use crate::criteria::SearchCriteria;
use crate::protocol::{ActionOutcome, ActionPayload, LiveStatus};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Content fetch failed: {0}")]
    Fetch(String),
    #[error("Action execution failed: {0}")]
    Action(String),
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
    #[error("Not supported: {0}")]
    NotSupported(String),
    #[error("{0}")]
    Other(String),
}

/// Platform boundary for the engine. One implementation per platform (or
/// one selector-driven implementation configured per platform); all DOM
/// heuristics live behind this trait so the cache/discovery/loop logic is
/// testable with mocks.
#[async_trait]
pub trait ContentAdapter: Send {
    /// Platform name, used for cache and session file naming.
    fn platform(&self) -> &str;

    /// Identifiers for every candidate currently visible on the search
    /// surface for `criteria`. Callers de-duplicate; returning ids that were
    /// already surfaced is fine.
    async fn discover_page(
        &mut self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ContentId>, AdapterError>;

    /// Ask the source to reveal more candidates (scroll, next page).
    async fn reveal_more(&mut self) -> Result<(), AdapterError>;

    /// The content's text, used as the prompt for generated replies.
    async fn extract_content(&mut self, id: &ContentId) -> Result<String, AdapterError>;

    /// Perform the primary action. Adapters that re-check on their own
    /// report `skipped` in the outcome instead of failing.
    async fn perform_action(
        &mut self,
        id: &ContentId,
        payload: &ActionPayload,
    ) -> Result<ActionOutcome, AdapterError>;

    /// Authoritative live check: does `actor` already appear among the
    /// responses to this content? `NotFound` is a normal answer, not an
    /// error.
    async fn already_acted(
        &mut self,
        id: &ContentId,
        actor: &str,
    ) -> Result<LiveStatus, AdapterError>;

    /// Optional follow-up after a successful primary action (e.g. like the
    /// post that was just commented on).
    async fn secondary_action(&mut self, _id: &ContentId) -> Result<ActionOutcome, AdapterError> {
        Err(AdapterError::NotSupported("secondary_action".into()))
    }
}
