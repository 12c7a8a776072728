//! Fallback selector chains.

use plume_core::{Browser, BrowserError};

/// Walk an ordered selector chain and return the first selector that
/// matches at least one element, or `None` when the whole chain misses.
/// "Nothing matched" is an answer here, never an error.
pub async fn first_present<B: Browser + ?Sized>(
    browser: &mut B,
    chain: &[String],
) -> Result<Option<String>, BrowserError> {
    for selector in chain {
        if !browser.query_all(selector).await?.is_empty() {
            return Ok(Some(selector.clone()));
        }
    }
    Ok(None)
}
