//! Selector-driven `ContentAdapter` over any `Browser`.
//!
//! All DOM knowledge comes from the platform's `SelectorPack`; the adapter
//! itself only walks fallback chains and canonicalizes hrefs. Packs are
//! operator-editable config, not maintained platform support.

use crate::config::{PlatformConfig, SelectorPack};
use crate::selectors::first_present;
use async_trait::async_trait;
use plume_core::protocol::{ActionKind, ActionOutcome, ActionPayload, LiveStatus};
use plume_core::{AdapterError, Browser, ContentAdapter, ContentId, SearchCriteria};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub struct SelectorAdapter<'a, B: Browser + ?Sized> {
    browser: &'a mut B,
    platform: String,
    base_url: Url,
    search_url: String,
    pack: SelectorPack,
    current_url: Option<String>,
}

impl<'a, B: Browser + ?Sized> SelectorAdapter<'a, B> {
    pub fn new(
        browser: &'a mut B,
        platform: impl Into<String>,
        config: &PlatformConfig,
    ) -> Result<Self, AdapterError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AdapterError::Other(format!("bad base_url: {e}")))?;
        Ok(Self {
            browser,
            platform: platform.into(),
            base_url,
            search_url: config.search_url.clone(),
            pack: config.selectors.clone(),
            current_url: None,
        })
    }

    async fn goto(&mut self, url: &str) -> Result<(), AdapterError> {
        if self.current_url.as_deref() != Some(url) {
            self.browser.navigate(url).await?;
            self.current_url = Some(url.to_string());
        }
        Ok(())
    }

    fn search_page_url(&self, criteria: &SearchCriteria) -> Result<String, AdapterError> {
        let query = criteria
            .query_text()
            .map_err(|e| AdapterError::Other(e.to_string()))?;
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        Ok(self.search_url.replace("{query}", &encoded))
    }
}

#[async_trait]
impl<'a, B: Browser + ?Sized> ContentAdapter for SelectorAdapter<'a, B> {
    fn platform(&self) -> &str {
        &self.platform
    }

    async fn discover_page(
        &mut self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ContentId>, AdapterError> {
        let search = self.search_page_url(criteria)?;
        self.goto(&search).await?;

        let Some(selector) = first_present(self.browser, &self.pack.post_links).await? else {
            return Ok(Vec::new());
        };

        let mut ids = Vec::new();
        for element in self.browser.query_all(&selector).await? {
            let Some(href) = element.attr("href") else {
                continue;
            };
            match ContentId::canonicalize(href, Some(&self.base_url)) {
                Ok(id) => ids.push(id),
                Err(e) => debug!(href, error = %e, "Skipping uncanonicalizable link"),
            }
        }
        Ok(ids)
    }

    async fn reveal_more(&mut self) -> Result<(), AdapterError> {
        self.browser.scroll_by(self.pack.scroll_step).await?;
        // Give lazy-loaded content a beat to land.
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(())
    }

    async fn extract_content(&mut self, id: &ContentId) -> Result<String, AdapterError> {
        self.goto(id.as_str()).await?;
        let Some(selector) = first_present(self.browser, &self.pack.content).await? else {
            return Err(AdapterError::Fetch(format!(
                "no content element matched for {id}"
            )));
        };
        let elements = self.browser.query_all(&selector).await?;
        let text = elements
            .first()
            .map(|e| e.text.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(AdapterError::Fetch(format!("content empty for {id}")));
        }
        Ok(text)
    }

    async fn perform_action(
        &mut self,
        id: &ContentId,
        payload: &ActionPayload,
    ) -> Result<ActionOutcome, AdapterError> {
        self.goto(id.as_str()).await?;

        match payload.kind {
            ActionKind::Like => {
                let Some(selector) = first_present(self.browser, &self.pack.like_button).await?
                else {
                    return Err(AdapterError::Action("no like button matched".to_string()));
                };
                self.browser.click(&selector).await?;
                Ok(ActionOutcome::performed())
            }
            ActionKind::Comment | ActionKind::Post => {
                let Some(text) = payload.text.as_deref() else {
                    return Err(AdapterError::Action(format!(
                        "{} requires text",
                        payload.kind
                    )));
                };
                let Some(box_sel) = first_present(self.browser, &self.pack.comment_box).await?
                else {
                    return Err(AdapterError::Action("no comment box matched".to_string()));
                };
                self.browser.type_text(&box_sel, text).await?;

                let Some(submit) = first_present(self.browser, &self.pack.comment_submit).await?
                else {
                    return Err(AdapterError::Action("no submit control matched".to_string()));
                };
                self.browser.click(&submit).await?;
                Ok(ActionOutcome::performed())
            }
        }
    }

    async fn already_acted(
        &mut self,
        id: &ContentId,
        actor: &str,
    ) -> Result<LiveStatus, AdapterError> {
        self.goto(id.as_str()).await?;
        let actor_lower = actor.to_lowercase();
        for selector in self.pack.reply_authors.clone() {
            let elements = match self.browser.query_all(&selector).await {
                Ok(e) => e,
                Err(e) => {
                    warn!(%selector, error = %e, "Reply author selector failed");
                    continue;
                }
            };
            if elements
                .iter()
                .any(|e| e.text.to_lowercase().contains(&actor_lower))
            {
                return Ok(LiveStatus::Found {
                    reason: "found-in-replies".to_string(),
                });
            }
        }
        Ok(LiveStatus::NotFound)
    }

    async fn secondary_action(&mut self, id: &ContentId) -> Result<ActionOutcome, AdapterError> {
        self.goto(id.as_str()).await?;
        let Some(selector) = first_present(self.browser, &self.pack.like_button).await? else {
            return Err(AdapterError::Action("no like button matched".to_string()));
        };
        self.browser.click(&selector).await?;
        Ok(ActionOutcome::performed())
    }
}
