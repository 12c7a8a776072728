//! Generic credential login over the browser capability.
//!
//! Fields are located through ordered fallback selector chains, so one flow
//! serves any platform whose pack provides (or accepts the default)
//! selectors. Success is judged by the login form going away or a
//! logged-in marker appearing.

use crate::selectors::first_present;
use crate::session::{SessionMetadata, SessionRecord};
use plume_core::protocol::StorageState;
use plume_core::{Browser, BrowserError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
    #[error("Login field not found: {0}")]
    FieldNotFound(String),
    #[error("Login did not complete: the login form is still present")]
    NotLoggedIn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSelectors {
    pub username: Vec<String>,
    pub password: Vec<String>,
    pub submit: Vec<String>,
    /// Optional markers that only exist once logged in. When empty, success
    /// falls back to "the password field is gone".
    pub logged_in: Vec<String>,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            username: vec![
                "input[type='email']".to_string(),
                "input[name*='user']".to_string(),
                "input[autocomplete='username']".to_string(),
            ],
            password: vec!["input[type='password']".to_string()],
            submit: vec![
                "button[type='submit']".to_string(),
                "input[type='submit']".to_string(),
            ],
            logged_in: Vec::new(),
        }
    }
}

pub struct LoginFlow {
    pub login_url: String,
    pub selectors: LoginSelectors,
    /// How long to let the post-submit navigation settle.
    pub settle_ms: u64,
}

impl LoginFlow {
    pub fn new(login_url: impl Into<String>, selectors: LoginSelectors) -> Self {
        Self {
            login_url: login_url.into(),
            selectors,
            settle_ms: 3_000,
        }
    }

    /// Drive the login form and capture the resulting session artifacts.
    pub async fn run<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        platform: &str,
        username: &str,
        password: &str,
    ) -> Result<SessionRecord, LoginError> {
        info!(url = %self.login_url, "Logging in");
        browser.navigate(&self.login_url).await?;

        self.fill(browser, &self.selectors.username, username, "username")
            .await?;
        self.fill(browser, &self.selectors.password, password, "password")
            .await?;

        let submit = first_present(browser, &self.selectors.submit)
            .await?
            .ok_or_else(|| LoginError::FieldNotFound("submit".to_string()))?;
        browser.click(&submit).await?;

        tokio::time::sleep(Duration::from_millis(self.settle_ms)).await;

        self.verify(browser).await?;

        let cookies = browser.cookies().await?;
        let storage = capture_storage(browser).await;
        Ok(SessionRecord {
            cookies,
            storage,
            metadata: SessionMetadata {
                platform: platform.to_string(),
                saved_at: chrono::Utc::now(),
                assistant_id: None,
                handle: Some(username.to_string()),
            },
        })
    }

    async fn fill<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        chain: &[String],
        text: &str,
        field: &str,
    ) -> Result<(), LoginError> {
        let selector = first_present(browser, chain)
            .await?
            .ok_or_else(|| LoginError::FieldNotFound(field.to_string()))?;
        debug!(field, %selector, "Filling login field");
        browser.type_text(&selector, text).await?;
        Ok(())
    }

    async fn verify<B: Browser + ?Sized>(&self, browser: &mut B) -> Result<(), LoginError> {
        if !self.selectors.logged_in.is_empty() {
            return match first_present(browser, &self.selectors.logged_in).await? {
                Some(_) => Ok(()),
                None => Err(LoginError::NotLoggedIn),
            };
        }
        // No explicit marker configured: the form disappearing is the signal.
        match first_present(browser, &self.selectors.password).await? {
            Some(_) => Err(LoginError::NotLoggedIn),
            None => Ok(()),
        }
    }
}

/// Snapshot localStorage/sessionStorage. Backends without script support
/// degrade to an empty snapshot; cookies alone are usually enough.
async fn capture_storage<B: Browser + ?Sized>(browser: &mut B) -> StorageState {
    const SCRIPT: &str = r#"
        (() => {
            const dump = (s) => {
                const out = {};
                for (let i = 0; i < s.length; i++) {
                    const k = s.key(i);
                    out[k] = s.getItem(k);
                }
                return out;
            };
            return { local: dump(localStorage), session: dump(sessionStorage) };
        })()
    "#;
    match browser.evaluate(SCRIPT).await {
        Ok(value) => serde_json::from_value(value).unwrap_or_default(),
        Err(BrowserError::NotSupported(_)) => StorageState::default(),
        Err(e) => {
            warn!(error = %e, "Could not capture storage, saving cookies only");
            StorageState::default()
        }
    }
}
