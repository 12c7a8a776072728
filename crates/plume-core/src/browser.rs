use crate::protocol::Cookie;
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Browser not ready")]
    NotReady,
    #[error("Navigation error: {0}")]
    Navigation(String),
    #[error("Script error: {0}")]
    Script(String),
    #[error("Interaction error: {0}")]
    Interaction(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// A DOM element as seen through the capability boundary. Adapters get the
/// element's text and attributes, never a live handle; every interaction
/// goes back through a selector.
#[derive(Debug, Clone, Default)]
pub struct ElementHandle {
    pub text: String,
    pub attributes: HashMap<String, String>,
}

impl ElementHandle {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// The browser capability every platform adapter drives.
///
/// The engine never hardcodes which selectors work for which platform; it
/// only assumes these primitives. Optional methods default to
/// `NotSupported` so thin backends still compile.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Launch or connect the backing browser.
    async fn launch(&mut self) -> Result<(), BrowserError>;

    /// Close the backing browser and release its resources.
    async fn close(&mut self) -> Result<(), BrowserError>;

    /// Whether the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BrowserError>;

    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// All elements matching a CSS selector, possibly empty.
    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, BrowserError>;

    /// Type text into the first element matching the selector.
    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), BrowserError>;

    /// Click the first element matching the selector.
    async fn click(&mut self, selector: &str) -> Result<(), BrowserError>;

    async fn evaluate(&mut self, _script: &str) -> Result<serde_json::Value, BrowserError> {
        Err(BrowserError::NotSupported("evaluate".into()))
    }

    async fn scroll_by(&mut self, _delta_y: i64) -> Result<(), BrowserError> {
        Err(BrowserError::NotSupported("scroll_by".into()))
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>, BrowserError> {
        Err(BrowserError::NotSupported("cookies".into()))
    }

    async fn set_cookies(&mut self, _cookies: Vec<Cookie>) -> Result<(), BrowserError> {
        Err(BrowserError::NotSupported("set_cookies".into()))
    }
}
