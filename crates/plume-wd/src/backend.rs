use async_trait::async_trait;
use fantoccini::cookies::Cookie as WdCookie;
use fantoccini::{Client, ClientBuilder, Locator};
use plume_core::browser::{Browser, BrowserError, ElementHandle, NavigationResult};
use plume_core::protocol::Cookie;
use std::collections::HashMap;
use tracing::{info, warn};

pub struct WebDriverBrowser {
    client: Option<Client>,
    webdriver_url: String,
    capabilities: Option<serde_json::Map<String, serde_json::Value>>,
}

impl WebDriverBrowser {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            client: None,
            webdriver_url: webdriver_url.into(),
            capabilities: None,
        }
    }

    pub fn with_capabilities(
        webdriver_url: impl Into<String>,
        capabilities: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            client: None,
            webdriver_url: webdriver_url.into(),
            capabilities: Some(capabilities),
        }
    }

    fn client(&self) -> Result<&Client, BrowserError> {
        self.client.as_ref().ok_or(BrowserError::NotReady)
    }

    fn to_wire(cookie: &WdCookie<'static>) -> Cookie {
        Cookie {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            domain: cookie.domain().map(String::from),
            path: cookie.path().map(String::from),
            expires: cookie
                .expires()
                .and_then(|e| e.datetime())
                .map(|dt| dt.unix_timestamp() as f64),
            http_only: cookie.http_only(),
            secure: cookie.secure(),
        }
    }

    fn from_wire(cookie: &Cookie) -> WdCookie<'static> {
        let mut out = WdCookie::new(cookie.name.clone(), cookie.value.clone());
        if let Some(domain) = &cookie.domain {
            out.set_domain(domain.clone());
        }
        if let Some(path) = &cookie.path {
            out.set_path(path.clone());
        }
        if let Some(secure) = cookie.secure {
            out.set_secure(secure);
        }
        if let Some(http_only) = cookie.http_only {
            out.set_http_only(http_only);
        }
        // Expiry is not restored; restored cookies live for the session.
        out
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn launch(&mut self) -> Result<(), BrowserError> {
        info!(url = %self.webdriver_url, "Connecting to WebDriver");
        let mut builder = ClientBuilder::native();
        if let Some(caps) = &self.capabilities {
            builder.capabilities(caps.clone());
        }
        let client = builder
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| BrowserError::Other(format!("WebDriver connect failed: {e}")))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BrowserError::Other(format!("Failed to close session: {e}")))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BrowserError> {
        let client = self.client()?;
        client
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;
        let title = client.title().await.unwrap_or_default();
        let url = client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        Ok(NavigationResult { url, title })
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        let client = self.client()?;
        client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| BrowserError::Other(e.to_string()))
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, BrowserError> {
        let client = self.client()?;
        let elements = client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;

        let mut handles = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element.text().await.unwrap_or_default();
            let mut attributes = HashMap::new();
            // href is the one attribute the engine keys on; fetching the
            // full attribute map would cost a script round-trip per element.
            match element.attr("href").await {
                Ok(Some(href)) => {
                    attributes.insert("href".to_string(), href);
                }
                Ok(None) => {}
                Err(e) => warn!(selector, error = %e, "Failed to read href"),
            }
            handles.push(ElementHandle { text, attributes });
        }
        Ok(handles)
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), BrowserError> {
        let client = self.client()?;
        let element = client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        element
            .send_keys(text)
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        let client = self.client()?;
        let element = client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let client = self.client()?;
        client
            .execute(&format!("return {script};"), vec![])
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn scroll_by(&mut self, delta_y: i64) -> Result<(), BrowserError> {
        let client = self.client()?;
        client
            .execute(
                "window.scrollBy(0, arguments[0]);",
                vec![serde_json::json!(delta_y)],
            )
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(())
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>, BrowserError> {
        let client = self.client()?;
        let cookies = client
            .get_all_cookies()
            .await
            .map_err(|e| BrowserError::Other(e.to_string()))?;
        Ok(cookies.iter().map(Self::to_wire).collect())
    }

    async fn set_cookies(&mut self, cookies: Vec<Cookie>) -> Result<(), BrowserError> {
        let client = self.client()?;
        for cookie in &cookies {
            if let Err(e) = client.add_cookie(Self::from_wire(cookie)).await {
                // Cookies scoped to other domains are rejected until the
                // matching origin is loaded; skip rather than fail the lot.
                warn!(name = %cookie.name, error = %e, "Could not restore cookie");
            }
        }
        Ok(())
    }
}
