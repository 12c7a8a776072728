use async_trait::async_trait;
use plume_core::browser::{Browser, BrowserError, ElementHandle, NavigationResult};
use plume_core::protocol::{ActionKind, ActionPayload, LiveStatus};
use plume_core::{ContentAdapter, ContentId, SearchCriteria};
use plume_engine::config::{PlatformConfig, SelectorPack};
use plume_engine::web::SelectorAdapter;
use std::collections::HashMap;

fn link(href: &str) -> ElementHandle {
    ElementHandle {
        text: String::new(),
        attributes: [("href".to_string(), href.to_string())].into(),
    }
}

fn text_el(text: &str) -> ElementHandle {
    ElementHandle {
        text: text.to_string(),
        attributes: HashMap::new(),
    }
}

struct MockBrowser {
    elements: HashMap<String, Vec<ElementHandle>>,
    navigated: Vec<String>,
    typed: Vec<(String, String)>,
    clicked: Vec<String>,
    scrolled: Vec<i64>,
}

impl MockBrowser {
    fn new() -> Self {
        Self {
            elements: HashMap::new(),
            navigated: Vec::new(),
            typed: Vec::new(),
            clicked: Vec::new(),
            scrolled: Vec::new(),
        }
    }
}

#[async_trait]
impl Browser for MockBrowser {
    async fn launch(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BrowserError> {
        self.navigated.push(url.to_string());
        Ok(NavigationResult {
            url: url.to_string(),
            title: String::new(),
        })
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(self.navigated.last().cloned().unwrap_or_default())
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, BrowserError> {
        Ok(self.elements.get(selector).cloned().unwrap_or_default())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), BrowserError> {
        self.typed.push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        self.clicked.push(selector.to_string());
        Ok(())
    }

    async fn scroll_by(&mut self, delta_y: i64) -> Result<(), BrowserError> {
        self.scrolled.push(delta_y);
        Ok(())
    }
}

fn platform_config() -> PlatformConfig {
    PlatformConfig {
        base_url: "https://example.test".to_string(),
        search_url: "https://example.test/search?q={query}".to_string(),
        login: Default::default(),
        selectors: SelectorPack {
            post_links: vec!["a.post".to_string()],
            content: vec!["article".to_string()],
            comment_box: vec!["textarea".to_string()],
            comment_submit: vec!["button.reply".to_string()],
            reply_authors: vec!["span.author".to_string()],
            like_button: vec!["button.like".to_string()],
            scroll_step: 800,
        },
    }
}

#[tokio::test]
async fn discover_canonicalizes_hrefs_against_base() {
    let mut browser = MockBrowser::new();
    browser.elements.insert(
        "a.post".to_string(),
        vec![
            link("/p/1?utm_source=search"),
            link("https://example.test/p/2#replies"),
        ],
    );

    let config = platform_config();
    let mut adapter = SelectorAdapter::new(&mut browser, "testnet", &config).unwrap();
    let ids = adapter
        .discover_page(&SearchCriteria::hashtag("cats"))
        .await
        .unwrap();

    assert_eq!(
        ids,
        vec![
            ContentId::from_canonical("https://example.test/p/1"),
            ContentId::from_canonical("https://example.test/p/2"),
        ]
    );
    assert_eq!(
        browser.navigated,
        vec!["https://example.test/search?q=%23cats".to_string()]
    );
}

#[tokio::test]
async fn already_acted_scans_reply_authors() {
    let mut browser = MockBrowser::new();
    browser.elements.insert(
        "span.author".to_string(),
        vec![text_el("@Bob"), text_el("@Alice")],
    );

    let config = platform_config();
    let mut adapter = SelectorAdapter::new(&mut browser, "testnet", &config).unwrap();
    let id = ContentId::from_canonical("https://example.test/p/1");

    let status = adapter.already_acted(&id, "alice").await.unwrap();
    assert_eq!(
        status,
        LiveStatus::Found {
            reason: "found-in-replies".to_string()
        }
    );

    let status = adapter.already_acted(&id, "carol").await.unwrap();
    assert_eq!(status, LiveStatus::NotFound);
}

#[tokio::test]
async fn comment_types_and_submits() {
    let mut browser = MockBrowser::new();
    browser
        .elements
        .insert("textarea".to_string(), vec![text_el("")]);
    browser
        .elements
        .insert("button.reply".to_string(), vec![text_el("Reply")]);

    let config = platform_config();
    let mut adapter = SelectorAdapter::new(&mut browser, "testnet", &config).unwrap();
    let id = ContentId::from_canonical("https://example.test/p/1");

    let outcome = adapter
        .perform_action(
            &id,
            &ActionPayload {
                kind: ActionKind::Comment,
                text: Some("nice".to_string()),
            },
        )
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(
        browser.typed,
        vec![("textarea".to_string(), "nice".to_string())]
    );
    assert_eq!(browser.clicked, vec!["button.reply".to_string()]);
}

#[tokio::test]
async fn comment_without_text_is_an_error() {
    let mut browser = MockBrowser::new();
    let config = platform_config();
    let mut adapter = SelectorAdapter::new(&mut browser, "testnet", &config).unwrap();
    let id = ContentId::from_canonical("https://example.test/p/1");

    let result = adapter
        .perform_action(
            &id,
            &ActionPayload {
                kind: ActionKind::Comment,
                text: None,
            },
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn reveal_more_scrolls() {
    let mut browser = MockBrowser::new();
    let config = platform_config();
    let mut adapter = SelectorAdapter::new(&mut browser, "testnet", &config).unwrap();

    adapter.reveal_more().await.unwrap();
    assert_eq!(browser.scrolled, vec![800]);
}
