use async_trait::async_trait;
use plume_core::browser::{Browser, BrowserError, ElementHandle, NavigationResult};
use plume_core::protocol::Cookie;
use plume_engine::login::{LoginError, LoginFlow, LoginSelectors};
use std::collections::HashSet;

/// Browser with a scripted DOM: a set of selectors that currently match,
/// some of which disappear after submit is clicked.
struct MockBrowser {
    present: HashSet<String>,
    removed_after_click: Vec<String>,
    typed: Vec<(String, String)>,
    clicked: Vec<String>,
    navigated: Vec<String>,
    cookies: Vec<Cookie>,
}

impl MockBrowser {
    fn new(present: &[&str]) -> Self {
        Self {
            present: present.iter().map(|s| s.to_string()).collect(),
            removed_after_click: Vec::new(),
            typed: Vec::new(),
            clicked: Vec::new(),
            navigated: Vec::new(),
            cookies: vec![Cookie {
                name: "sid".to_string(),
                value: "abc".to_string(),
                domain: None,
                path: None,
                expires: None,
                http_only: None,
                secure: None,
            }],
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
            title: "login".to_string(),
        })
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(self.navigated.last().cloned().unwrap_or_default())
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, BrowserError> {
        if self.present.contains(selector) {
            Ok(vec![ElementHandle::default()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), BrowserError> {
        self.typed.push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        self.clicked.push(selector.to_string());
        for sel in self.removed_after_click.drain(..) {
            self.present.remove(&sel);
        }
        Ok(())
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>, BrowserError> {
        Ok(self.cookies.clone())
    }
}

fn flow() -> LoginFlow {
    let mut flow = LoginFlow::new("https://example.com/login", LoginSelectors::default());
    flow.settle_ms = 0;
    flow
}

#[tokio::test]
async fn falls_back_through_the_selector_chain() {
    // Only the second username selector matches.
    let mut browser = MockBrowser::new(&[
        "input[name*='user']",
        "input[type='password']",
        "button[type='submit']",
    ]);
    browser.removed_after_click = vec!["input[type='password']".to_string()];

    let record = flow()
        .run(&mut browser, "testnet", "alice", "hunter2")
        .await
        .unwrap();

    assert_eq!(
        browser.typed,
        vec![
            ("input[name*='user']".to_string(), "alice".to_string()),
            ("input[type='password']".to_string(), "hunter2".to_string()),
        ]
    );
    assert_eq!(browser.clicked, vec!["button[type='submit']".to_string()]);
    assert_eq!(record.cookies.len(), 1);
    assert_eq!(record.metadata.handle.as_deref(), Some("alice"));
    // No evaluate support on this backend: storage degrades to empty.
    assert!(record.storage.is_empty());
}

#[tokio::test]
async fn still_visible_form_means_not_logged_in() {
    // Password field survives the submit click.
    let mut browser = MockBrowser::new(&[
        "input[type='email']",
        "input[type='password']",
        "button[type='submit']",
    ]);

    let err = flow()
        .run(&mut browser, "testnet", "alice", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::NotLoggedIn));
}

#[tokio::test]
async fn missing_username_field_is_reported() {
    let mut browser = MockBrowser::new(&["input[type='password']", "button[type='submit']"]);

    let err = flow()
        .run(&mut browser, "testnet", "alice", "hunter2")
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::FieldNotFound(f) if f == "username"));
}

#[tokio::test]
async fn logged_in_marker_takes_precedence() {
    let mut browser = MockBrowser::new(&[
        "input[type='email']",
        "input[type='password']",
        "button[type='submit']",
        "[data-testid='account-menu']",
    ]);

    let mut flow = flow();
    flow.selectors.logged_in = vec!["[data-testid='account-menu']".to_string()];

    // Password field still present, but the marker says we are in.
    let record = flow
        .run(&mut browser, "testnet", "alice", "hunter2")
        .await
        .unwrap();
    assert_eq!(record.metadata.platform, "testnet");
}
