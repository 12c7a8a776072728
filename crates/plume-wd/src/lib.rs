//! `Browser` backend over a W3C WebDriver endpoint (chromedriver,
//! geckodriver, selenium) via fantoccini.

pub mod backend;

pub use backend::WebDriverBrowser;
