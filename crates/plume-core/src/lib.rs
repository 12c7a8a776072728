pub mod adapter;
pub mod browser;
pub mod content;
pub mod criteria;
pub mod protocol;

pub use adapter::{AdapterError, ContentAdapter};
pub use browser::{Browser, BrowserError};
pub use content::ContentId;
pub use criteria::{CriteriaError, SearchCriteria};
