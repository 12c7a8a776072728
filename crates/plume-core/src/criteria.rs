use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CriteriaError {
    #[error("Invalid criteria: exactly one of hashtag or keywords must be set")]
    InvalidCriteria,
}

/// What to search the content source for.
///
/// Exactly one of `hashtag`/`keywords` must be present; `source` optionally
/// narrows where to look (a platform-specific feed or section).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SearchCriteria {
    pub fn hashtag(tag: impl Into<String>) -> Self {
        Self {
            hashtag: Some(tag.into()),
            ..Default::default()
        }
    }

    pub fn keywords(words: impl Into<String>) -> Self {
        Self {
            keywords: Some(words.into()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        match (&self.hashtag, &self.keywords) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(CriteriaError::InvalidCriteria),
        }
    }

    /// The text to feed into the platform's search box / search URL.
    /// Hashtags are normalized to carry their leading `#`.
    pub fn query_text(&self) -> Result<String, CriteriaError> {
        self.validate()?;
        if let Some(tag) = &self.hashtag {
            let tag = tag.trim();
            return Ok(if tag.starts_with('#') {
                tag.to_string()
            } else {
                format!("#{tag}")
            });
        }
        // validate() guarantees keywords is set here
        Ok(self.keywords.clone().unwrap_or_default())
    }
}
