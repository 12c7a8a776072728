use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ContentIdError {
    #[error("Unparsable content URL: {0}")]
    Unparsable(String),
    #[error("Relative URL with no base: {0}")]
    NoBase(String),
}

/// Canonical reference to one piece of remote content (post, tweet, thread).
///
/// Canonicalization is deterministic: the same content reached through any
/// raw URL variant (tracking query strings, fragments, relative links on a
/// listing page) maps to the same id. Cache lookups and de-duplication key
/// on this form, never on the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Canonicalize a raw URL, resolving it against `base` when relative.
    ///
    /// Query string and fragment are stripped, the host is lowercased by the
    /// URL parser, and a trailing slash on the path is trimmed.
    pub fn canonicalize(raw: &str, base: Option<&Url>) -> Result<Self, ContentIdError> {
        let mut url = match Url::parse(raw) {
            Ok(u) => u,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = base.ok_or_else(|| ContentIdError::NoBase(raw.to_string()))?;
                base.join(raw)
                    .map_err(|_| ContentIdError::Unparsable(raw.to_string()))?
            }
            Err(_) => return Err(ContentIdError::Unparsable(raw.to_string())),
        };

        url.set_query(None);
        url.set_fragment(None);

        let mut s = url.to_string();
        if url.path() != "/" {
            while s.ends_with('/') {
                s.pop();
            }
        }

        Ok(Self(s))
    }

    /// Wrap an identifier that is already canonical (e.g. read back from the
    /// cache file). No validation is performed.
    pub fn from_canonical(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_query_and_fragment() {
        let a = ContentId::canonicalize("https://example.com/p/123?utm_source=x#reply", None)
            .unwrap();
        let b = ContentId::canonicalize("https://example.com/p/123", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn resolves_relative_against_base() {
        let base = Url::parse("https://example.com/search").unwrap();
        let a = ContentId::canonicalize("/p/123", Some(&base)).unwrap();
        let b = ContentId::canonicalize("https://example.com/p/123", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn relative_without_base_is_an_error() {
        assert!(ContentId::canonicalize("/p/123", None).is_err());
    }

    #[test]
    fn trims_trailing_slash() {
        let a = ContentId::canonicalize("https://example.com/p/123/", None).unwrap();
        let b = ContentId::canonicalize("https://example.com/p/123", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn lowercases_host() {
        let a = ContentId::canonicalize("https://Example.COM/p/123", None).unwrap();
        let b = ContentId::canonicalize("https://example.com/p/123", None).unwrap();
        assert_eq!(a, b);
    }
}
