//! Wire-ish types shared between the engine, adapters and the CLI.

use crate::content::ContentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A browser cookie, as captured from / restored into a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
}

/// localStorage / sessionStorage snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub local: HashMap<String, String>,
    #[serde(default)]
    pub session: HashMap<String, String>,
}

impl StorageState {
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.session.is_empty()
    }
}

/// The primary action a run performs on each candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Comment,
    Like,
    Post,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Comment => f.write_str("comment"),
            ActionKind::Like => f.write_str("like"),
            ActionKind::Post => f.write_str("post"),
        }
    }
}

/// What to do to one piece of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPayload {
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Structured result of a platform action. Adapters report "nothing to do"
/// here instead of raising an error for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ActionOutcome {
    pub fn performed() -> Self {
        Self {
            success: true,
            skipped: false,
            reason: None,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            skipped: true,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            skipped: false,
            reason: Some(reason.into()),
        }
    }
}

/// Result of the authoritative live "did we already act on this?" check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveStatus {
    NotFound,
    Found { reason: String },
}

/// Why an item was skipped instead of acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum SkipReason {
    InCache,
    Live(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InCache => f.write_str("in-cache"),
            SkipReason::Live(reason) => f.write_str(reason),
        }
    }
}

/// Outcome for a single candidate, kept for the run's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Performed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
        #[serde(default)]
        liked: bool,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub content_id: ContentId,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Final report of one target-seeking run. `attempts` excludes skips; the
/// per-item list always contains every candidate that was pulled off the
/// queue, so partial success is observable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopResult {
    pub successes: usize,
    pub attempts: usize,
    pub target: usize,
    pub items: Vec<ItemResult>,
}

impl LoopResult {
    pub fn met_target(&self) -> bool {
        self.successes >= self.target
    }
}
