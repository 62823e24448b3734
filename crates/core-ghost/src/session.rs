//! Session data: what is shown, where, and which subscriptions back it.

use core_model::{HookId, ModelOffset, ViewOffset};
use core_text::EditSubscription;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ghost#{}", self.0)
    }
}

/// Suggestion text. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion(String);

impl Suggestion {
    /// `None` for empty or whitespace-only text.
    pub fn new(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in chars, the unit buffer offsets use.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Lines as painted (`\r\n` and `\r` count as one break).
    pub fn line_count(&self) -> usize {
        let breaks = self.0.matches("\r\n").count();
        self.0.matches(['\n', '\r']).count() - breaks + 1
    }
}

/// Insertion point in both coordinate spaces. `model` is authoritative;
/// `view` is only used for painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub model: ModelOffset,
    pub view: ViewOffset,
}

/// Snapshot of the active session for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub anchor: Anchor,
    pub text: String,
}

#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) id: SessionId,
    pub(crate) anchor: Anchor,
    pub(crate) suggestion: Suggestion,
    pub(crate) edits: EditSubscription,
    pub(crate) hook: HookId,
}

impl Session {
    pub(crate) fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            anchor: self.anchor,
            text: self.suggestion.as_str().to_owned(),
        }
    }
}
