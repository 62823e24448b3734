//! Engine policy knobs.

use core_events::{KeyCode, KeyEvent};
use core_render::GhostStyle;
use std::time::Duration;

/// How the view offset of a new anchor is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorSeed {
    /// Map the requested model offset; fall back to the caret.
    #[default]
    ModelOffset,
    /// Use the caret; fall back to mapping the model offset.
    Caret,
}

/// When the caret is re-applied after a commit.
///
/// The first placement happens synchronously inside the commit. Hosts usually
/// rebuild their view projection only after the edit notification has been
/// processed, so the mapping used at that moment can be stale; each delay
/// queues another placement that [`crate::GhostEngine::poll_deferred`] performs
/// once it is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretReassertion {
    delays: Vec<Duration>,
}

impl Default for CaretReassertion {
    fn default() -> Self {
        Self::new([Duration::ZERO, Duration::from_millis(30)])
    }
}

impl CaretReassertion {
    /// An empty delay list means a single immediate reassertion.
    pub fn new(delays: impl IntoIterator<Item = Duration>) -> Self {
        let mut delays: Vec<Duration> = delays.into_iter().collect();
        if delays.is_empty() {
            delays.push(Duration::ZERO);
        }
        delays.sort();
        Self { delays }
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GhostPolicy {
    pub seed: AnchorSeed,
    pub reassertion: CaretReassertion,
    /// Key that commits the suggestion. Compared including modifiers.
    pub accept_key: KeyEvent,
    pub style: GhostStyle,
}

impl Default for GhostPolicy {
    fn default() -> Self {
        Self {
            seed: AnchorSeed::default(),
            reassertion: CaretReassertion::default(),
            accept_key: KeyEvent::plain(KeyCode::Tab),
            style: GhostStyle::default(),
        }
    }
}
