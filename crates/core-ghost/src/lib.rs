//! Ghost completion overlay engine.
//!
//! A [`GhostEngine`] owns at most one pending suggestion and shows it as
//! faint "ghost text" at an anchor in the document, without inserting it.
//! The document can keep changing underneath: every edit is reconciled
//! against the anchor, shifting it when text changes before it and dropping
//! the session when text at the anchor itself is removed.
//!
//! States: `Idle` and `Active(Session)`. Every entry point first drains the
//! edits queued on the session's subscription, so the anchor is current
//! before a key, pointer, paint or tick is acted on.
//!
//! Invariants:
//! * At most one session per engine. A new `show` tears the old one down
//!   completely before creating the next.
//! * Leaving `Active` always releases the edit subscription and the view
//!   hook the session created; counts return to their prior values.
//! * While active, `0 <= anchor.model <= buffer.len()`.
//! * Only a commit writes to the document, and it inserts exactly once,
//!   after the session has been torn down so the insertion is never
//!   reconciled against it.
//! * Mapping failures degrade to fallbacks (or a skipped frame); they never
//!   cancel a session or surface as errors.
//!
//! Collaborators are passed per call through [`Host`], so the engine holds
//! no references into the host and the host remains free to mutate its
//! buffer and view between calls.

mod engine;
mod observer;
mod policy;
mod reconcile;
mod session;

pub use engine::{GhostEngine, Host, KeyDisposition};
pub use observer::{CancelReason, CommitOutcome, GhostObserver, TracingObserver};
pub use policy::{AnchorSeed, CaretReassertion, GhostPolicy};
pub use reconcile::{Reconciliation, reconcile};
pub use session::{Anchor, SessionId, SessionInfo, Suggestion};
