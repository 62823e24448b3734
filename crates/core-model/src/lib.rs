//! View-side model: coordinate spaces, position mapping, folds and the
//! terminal text view.
//!
//! The document (model space) and what the user sees (view space) differ
//! whenever regions are folded. Everything that stores a position across
//! edits stores it in model space; view offsets are derived on demand through
//! a [`PositionMapper`] and may be unresolved.
//!
//! Invariants:
//! * Model and view offsets are distinct types; converting between them
//!   always goes through a mapper.
//! * A [`View`] never mutates the document.
//! * Hook registrations are counted so that a component detaching everything
//!   it attached leaves [`View::wants`] unchanged.

pub mod coords;
pub mod fold;
pub mod hooks;
mod layout;
pub mod mapper;
pub mod text_view;
pub mod view;

pub use coords::{ModelOffset, ViewOffset};
pub use fold::FoldMap;
pub use hooks::{HookId, HookRegistry, Interest};
pub use layout::{Layout, LayoutRegion};
pub use mapper::{IdentityMapper, PositionMapper};
pub use text_view::{CaretMotion, TextView, VisibleLine, compute_scroll_intent};
pub use view::{Point, View, ViewError};
