//! View hook bookkeeping.
//!
//! Components that want paint, key or pointer delivery from a view attach an
//! [`Interest`] and receive a [`HookId`]. The registry only tracks who asked
//! for what; routing stays with the host loop, which consults
//! [`HookRegistry::wants`] before forwarding an event. Detaching restores the
//! registry to its prior size so subscription leaks are observable in tests.

use bitflags::bitflags;

bitflags! {
    /// Event classes a hook can ask a view to deliver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Interest: u8 {
        const PAINT = 0b001;
        const KEY = 0b010;
        const POINTER = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(pub u64);

#[derive(Debug, Default)]
pub struct HookRegistry {
    next_id: u64,
    hooks: Vec<(HookId, Interest)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, interest: Interest) -> HookId {
        self.next_id += 1;
        let id = HookId(self.next_id);
        self.hooks.push((id, interest));
        tracing::trace!(target: "view.hooks", id = id.0, interest = interest.bits(), "attach");
        id
    }

    /// Returns `false` when `id` was not attached.
    pub fn detach(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(hid, _)| *hid != id);
        let removed = self.hooks.len() != before;
        tracing::trace!(target: "view.hooks", id = id.0, removed, "detach");
        removed
    }

    /// True when any attached hook intersects `interest`.
    pub fn wants(&self, interest: Interest) -> bool {
        self.hooks.iter().any(|(_, i)| i.intersects(interest))
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
