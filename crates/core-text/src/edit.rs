//! Edit notifications.
//!
//! Every completed buffer mutation is described by an [`EditEvent`] and
//! published to all live subscribers. Subscribers hold an
//! [`EditSubscription`] (the receiving half of an unbounded crossbeam channel)
//! and drain it on their own schedule, which keeps delivery free of callbacks
//! and therefore free of reentrancy: a consumer that mutates the buffer while
//! handling an edit simply finds the new event queued behind the current one.
//!
//! Invariants:
//! * Events are published in mutation order; each subscriber observes the same
//!   sequence.
//! * `unsubscribe` stops delivery immediately. Events already queued on the
//!   dropped subscription are discarded together with it.
//! * Subscriptions whose receiver was dropped without `unsubscribe` are pruned
//!   on the next publish.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

/// A completed mutation in model (char) coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEvent {
    /// Char offset where the replaced range starts.
    pub offset: usize,
    /// Number of chars removed starting at `offset`.
    pub removed: usize,
    /// Text inserted at `offset` after removal.
    pub inserted: String,
}

impl EditEvent {
    pub fn new(offset: usize, removed: usize, inserted: impl Into<String>) -> Self {
        Self {
            offset,
            removed,
            inserted: inserted.into(),
        }
    }

    /// Char length of the inserted text.
    pub fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }

    /// Exclusive end of the removed range.
    pub fn removed_end(&self) -> usize {
        self.offset + self.removed
    }

    /// Signed length change caused by this edit.
    pub fn delta(&self) -> isize {
        self.inserted_len() as isize - self.removed as isize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Receiving end of an edit subscription.
#[derive(Debug)]
pub struct EditSubscription {
    id: SubscriptionId,
    rx: Receiver<EditEvent>,
}

impl EditSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Pop the next queued edit, if any.
    pub fn next_edit(&self) -> Option<EditEvent> {
        match self.rx.try_recv() {
            Ok(ev) => Some(ev),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain every queued edit in publish order.
    pub fn drain(&self) -> Vec<EditEvent> {
        self.rx.try_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Fan-out publisher owned by a buffer.
#[derive(Debug, Default)]
pub struct EditBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<EditEvent>)>,
}

impl EditBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> EditSubscription {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let (tx, rx) = unbounded();
        self.subscribers.push((id, tx));
        tracing::trace!(target: "text.edit", id = id.0, "subscribe");
        EditSubscription { id, rx }
    }

    /// Remove a subscription. Returns `false` when the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        let removed = self.subscribers.len() != before;
        tracing::trace!(target: "text.edit", id = id.0, removed, "unsubscribe");
        removed
    }

    pub fn publish(&mut self, event: &EditEvent) {
        self.subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
