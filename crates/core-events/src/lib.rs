//! Core event types and channel helpers for Ghostline.
//!
//! All events converge on one bounded tokio channel consumed by the thread
//! that owns the buffer and the view. Producers running elsewhere (input
//! task, tick timer, completion workers) only ever send; they never touch
//! editor state directly.

use std::fmt;
use std::sync::atomic::AtomicU64;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// Bounded mpsc sized by `EVENT_CHANNEL_CAP`. Producers await `send` and therefore observe
// backpressure instead of dropping events. Completion workers post at most one message per
// request so the bound is never a concern for them.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 8192;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters; inspected by tests and logged at shutdown.
// -------------------------------------------------------------------------------------------------
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static KEYPRESS_TOTAL: AtomicU64 = AtomicU64::new(0);
pub static SUGGESTIONS_POSTED: AtomicU64 = AtomicU64::new(0);
pub static SUGGESTIONS_DROPPED_STALE: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the central event loop.
#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    /// Result of an asynchronous completion request, posted by a worker.
    Suggestion(SuggestionEvent),
    RenderRequested,
    /// Periodic monotonic tick used to drive deferred work (caret reassertion)
    /// without busy polling.
    Tick,
    Shutdown,
}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------

/// Trait implemented by any async event producer. Implementors usually hold configuration and
/// spawn one background task that pushes `Event`s into the shared channel.
pub trait AsyncEventSource: Send + 'static {
    /// Human-readable stable identifier (used for logging / diagnostics).
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task, returning a JoinHandle. Implementors should
    /// stop when `tx.send(..).await` returns Err (channel closed) or on their own internal stop
    /// condition.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources spawned together at startup.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources, returning their JoinHandles. Each source receives its own
    /// clone of `tx`. During shutdown the caller drops its final `Sender` before awaiting the
    /// handles so sources observe the closed channel and exit cooperatively.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        // Draining prevents duplicate spawns if called twice.
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

/// Built-in monotonic tick source. Emits `Event::Tick` every configured interval.
pub struct TickEventSource {
    interval: std::time::Duration,
}

impl TickEventSource {
    pub fn new(interval: std::time::Duration) -> Self {
        Self { interval }
    }
}

impl AsyncEventSource for TickEventSource {
    fn name(&self) -> &'static str {
        "tick"
    }
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let dur = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(dur);
            loop {
                interval.tick().await;
                if tx.send(Event::Tick).await.is_err() {
                    break;
                }
            }
        })
    }
}

// -------------------------------------------------------------------------------------------------
// Suggestions
// -------------------------------------------------------------------------------------------------

/// Monotonic identifier of a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

/// Outcome of a completion request, handed back to the owning thread.
///
/// `trigger_offset` is the model offset captured when the request was made;
/// the receiver decides (staleness gate) whether the suggestion is still
/// worth showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionEvent {
    Ready {
        id: RequestId,
        trigger_offset: usize,
        text: String,
    },
    /// Provider returned nothing usable.
    Empty { id: RequestId },
    Failed { id: RequestId, reason: String },
    Cancelled { id: RequestId },
}

impl SuggestionEvent {
    pub fn id(&self) -> RequestId {
        match self {
            SuggestionEvent::Ready { id, .. }
            | SuggestionEvent::Empty { id }
            | SuggestionEvent::Failed { id, .. }
            | SuggestionEvent::Cancelled { id } => *id,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Input
// -------------------------------------------------------------------------------------------------

/// Normalized input events.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    /// Synthetic interrupt (Ctrl-C) surfaced distinctly.
    CtrlC,
    /// Mouse event (position + kind + modifiers).
    Mouse(MouseEvent),
    /// Pasted text, already joined into one chunk.
    Paste(String),
    FocusGained,
    FocusLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }
}

/// KeyCode enumerates normalized logical key representations consumed by higher layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl KeyCode {
    /// Keys that relocate the caret without editing.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            KeyCode::Up
                | KeyCode::Down
                | KeyCode::Left
                | KeyCode::Right
                | KeyCode::Home
                | KeyCode::End
                | KeyCode::PageUp
                | KeyCode::PageDown
        )
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.code, self.mods)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub column: u16,
    pub row: u16,
    pub mods: KeyModifiers,
}

impl MouseEvent {
    pub fn is_press(&self) -> bool {
        matches!(self.kind, MouseEventKind::Down(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    ScrollUp,
    ScrollDown,
    Moved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}


#[cfg(test)]
mod tests_async_sources {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Posts one finished suggestion, the way a completion worker would.
    struct OneShotSuggestion(RequestId);

    impl AsyncEventSource for OneShotSuggestion {
        fn name(&self) -> &'static str {
            "one_shot_suggestion"
        }
        fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            let id = self.0;
            tokio::spawn(async move {
                let _ = tx.send(Event::Suggestion(SuggestionEvent::Empty { id })).await;
            })
        }
    }

    #[tokio::test]
    async fn registry_spawns_every_source_once() {
        let (tx, mut rx) = mpsc::channel::<Event>(8);
        let mut reg = EventSourceRegistry::new();
        reg.register(OneShotSuggestion(RequestId(3)));
        reg.register(TickEventSource::new(Duration::from_millis(5)));
        assert_eq!(reg.len(), 2);

        let handles = reg.spawn_all(&tx);
        assert!(reg.is_empty());
        assert!(reg.spawn_all(&tx).is_empty(), "second spawn is a no-op");

        let (mut suggestion, mut ticks) = (None, 0);
        let deadline = tokio::time::Instant::now() + Duration::from_millis(500);
        while (suggestion.is_none() || ticks < 2) && tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(20), rx.recv()).await {
                Ok(Some(Event::Suggestion(s))) => suggestion = Some(s.id()),
                Ok(Some(Event::Tick)) => ticks += 1,
                _ => {}
            }
        }
        assert_eq!(suggestion, Some(RequestId(3)));
        assert!(ticks >= 2, "tick source keeps emitting");

        drop(rx);
        for handle in handles {
            let joined = tokio::time::timeout(Duration::from_millis(100), handle).await;
            assert!(joined.is_ok(), "sources stop once the receiver is gone");
        }
    }
}
