//! Terminal input for Ghostline.
//!
//! Crossterm events are translated into [`core_events::InputEvent`]s by
//! [`translate`] and forwarded by a tokio task onto the shared event channel.

mod async_service;
mod translate;

pub use async_service::AsyncInputShutdown;
pub use translate::translate;

use core_events::Event;
use crossterm::event::Event as CEvent;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio_stream::Stream;

/// Spawn the input service backed by `crossterm::EventStream`.
///
/// Returns the `JoinHandle` for the background task alongside a shutdown handle
/// that can be used to request immediate termination.
pub fn spawn_async_input(sender: Sender<Event>) -> (JoinHandle<()>, AsyncInputShutdown) {
    async_service::spawn_terminal_task(sender)
}

/// Same as [`spawn_async_input`] over an arbitrary event stream.
pub fn spawn_input_from_stream<S>(
    sender: Sender<Event>,
    stream: S,
) -> (JoinHandle<()>, AsyncInputShutdown)
where
    S: Stream<Item = std::io::Result<CEvent>> + Send + Unpin + 'static,
{
    async_service::spawn_stream_task(sender, stream)
}

#[cfg(test)]
mod tests {
    use core_events::InputEvent;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Renders every `input` event as `name=value` pairs.
    #[derive(Clone, Default)]
    struct InputLines(Arc<Mutex<Vec<String>>>);

    struct Render<'a>(&'a mut String);

    impl Visit for Render<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.push_str(&format!("{}={:?} ", field.name(), value));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for InputLines {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target() != "input" {
                return;
            }
            let mut line = String::new();
            event.record(&mut Render(&mut line));
            self.0.lock().unwrap().push(line);
        }
    }

    #[test]
    fn paste_log_redacts_content() {
        let lines = InputLines::default();
        let subscriber = tracing_subscriber::registry().with(lines.clone());
        tracing::subscriber::with_default(subscriber, || {
            crate::async_service::log_input(&InputEvent::Paste("secret paste payload 💣".into()));
        });

        let lines = lines.0.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("len=25"), "got {}", lines[0]);
        assert!(!lines[0].contains("secret"), "paste content leaked: {}", lines[0]);
    }
}
