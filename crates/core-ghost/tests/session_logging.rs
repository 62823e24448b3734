mod common;

use common::Fixture;
use core_ghost::{GhostEngine, GhostPolicy};
use core_model::ModelOffset;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

fn capture(f: impl FnOnce()) -> String {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter { inner: buf.clone() })
        .finish();
    with_default(subscriber, f);
    let out = buf.lock().unwrap().clone();
    String::from_utf8(out).unwrap()
}

#[test]
fn lifecycle_is_logged_without_payload() {
    let secret = "hunter2-secret-completion";
    let mut fx = Fixture::new("let x = ");
    let logs = capture(|| {
        let mut engine = GhostEngine::new(GhostPolicy::default());
        engine
            .show(&mut fx.host(), ModelOffset(8), Some(secret))
            .unwrap();
        fx.edit(&mut engine, 0, 0, "  ");
        engine.accept(&mut fx.host()).unwrap();
    });
    assert!(logs.contains("ghost.session"));
    assert!(logs.contains("shown"));
    assert!(logs.contains("shifted"));
    assert!(logs.contains("reason=\"commit\""));
    assert!(logs.contains("ghost.commit"));
    assert!(logs.contains("committed"));
    assert!(!logs.contains(secret));
}
