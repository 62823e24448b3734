//! `ghostline`: a small terminal editor demonstrating inline ghost completions.
//!
//! Keys: `Ctrl-Space` requests a completion, the accept key (Tab by default)
//! inserts it, `Esc` dismisses, `Ctrl-F` folds the next line into the caret
//! line, `Ctrl-S` saves, `Ctrl-Q` quits.

mod editor;
mod runtime;

use anyhow::Result;
use clap::Parser;
use core_assist::{StaticProvider, SuggestionProvider};
use core_events::{EVENT_CHANNEL_CAP, Event, EventSourceRegistry, TickEventSource};
use core_model::Layout;
use core_render::normalize_line_breaks;
use core_terminal::{CrosstermBackend, TerminalBackend, TerminalFeatures, TerminalGuard};
use core_text::Buffer;
use editor::Editor;
use runtime::EditorRuntime;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "ghostline.log";
const TICK_INTERVAL: Duration = Duration::from_millis(15);
const DEFAULT_SUGGESTION: &str = "todo!()";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "ghostline", version, about = "Terminal editor with inline ghost completions")]
struct Args {
    /// Optional path to open at startup (UTF-8 text).
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `ghostline.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Text the built-in provider offers as a completion.
    #[arg(long = "suggestion", default_value = DEFAULT_SUGGESTION)]
    pub suggestion: String,
    /// Simulated provider latency; overrides `[completion] latency_ms`.
    #[arg(long = "latency-ms")]
    pub latency_ms: Option<u64>,
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

struct RuntimeContext<'a> {
    editor: Editor,
    provider: Arc<dyn SuggestionProvider>,
    terminal_guard: TerminalGuard<'a>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(TerminalFeatures::default()),
            log_guard: None,
        }
    }

    fn run<'a>(&'a mut self, args: Args) -> Result<RuntimeContext<'a>> {
        self.configure_logging()?;
        Self::install_panic_hook();

        info!(target: "runtime", "startup");
        let config = core_config::load_from(args.config.clone())?;
        let mut settings = config.assist_settings();
        if let Some(ms) = args.latency_ms {
            settings.latency = Duration::from_millis(ms);
        }
        let policy = config.ghost_policy();
        let provider: Arc<dyn SuggestionProvider> =
            Arc::new(StaticProvider::new(args.suggestion.clone()).with_latency(settings.latency));

        let (buffer, open_failed) = load_buffer(args.path.as_deref())?;
        self.backend.set_title("Ghostline")?;
        let (width, height) = self.backend.size().unwrap_or((80, 24));
        let guard = self.backend.enter_guard()?;

        info!(
            target: "runtime.startup",
            buffer = buffer.name.as_str(),
            chars = buffer.len_chars(),
            open_failed,
            config_source = config.source.as_ref().map(|p| p.display().to_string()).as_deref(),
            provider = provider.name(),
            latency_ms = settings.latency.as_millis() as u64,
            "bootstrap_complete"
        );

        let mut editor = Editor::new(
            buffer,
            args.path,
            Layout::for_terminal(width, height),
            policy,
            settings,
        );
        if open_failed {
            editor.flash("open failed");
        }
        Ok(RuntimeContext {
            editor,
            provider,
            terminal_guard: guard,
        })
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Read `path` into a buffer; a missing or unreadable file yields an empty
/// buffer and `open_failed = true` so the editor can still start.
fn load_buffer(path: Option<&Path>) -> Result<(Buffer, bool)> {
    let Some(path) = path else {
        return Ok((Buffer::from_str("untitled", "")?, false));
    };
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    match std::fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!(
                target: "io",
                file = %path.display(),
                size_bytes = content.len(),
                "file_read_ok"
            );
            Ok((Buffer::from_str(name, &normalize_line_breaks(&content))?, false))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(target: "io", file = %path.display(), "new_file");
            Ok((Buffer::from_str(name, "")?, false))
        }
        Err(e) => {
            error!(target: "io", ?e, "file_open_error");
            Ok((Buffer::from_str(name, "")?, true))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    let context = startup.run(args)?;

    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = core_input::spawn_async_input(tx.clone());
    let mut registry = EventSourceRegistry::new();
    registry.register(TickEventSource::new(TICK_INTERVAL));
    let source_handles = registry.spawn_all(&tx);

    let RuntimeContext {
        editor,
        provider,
        terminal_guard,
    } = context;
    let mut runtime = EditorRuntime::new(
        editor,
        provider,
        terminal_guard,
        tx,
        rx,
        input_task,
        input_shutdown,
        source_handles,
    );
    runtime.run().await
}
