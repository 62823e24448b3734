//! Configuration loading and parsing.
//!
//! Reads `ghostline.toml` (or an override path provided by the binary). Every
//! field is optional; a missing or unparsable file yields defaults. Names that
//! do not parse (an unknown accept key or color) fall back to the default for
//! that field and leave an `info` record under the `config` target. Unknown
//! tables and keys are ignored so older binaries tolerate newer files.

use anyhow::Result;
use core_assist::AssistSettings;
use core_events::{KeyCode, KeyEvent, KeyModifiers};
use core_ghost::{AnchorSeed, CaretReassertion, GhostPolicy};
use core_render::{DEFAULT_GHOST_ALPHA, GhostColor, GhostStyle};
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "ghostline.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GhostSection {
    #[serde(default = "GhostSection::default_accept_key")]
    pub accept_key: String,
    #[serde(default = "GhostSection::default_seed")]
    pub seed: String,
    #[serde(default = "GhostSection::default_reassert_delays_ms")]
    pub reassert_delays_ms: Vec<u64>,
    #[serde(default = "GhostSection::default_color")]
    pub color: String,
    #[serde(default = "GhostSection::default_alpha")]
    pub alpha: u8,
    #[serde(default = "GhostSection::default_dim")]
    pub dim: bool,
}

impl Default for GhostSection {
    fn default() -> Self {
        Self {
            accept_key: Self::default_accept_key(),
            seed: Self::default_seed(),
            reassert_delays_ms: Self::default_reassert_delays_ms(),
            color: Self::default_color(),
            alpha: Self::default_alpha(),
            dim: Self::default_dim(),
        }
    }
}

impl GhostSection {
    fn default_accept_key() -> String {
        "tab".into()
    }
    fn default_seed() -> String {
        "model_offset".into()
    }
    fn default_reassert_delays_ms() -> Vec<u64> {
        vec![0, 30]
    }
    fn default_color() -> String {
        GhostColor::default().as_str().into()
    }
    const fn default_alpha() -> u8 {
        DEFAULT_GHOST_ALPHA
    }
    const fn default_dim() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CompletionSection {
    #[serde(default = "CompletionSection::default_context_before")]
    pub context_before: usize,
    #[serde(default = "CompletionSection::default_context_after")]
    pub context_after: usize,
    #[serde(default = "CompletionSection::default_stale_tolerance")]
    pub stale_tolerance: usize,
    #[serde(default)]
    pub latency_ms: u64,
}

impl Default for CompletionSection {
    fn default() -> Self {
        let d = AssistSettings::default();
        Self {
            context_before: d.context_before,
            context_after: d.context_after,
            stale_tolerance: d.stale_tolerance,
            latency_ms: 0,
        }
    }
}

impl CompletionSection {
    fn default_context_before() -> usize {
        AssistSettings::default().context_before
    }
    fn default_context_after() -> usize {
        AssistSettings::default().context_after
    }
    fn default_stale_tolerance() -> usize {
        AssistSettings::default().stale_tolerance
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub ghost: GhostSection,
    #[serde(default)]
    pub completion: CompletionSection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
    /// Where the file was read from, if it was read at all.
    pub source: Option<PathBuf>,
}

/// Local working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("ghostline").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_not_found_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                source: Some(path),
            })
        }
        Err(e) => {
            info!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

/// Parse an accept key name such as `tab`, `right` or `ctrl-e`.
pub fn parse_key(name: &str) -> Option<KeyEvent> {
    let name = name.trim().to_ascii_lowercase();
    let (mods, key) = match name.split_once('-') {
        Some(("ctrl", rest)) if !rest.is_empty() => (KeyModifiers::CTRL, rest),
        Some(("alt", rest)) if !rest.is_empty() => (KeyModifiers::ALT, rest),
        _ => (KeyModifiers::empty(), name.as_str()),
    };
    let code = match key {
        "tab" => KeyCode::Tab,
        "enter" | "return" => KeyCode::Enter,
        "right" => KeyCode::Right,
        "end" => KeyCode::End,
        k => {
            let mut chars = k.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !mods.is_empty() => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(KeyEvent::new(code, mods))
}

fn parse_seed(name: &str) -> Option<AnchorSeed> {
    match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "model_offset" | "model" => Some(AnchorSeed::ModelOffset),
        "caret" => Some(AnchorSeed::Caret),
        _ => None,
    }
}

impl Config {
    /// Engine policy derived from `[ghost]`.
    pub fn ghost_policy(&self) -> GhostPolicy {
        let g = &self.file.ghost;
        let defaults = GhostPolicy::default();
        let accept_key = parse_key(&g.accept_key).unwrap_or_else(|| {
            info!(target: "config", value = g.accept_key.as_str(), "unknown_accept_key_using_default");
            defaults.accept_key
        });
        let seed = parse_seed(&g.seed).unwrap_or_else(|| {
            info!(target: "config", value = g.seed.as_str(), "unknown_seed_using_default");
            defaults.seed
        });
        let color = GhostColor::parse(&g.color).unwrap_or_else(|| {
            info!(target: "config", value = g.color.as_str(), "unknown_color_using_default");
            GhostColor::default()
        });
        GhostPolicy {
            seed,
            reassertion: CaretReassertion::new(
                g.reassert_delays_ms.iter().copied().map(Duration::from_millis),
            ),
            accept_key,
            style: GhostStyle {
                color,
                alpha: g.alpha,
                dim: g.dim,
            },
        }
    }

    /// Completion trigger settings derived from `[completion]`.
    pub fn assist_settings(&self) -> AssistSettings {
        let c = &self.file.completion;
        AssistSettings {
            context_before: c.context_before,
            context_after: c.context_after,
            stale_tolerance: c.stale_tolerance,
            latency: Duration::from_millis(c.latency_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
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

    fn capture<T>(f: impl FnOnce() -> T) -> (T, String) {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        let out = with_default(subscriber, f);
        let log = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        (out, log)
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.source.is_none());
        assert_eq!(cfg.ghost_policy(), GhostPolicy::default());
        assert_eq!(cfg.assist_settings(), AssistSettings::default());
    }

    #[test]
    fn parses_full_file() {
        let tmp = write_config(
            "[ghost]\naccept_key = \"ctrl-e\"\nseed = \"caret\"\nreassert_delays_ms = [50, 0]\n\
             color = \"cyan\"\nalpha = 200\ndim = false\n\
             [completion]\ncontext_before = 100\ncontext_after = 10\nstale_tolerance = 0\nlatency_ms = 250\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.source.as_deref(), Some(tmp.path()));
        let policy = cfg.ghost_policy();
        assert_eq!(
            policy.accept_key,
            KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CTRL)
        );
        assert_eq!(policy.seed, AnchorSeed::Caret);
        assert_eq!(
            policy.reassertion.delays(),
            &[Duration::ZERO, Duration::from_millis(50)]
        );
        assert_eq!(policy.style.color, GhostColor::Cyan);
        assert!(!policy.style.faint());

        let assist = cfg.assist_settings();
        assert_eq!(assist.context_before, 100);
        assert_eq!(assist.context_after, 10);
        assert_eq!(assist.stale_tolerance, 0);
        assert_eq!(assist.latency, Duration::from_millis(250));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = write_config("[ghost]\naccept_key = \"right\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let policy = cfg.ghost_policy();
        assert_eq!(policy.accept_key, KeyEvent::plain(KeyCode::Right));
        assert_eq!(policy.reassertion, CaretReassertion::default());
        assert_eq!(policy.style, GhostStyle::default());
        assert_eq!(cfg.assist_settings(), AssistSettings::default());
    }

    #[test]
    fn empty_delay_list_means_single_immediate() {
        let tmp = write_config("[ghost]\nreassert_delays_ms = []\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.ghost_policy().reassertion.delays(), &[Duration::ZERO]);
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let tmp = write_config("[ghost\naccept_key = ");
        let (cfg, log) = capture(|| load_from(Some(tmp.path().to_path_buf())).unwrap());
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.file, ConfigFile::default());
        assert!(log.contains("config_parse_failed_using_defaults"));
    }

    #[test]
    fn unknown_names_log_under_config_target() {
        let tmp = write_config("[ghost]\naccept_key = \"hyper-q\"\ncolor = \"chartreuse\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let (policy, log) = capture(|| cfg.ghost_policy());
        assert_eq!(policy.accept_key, KeyEvent::plain(KeyCode::Tab));
        assert_eq!(policy.style.color, GhostColor::DarkGrey);
        assert!(log.contains("INFO config:"));
        assert!(log.contains("unknown_accept_key_using_default"));
        assert!(log.contains("unknown_color_using_default"));
    }

    #[test]
    fn key_names() {
        assert_eq!(parse_key("Tab"), Some(KeyEvent::plain(KeyCode::Tab)));
        assert_eq!(parse_key("enter"), Some(KeyEvent::plain(KeyCode::Enter)));
        assert_eq!(
            parse_key("alt-l"),
            Some(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::ALT))
        );
        assert_eq!(parse_key("x"), None);
        assert_eq!(parse_key("ctrl-"), None);
    }
}
