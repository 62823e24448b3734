//! Suggestion providers.
//!
//! A provider turns a [`CompletionRequest`] into suggestion text. It runs on
//! a blocking worker thread and may take arbitrarily long; it should poll the
//! [`CancelToken`] and bail out with [`ProviderError::Cancelled`] once set.

use crate::cancel::CancelToken;
use crate::request::CompletionRequest;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("request cancelled")]
    Cancelled,
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),
}

pub trait SuggestionProvider: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// `Ok(None)` means the provider had nothing to offer.
    fn suggest(
        &self,
        request: &CompletionRequest,
        cancel: &CancelToken,
    ) -> Result<Option<String>, ProviderError>;
}

const CANCEL_POLL: Duration = Duration::from_millis(5);

/// Provider returning fixed text after an optional simulated latency.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    text: String,
    latency: Duration,
}

impl StaticProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl SuggestionProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn suggest(
        &self,
        _request: &CompletionRequest,
        cancel: &CancelToken,
    ) -> Result<Option<String>, ProviderError> {
        let deadline = Instant::now() + self.latency;
        loop {
            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(CANCEL_POLL.min(deadline - now));
        }
        Ok((!self.text.is_empty()).then(|| self.text.clone()))
    }
}
