//! Completion trigger plumbing.
//!
//! Flow: the owning loop calls [`CompletionTrigger::begin`] at the caret,
//! which captures a [`ContextWindow`] and cancels any request still running.
//! [`CompletionWorker::spawn`] runs the [`SuggestionProvider`] off-thread and
//! posts exactly one `Event::Suggestion` back. On receipt the loop checks
//! [`CompletionTrigger::complete`] (is this still the newest request?) and
//! the [`StalenessGate`] (has the caret wandered off?) before showing it.
//!
//! How suggestion text is produced (network calls, prompt construction,
//! response parsing) is the provider's business and out of scope here.

mod cancel;
mod context;
mod provider;
mod request;
mod trigger;
mod worker;

pub use cancel::CancelToken;
pub use context::{ContextWindow, DEFAULT_CONTEXT_AFTER, DEFAULT_CONTEXT_BEFORE};
pub use provider::{ProviderError, StaticProvider, SuggestionProvider};
pub use request::CompletionRequest;
pub use trigger::{AssistSettings, CompletionTrigger, StalenessGate};
pub use worker::CompletionWorker;
