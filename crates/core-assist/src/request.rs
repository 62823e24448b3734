use crate::context::ContextWindow;
use core_events::RequestId;

/// One completion request as handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub id: RequestId,
    /// Model offset of the caret when the request was made.
    pub trigger_offset: usize,
    pub context: ContextWindow,
}
