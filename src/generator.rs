use crate::backends::{BackendKind, LLMBackend};
use crate::error::{Result, SimscribeError};
use std::sync::Arc;
use tracing::debug;

/// Single entry point for text generation.
///
/// Holds the remote backend and, optionally, a local one. Every call is routed
/// to exactly one of them and its result is returned as-is.
#[derive(Clone)]
pub struct TextGenerator {
    remote: Arc<dyn LLMBackend>,
    local: Option<Arc<dyn LLMBackend>>,
}

impl TextGenerator {
    pub fn new(remote: Arc<dyn LLMBackend>) -> Self {
        Self {
            remote,
            local: None,
        }
    }

    pub fn with_local(mut self, local: Arc<dyn LLMBackend>) -> Self {
        self.local = Some(local);
        self
    }

    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    /// Generates with the default (remote) backend.
    pub fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with(prompt, BackendKind::default())
    }

    pub fn generate_with(&self, prompt: &str, backend: BackendKind) -> Result<String> {
        debug!(%backend, prompt_chars = prompt.chars().count(), "dispatching prompt");
        self.backend(backend)?.complete(prompt)
    }

    fn backend(&self, kind: BackendKind) -> Result<&dyn LLMBackend> {
        match kind {
            BackendKind::Remote => Ok(self.remote.as_ref()),
            BackendKind::Local => self.local.as_deref().ok_or_else(|| {
                SimscribeError::Configuration("no local backend was initialised".to_string())
            }),
        }
    }
}
