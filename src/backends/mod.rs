use crate::error::{Result, SimscribeError};
use std::fmt;
use std::str::FromStr;

pub mod local;
pub mod remote;

pub use local::{LocalBackend, LocalConfig};
pub use remote::{RemoteBackend, RemoteConfig};

/// The core trait that any text-generation backend must implement.
#[cfg_attr(test, mockall::automock)]
pub trait LLMBackend: Send + Sync {
    /// Produce a completion for the provided prompt string.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Selects which backend a generation call is routed to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendKind {
    #[default]
    Remote,
    Local,
}

impl BackendKind {
    fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "remote",
            BackendKind::Local => "local",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = SimscribeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(BackendKind::Remote),
            "local" => Ok(BackendKind::Local),
            other => Err(SimscribeError::Configuration(format!(
                "unknown backend '{}', expected 'remote' or 'local'",
                other
            ))),
        }
    }
}
