pub mod backends;
pub mod error;
pub mod generator;
pub mod locations;
pub mod rating;
pub mod summary;

pub use backends::{BackendKind, LLMBackend, LocalBackend, LocalConfig, RemoteBackend, RemoteConfig};
pub use error::{BackendError, Result, SimscribeError};
pub use generator::TextGenerator;
pub use locations::{Location, Locations};
pub use rating::extract_min_rating;
pub use summary::summarize_simulation;
