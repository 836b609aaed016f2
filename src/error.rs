use thiserror::Error;

/// Simscribe crate-specific Result type alias
pub type Result<T> = std::result::Result<T, SimscribeError>;

#[derive(Error, Debug)]
pub enum SimscribeError {
    /// Required settings were missing when a backend was built.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Failures raised while a backend produces a completion.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Remote service returned no completion text")]
    EmptyCompletion,

    #[error("Candle operation error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Failed to load model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("HF Hub API error: {0}")]
    HfHub(#[from] hf_hub::api::sync::ApiError),

    // tokenizers::Error is a boxed dyn error, kept as text
    #[error("Tokenization error: {0}")]
    Tokenizer(String),

    #[error("Context length exceeded: limit {limit}, current {current}")]
    ContextLimitExceeded { limit: usize, current: usize },
}
