use super::LLMBackend;
use crate::error::{BackendError, Result, SimscribeError};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

pub const API_KEY_VAR: &str = "DEEPSEEK_API_KEY";
pub const BASE_URL_VAR: &str = "DEEPSEEK_BASE_URL";

pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for an OpenAI-compatible chat completion service.
#[derive(Clone)]
pub struct RemoteConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = require(API_KEY_VAR, Some(api_key.into()))?;
        let base_url = require(BASE_URL_VAR, Some(base_url.into()))?;
        Ok(Self {
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Reads the key and base address from the process environment.
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`RemoteConfig::from_env`] but with an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = require(API_KEY_VAR, lookup(API_KEY_VAR))?;
        let base_url = require(BASE_URL_VAR, lookup(BASE_URL_VAR))?;
        Self::new(api_key, base_url)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A missing `.env` is fine; one that exists but cannot be parsed is not.
fn check_dotenv<T>(outcome: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match outcome {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(SimscribeError::Configuration(format!(
            "failed to load .env file: {}",
            e
        ))),
    }
}

fn require(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(SimscribeError::Configuration(format!(
            "{} is not set",
            name
        ))),
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Blocking client for the hosted chat completion service.
pub struct RemoteBackend {
    client: Client,
    config: RemoteConfig,
}

impl RemoteBackend {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BackendError::from)?;
        info!(model = %config.model, base_url = %config.base_url, "remote backend ready");
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(RemoteConfig::from_env()?)
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn request(&self, prompt: &str) -> std::result::Result<String, BackendError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json()?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(BackendError::EmptyCompletion)?;

        Ok(content.trim().to_string())
    }
}

impl LLMBackend for RemoteBackend {
    fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.config.model, prompt_chars = prompt.chars().count(), "remote completion");
        Ok(self.request(prompt)?)
    }
}
