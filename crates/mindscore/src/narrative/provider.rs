use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque text-generation collaborator used to narrate reports.
///
/// Implementations wrap a hosted LLM. They are treated as unreliable: callers
/// go through [`super::ResilientNarrator`] rather than invoking them directly.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String, GenerationError>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}

/// Prompt plus model parameters for one narration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Canned text served when neither the service nor the cache can answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl NarrativeRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            model: "default".to_string(),
            temperature: 0.7,
            max_tokens: 800,
            fallback: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("rate limited by text service")]
    RateLimited,
    #[error("text service unavailable: {0}")]
    Unavailable(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("text service returned an unusable response: {0}")]
    InvalidResponse(String),
    /// Authentication or content-policy rejection; retrying cannot help.
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("no text service configured")]
    NotConfigured,
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            GenerationError::Rejected(_) | GenerationError::NotConfigured
        )
    }
}

/// Generator standing in for an unconfigured text service. Fails without
/// retries so narration goes straight to the cache and fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _request: &NarrativeRequest) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}
