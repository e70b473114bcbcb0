use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::cache::NarrativeCache;
use super::provider::{GenerationError, NarrativeRequest, TextGenerator};
use super::retry::RetryPolicy;

/// Where a narrative outcome's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Primary,
    Cache,
    Fallback,
    None,
}

/// Structured result of a narration attempt. Never an error: callers inspect
/// `success` and `source` to degrade gracefully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub source: NarrativeSource,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Retry-then-cache-then-fallback wrapper around a [`TextGenerator`].
pub struct ResilientNarrator {
    generator: Arc<dyn TextGenerator>,
    cache: Arc<NarrativeCache>,
    policy: RetryPolicy,
}

impl ResilientNarrator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        cache: Arc<NarrativeCache>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            cache,
            policy,
        }
    }

    pub fn cache(&self) -> &Arc<NarrativeCache> {
        &self.cache
    }

    /// Call the primary service with backoff, then fall back in order to the
    /// cache, the request's canned text, and finally a failed outcome.
    pub async fn generate(&self, cache_key: &str, request: &NarrativeRequest) -> NarrativeOutcome {
        let (result, attempts) = self.call_with_retry(request).await;

        let error = match result {
            Ok(content) => {
                self.cache.insert(cache_key, content.clone());
                return NarrativeOutcome {
                    success: true,
                    content: Some(content),
                    source: NarrativeSource::Primary,
                    attempts,
                    error: None,
                };
            }
            Err(error) => error,
        };

        if let Some(content) = self.cache.get(cache_key) {
            info!(cache_key, attempts, "serving cached narrative after primary failure");
            return NarrativeOutcome {
                success: true,
                content: Some(content),
                source: NarrativeSource::Cache,
                attempts,
                error: Some(error.to_string()),
            };
        }

        if let Some(fallback) = &request.fallback {
            info!(cache_key, attempts, "serving static narrative fallback");
            return NarrativeOutcome {
                success: true,
                content: Some(fallback.clone()),
                source: NarrativeSource::Fallback,
                attempts,
                error: Some(error.to_string()),
            };
        }

        warn!(cache_key, attempts, error = %error, "narrative unavailable");
        NarrativeOutcome {
            success: false,
            content: None,
            source: NarrativeSource::None,
            attempts,
            error: Some(format!(
                "Report narrative is temporarily unavailable: {error}"
            )),
        }
    }

    async fn call_with_retry(&self, request: &NarrativeRequest) -> (Result<String, GenerationError>, u32) {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let result = self.generator.generate(request).await;
            attempt += 1;

            match result {
                Ok(content) => return (Ok(content), attempt),
                Err(error) if !error.is_retryable() || attempt >= max_attempts => {
                    return (Err(error), attempt)
                }
                Err(error) => {
                    let delay = self.policy.delay_for(attempt - 1);
                    warn!(
                        generator = self.generator.name(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "text service call failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::cache::ManualClock;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Generator replaying a scripted sequence of results, then failing.
    struct ScriptedGenerator {
        script: Mutex<VecDeque<Result<String, GenerationError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Result<String, GenerationError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Self::new(Vec::new())
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().expect("calls mutex")
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _request: &NarrativeRequest) -> Result<String, GenerationError> {
            *self.calls.lock().expect("calls mutex") += 1;
            self.script
                .lock()
                .expect("script mutex")
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Unavailable("down".to_string())))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn narrator(generator: Arc<ScriptedGenerator>, cache: Arc<NarrativeCache>) -> ResilientNarrator {
        ResilientNarrator::new(generator, cache, RetryPolicy::default())
    }

    fn cold_cache() -> Arc<NarrativeCache> {
        Arc::new(NarrativeCache::with_clock(
            Duration::from_secs(3600),
            Arc::new(ManualClock::default()),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn primary_success_is_cached() {
        let generator = ScriptedGenerator::new(vec![Ok("A steady profile.".to_string())]);
        let cache = cold_cache();
        let narrator = narrator(generator.clone(), cache.clone());

        let outcome = narrator
            .generate("key", &NarrativeRequest::new("prompt"))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.source, NarrativeSource::Primary);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(cache.get("key").as_deref(), Some("A steady profile."));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_a_later_attempt() {
        let generator = ScriptedGenerator::new(vec![
            Err(GenerationError::RateLimited),
            Ok("Recovered narrative".to_string()),
        ]);
        let narrator = narrator(generator.clone(), cold_cache());

        let started = tokio::time::Instant::now();
        let outcome = narrator
            .generate("key", &NarrativeRequest::new("prompt"))
            .await;

        assert_eq!(outcome.source, NarrativeSource::Primary);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(generator.calls(), 2);
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_serve_warm_cache() {
        let generator = ScriptedGenerator::failing();
        let cache = cold_cache();
        cache.insert("key", "Cached narrative");
        let narrator = narrator(generator.clone(), cache);

        let started = tokio::time::Instant::now();
        let outcome = narrator
            .generate("key", &NarrativeRequest::new("prompt").with_fallback("Canned"))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.source, NarrativeSource::Cache);
        assert_eq!(outcome.content.as_deref(), Some("Cached narrative"));
        assert_eq!(generator.calls(), 3);
        // 1s + 2s between the three attempts, no sleep after the last.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn cold_cache_uses_static_fallback() {
        let narrator = narrator(ScriptedGenerator::failing(), cold_cache());

        let outcome = narrator
            .generate("key", &NarrativeRequest::new("prompt").with_fallback("Canned"))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.source, NarrativeSource::Fallback);
        assert_eq!(outcome.content.as_deref(), Some("Canned"));
        assert!(outcome.error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn no_cache_and_no_fallback_fails() {
        let narrator = narrator(ScriptedGenerator::failing(), cold_cache());

        let outcome = narrator
            .generate("key", &NarrativeRequest::new("prompt"))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.source, NarrativeSource::None);
        assert!(outcome.content.is_none());
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_requests_are_not_retried() {
        let generator = ScriptedGenerator::new(vec![Err(GenerationError::Rejected(
            "content policy".to_string(),
        ))]);
        let narrator = narrator(generator.clone(), cold_cache());

        let outcome = narrator
            .generate("key", &NarrativeRequest::new("prompt"))
            .await;

        assert_eq!(outcome.attempts, 1);
        assert_eq!(generator.calls(), 1);
        assert_eq!(outcome.source, NarrativeSource::None);
    }
}
