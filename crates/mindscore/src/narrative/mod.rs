//! Report narration through an unreliable text-generation service.
//!
//! [`ResilientNarrator`] retries the primary service with bounded exponential
//! backoff, then falls back to a TTL cache, then to a canned narrative. The
//! cache is an injected object so tests control its clock.

mod cache;
mod narrator;
pub mod prompt;
mod provider;
mod retry;

pub use cache::{Clock, ManualClock, NarrativeCache, SystemClock};
pub use narrator::{NarrativeOutcome, NarrativeSource, ResilientNarrator};
pub use provider::{GenerationError, NarrativeRequest, TextGenerator, UnconfiguredGenerator};
pub use retry::RetryPolicy;
