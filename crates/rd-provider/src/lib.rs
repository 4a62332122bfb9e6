pub mod client;
pub mod error;
pub mod polish;
pub mod types;

use async_trait::async_trait;

pub use client::ModelClient;
pub use error::ProviderError;
pub use types::{AttackFlags, Candidate, DetectionReport, SentenceParaphrase, SentenceScore};

/// The upstream text-model capabilities this service meters.
///
/// Handlers depend on this trait rather than a concrete client, so the
/// models can live behind any HTTP service and tests can script responses.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Scores `text` for likely AI authorship and returns the detection
    /// service's report unmodified.
    async fn detect(&self, text: &str) -> Result<DetectionReport, ProviderError>;

    /// Rewrites `text` sentence by sentence, returning scored candidate
    /// rewrites per sentence. Segmentation happens on the model side.
    async fn paraphrase(&self, text: &str) -> Result<Vec<SentenceParaphrase>, ProviderError>;
}
