use thiserror::Error;

/// Failure talking to an upstream model service. Network trouble, timeouts
/// and undecodable bodies surface as `Http`; a reachable service answering
/// outside 2xx surfaces as `Status` with whatever body it sent.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model service returned {status}: {body}")]
    Status { status: u16, body: String },
}
