use async_trait::async_trait;
use minutey_core::ExtractionError;

/// Seam to the generative text service. The network implementation lives in
/// the server crate; tests script this trait directly.
///
/// Implementations map transport failures (connect errors, timeouts) to
/// [`ExtractionError::UpstreamUnavailable`] and non-text payloads to
/// [`ExtractionError::MalformedResponse`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ExtractionError>;
}
