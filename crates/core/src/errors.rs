use thiserror::Error;

/// Failure modes of the primary extraction service. Both degrade the
/// affected fragment to the deterministic pass; neither ever surfaces to the
/// client as an error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("primary extraction service unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("primary extraction service returned a malformed response: {0}")]
    MalformedResponse(String),
}
