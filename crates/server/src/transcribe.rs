//! Boundary traits for the speech collaborators the engine does not own.
//!
//! Both handles are process-wide singletons: built once at bootstrap,
//! injected as `Arc<dyn ...>`, and dropped at shutdown. The engine never
//! reaches for them implicitly.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub confidence: f64,
    pub language: String,
}

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("transcription backend failed: {0}")]
    Backend(String),
}

/// Speech-to-text boundary. Real backends load model weights in `warm_up`;
/// the engine only consumes the resulting text plus the confidence/language
/// pair it relays on the audio endpoint.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Called once at bootstrap, before the first audio frame.
    async fn warm_up(&self) -> Result<(), TranscribeError> {
        Ok(())
    }

    async fn transcribe(&self, audio: &[u8]) -> Result<TranscriptionResult, TranscribeError>;
}

/// Stand-in until a speech backend is wired up: audio frames are accepted
/// but yield no text, so the session simply produces no analysis for them.
pub struct NoopTranscriber;

#[async_trait]
impl Transcriber for NoopTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<TranscriptionResult, TranscribeError> {
        Ok(TranscriptionResult { text: String::new(), confidence: 0.0, language: "en".to_string() })
    }
}

/// Speech-synthesis boundary. `None` means the client handles voicing
/// (the dashboard uses the browser's speech API), which is the default.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Option<Vec<u8>>;
}

pub struct BrowserSynthesizer;

#[async_trait]
impl SpeechSynthesizer for BrowserSynthesizer {
    async fn synthesize(&self, _text: &str) -> Option<Vec<u8>> {
        None
    }
}
