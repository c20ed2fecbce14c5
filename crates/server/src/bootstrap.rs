use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use minutey_agent::{LlmClient, PatternError, Reconciler};
use minutey_core::config::{AppConfig, ConfigError, LlmProvider, LoadOptions};

use crate::ollama::OllamaClient;
use crate::transcribe::{
    BrowserSynthesizer, NoopTranscriber, SpeechSynthesizer, TranscribeError, Transcriber,
};
use crate::ws::EngineState;

pub struct Application {
    pub config: AppConfig,
    pub engine: Arc<EngineState>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("transcriber warm-up failed: {0}")]
    Transcriber(#[source] TranscribeError),
    #[error("llm provider `{0:?}` is not wired in this build (use ollama)")]
    UnsupportedProvider(LlmProvider),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "server.bootstrap.start", "starting application bootstrap");

    let llm: Arc<dyn LlmClient> = match config.llm.provider {
        LlmProvider::Ollama => {
            Arc::new(OllamaClient::from_config(&config.llm).map_err(BootstrapError::HttpClient)?)
        }
        other => return Err(BootstrapError::UnsupportedProvider(other)),
    };

    let reconciler = Arc::new(Reconciler::new(llm, &config.extraction)?);

    let transcriber: Arc<dyn Transcriber> = Arc::new(NoopTranscriber);
    transcriber.warm_up().await.map_err(BootstrapError::Transcriber)?;
    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(BrowserSynthesizer);

    info!(
        event_name = "server.bootstrap.collaborators_ready",
        llm_model = %config.llm.model,
        "engine collaborators initialized"
    );

    Ok(Application {
        config,
        engine: Arc::new(EngineState { reconciler, transcriber, synthesizer }),
    })
}

#[cfg(test)]
mod tests {
    use minutey_core::config::{AppConfig, LlmProvider, LoadOptions};

    use crate::bootstrap::{bootstrap, bootstrap_with_config, BootstrapError};

    #[tokio::test]
    async fn default_config_bootstraps_an_engine() {
        let app = bootstrap_with_config(AppConfig::default()).await.expect("bootstrap succeeds");
        assert_eq!(app.config.server.port, 8000);
    }

    #[tokio::test]
    async fn bootstrap_loads_config_and_builds_the_engine() {
        let app = bootstrap(LoadOptions::default()).await.expect("bootstrap succeeds");
        assert_eq!(app.config.llm.model, "llama3.2:3b");
    }

    #[tokio::test]
    async fn non_ollama_providers_are_rejected() {
        let mut config = AppConfig::default();
        config.llm.provider = LlmProvider::OpenAi;
        config.llm.api_key = Some("sk-test".to_string().into());

        let result = bootstrap_with_config(config).await;
        assert!(matches!(result, Err(BootstrapError::UnsupportedProvider(_))));
    }
}
