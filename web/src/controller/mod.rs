use crate::error::Error;
use domain::extraction::{ExtractionConfig, ExtractionEngine};
use domain::gateway::open_ai::OpenAiClient;
use service::config::Config;

pub(crate) mod health_check_controller;
pub(crate) mod task_extraction_controller;
pub(crate) mod user_session_controller;
pub(crate) mod zoom_extraction_controller;

/// Builds an extraction engine from the service configuration. Fails when no
/// provider API key is configured.
pub(crate) fn extraction_engine(config: &Config) -> Result<ExtractionEngine<OpenAiClient>, Error> {
    let api_key = config.openai_api_key().ok_or_else(|| {
        Error(domain::error::Error {
            source: None,
            error_kind: domain::error::DomainErrorKind::Internal(
                domain::error::InternalErrorKind::Config,
            ),
        })
    })?;

    let client = OpenAiClient::new(&api_key, config.openai_base_url(), config.openai_model())?;

    Ok(ExtractionEngine::new(
        client,
        ExtractionConfig::from_service_config(config),
    ))
}
