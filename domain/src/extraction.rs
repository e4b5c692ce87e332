//! Task extraction from normalized transcripts.
//!
//! The engine builds a prompt, calls the language-model provider through the
//! [`CompletionApi`] trait, and enforces a strict structural check on the
//! response. Two retry budgets are tracked separately: transport retries
//! handle transient HTTP failures of a single call, while validation retries
//! re-invoke the model when its output fails the shape check. Transport
//! failures that exhaust their budget, and auth failures, are terminal and
//! never consume a validation retry.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, PipelineErrorKind};
use async_trait::async_trait;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use tokio::time::{sleep, Duration};

/// Version tag recorded with every audit entry so prompt changes can be
/// correlated with shifts in model output quality.
pub const PROMPT_VERSION: &str = "v1";

/// Retry tuning for the extraction engine. Injected at construction so tests
/// can zero out the backoff sleeps.
#[derive(Clone, Debug)]
pub struct ExtractionConfig {
    /// HTTP attempts per model call before a transient failure is terminal.
    pub transport_attempts: u32,
    /// Full model invocations allowed when the response fails validation.
    pub validation_attempts: u32,
    /// Base delay for rate-limit backoff, doubled per attempt.
    pub rate_limit_backoff_base: Duration,
    /// Upper bound on any rate-limit backoff sleep.
    pub rate_limit_backoff_cap: Duration,
    /// Base delay for server-error backoff, doubled per attempt.
    pub server_backoff_base: Duration,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            transport_attempts: 3,
            validation_attempts: 2,
            rate_limit_backoff_base: Duration::from_secs(5),
            rate_limit_backoff_cap: Duration::from_secs(30),
            server_backoff_base: Duration::from_secs(2),
        }
    }
}

impl ExtractionConfig {
    /// Builds retry tuning from the service configuration, keeping the
    /// default backoff timings.
    pub fn from_service_config(config: &service::config::Config) -> Self {
        Self {
            transport_attempts: config.extraction_transport_attempts,
            validation_attempts: config.extraction_validation_attempts,
            ..Self::default()
        }
    }
}

/// Transport-level outcome of a single model provider call, classified by
/// HTTP status so the engine can decide whether and how to retry.
#[derive(Debug)]
pub enum TransportError {
    /// HTTP 429. Carries the provider's retry hint when one was supplied.
    RateLimited { retry_after: Option<Duration> },
    /// HTTP 401. Never retried.
    InvalidCredentials,
    /// HTTP 403. Never retried.
    Forbidden,
    /// HTTP 5xx. Retried with exponential backoff.
    Server { status: u16 },
    /// Any other non-2xx status. Not retried.
    Api { status: u16 },
    /// The request failed below the HTTP status level, or the provider's
    /// response envelope could not be decoded. Retried like a server error.
    Network(Box<dyn StdError + Send + Sync>),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransportError::RateLimited { .. } => write!(f, "provider rate limited the request"),
            TransportError::InvalidCredentials => write!(f, "provider rejected the credentials"),
            TransportError::Forbidden => write!(f, "provider refused the request"),
            TransportError::Server { status } => write!(f, "provider server error ({status})"),
            TransportError::Api { status } => write!(f, "unexpected provider status ({status})"),
            TransportError::Network(e) => write!(f, "network error: {e}"),
        }
    }
}

impl StdError for TransportError {}

/// A single model call returning the raw completion text.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, TransportError>;
}

/// One extracted task as produced by the model, before persistence defaults
/// are applied.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TaskCandidate {
    pub task: String,
    pub assignee: String,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub context: Option<String>,
}

/// Extraction engine bound to a completion backend.
pub struct ExtractionEngine<C: CompletionApi> {
    api: C,
    config: ExtractionConfig,
}

impl<C: CompletionApi> ExtractionEngine<C> {
    pub fn new(api: C, config: ExtractionConfig) -> Self {
        Self { api, config }
    }

    /// Extracts task candidates from a normalized transcript.
    ///
    /// The outer loop re-invokes the model when its output fails validation,
    /// up to the validation budget. Terminal transport failures propagate
    /// immediately without consuming a validation retry, so an always-429
    /// backend fails after exactly `transport_attempts` calls.
    pub async fn extract(&self, transcript: &str) -> Result<Vec<TaskCandidate>, Error> {
        let prompt = build_prompt(transcript);
        let mut last_raw = String::new();

        for validation_attempt in 1..=self.config.validation_attempts {
            let raw = self.complete_with_transport_retries(&prompt).await?;

            match validate_candidates(&raw) {
                Ok(candidates) => {
                    debug!(
                        "Extraction produced {} candidate(s) on validation attempt {}",
                        candidates.len(),
                        validation_attempt
                    );
                    return Ok(candidates);
                }
                Err(reason) => {
                    warn!(
                        "Model output failed validation (attempt {}/{}): {}",
                        validation_attempt, self.config.validation_attempts, reason
                    );
                    last_raw = raw;
                }
            }
        }

        Err(Error::pipeline(PipelineErrorKind::InvalidSchema(last_raw)))
    }

    /// Performs one model call with transport-level retries.
    ///
    /// 429 and 5xx are retried with backoff up to the transport budget.
    /// 401, 403, and unexpected client statuses fail immediately.
    async fn complete_with_transport_retries(&self, prompt: &str) -> Result<String, Error> {
        let attempts = self.config.transport_attempts.max(1);

        for attempt in 0..attempts {
            let is_last = attempt + 1 == attempts;

            match self.api.complete(prompt).await {
                Ok(raw) => return Ok(raw),
                Err(TransportError::RateLimited { retry_after }) => {
                    if is_last {
                        return Err(Error::pipeline(PipelineErrorKind::RateLimited));
                    }
                    let delay = retry_after.unwrap_or_else(|| self.rate_limit_backoff(attempt));
                    info!(
                        "Provider rate limited, backing off {:?} before attempt {}",
                        delay,
                        attempt + 2
                    );
                    sleep(delay).await;
                }
                Err(TransportError::Server { status }) => {
                    if is_last {
                        return Err(Error::pipeline(PipelineErrorKind::ServiceError));
                    }
                    let delay = self.server_backoff(attempt);
                    warn!(
                        "Provider returned {}, backing off {:?} before attempt {}",
                        status,
                        delay,
                        attempt + 2
                    );
                    sleep(delay).await;
                }
                Err(TransportError::Network(e)) => {
                    // Connection resets and timeouts are treated like 5xx.
                    if is_last {
                        return Err(Error {
                            source: Some(e),
                            error_kind: DomainErrorKind::Pipeline(PipelineErrorKind::ServiceError),
                        });
                    }
                    let delay = self.server_backoff(attempt);
                    warn!(
                        "Provider call failed ({e}), backing off {:?} before attempt {}",
                        delay,
                        attempt + 2
                    );
                    sleep(delay).await;
                }
                Err(TransportError::InvalidCredentials) => {
                    return Err(Error::pipeline(PipelineErrorKind::InvalidCredentials));
                }
                Err(TransportError::Forbidden) => {
                    return Err(Error::pipeline(PipelineErrorKind::Forbidden));
                }
                Err(TransportError::Api { status }) => {
                    return Err(Error::pipeline(PipelineErrorKind::Api(status)));
                }
            }
        }

        // The loop always returns on its last attempt.
        Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                "transport retry loop exited without a result".to_string(),
            )),
        })
    }

    fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        let delay = self
            .config
            .rate_limit_backoff_base
            .saturating_mul(1u32 << attempt.min(16));
        delay.min(self.config.rate_limit_backoff_cap)
    }

    fn server_backoff(&self, attempt: u32) -> Duration {
        self.config
            .server_backoff_base
            .saturating_mul(1u32 << attempt.min(16))
    }
}

/// Builds the extraction prompt for a normalized transcript.
pub fn build_prompt(transcript: &str) -> String {
    format!(
        r#"Analyze this meeting transcript and extract every actionable task.

## Output Format
Return a JSON array where each element has exactly these fields:
[
  {{
    "task": "Clear description of the task",
    "assignee": "Name of the person responsible, or \"Unassigned\"",
    "due_date": "YYYY-MM-DD or null",
    "priority": "High, Medium or Low, or null",
    "context": "Short quote or summary of where this came up, or null"
  }}
]

Guidelines:
- Only include concrete commitments, not general discussion
- Use null for any field the transcript does not support
- Return an empty array [] if no tasks were discussed
- Return ONLY valid JSON, no markdown or explanation

## Transcript
{transcript}"#
    )
}

/// Validates the raw model response against the expected shape.
///
/// The response must parse as a JSON array. Every element must be an object
/// with string `task` and `assignee` fields, and must carry `due_date`,
/// `priority`, and `context` keys whose values are strings or null. A missing
/// key is rejected even though it would deserialize, so that systematically
/// truncated output is caught rather than silently defaulted.
pub fn validate_candidates(raw: &str) -> Result<Vec<TaskCandidate>, String> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| format!("response is not valid JSON: {e}"))?;

    let items = value
        .as_array()
        .ok_or_else(|| "response is not a JSON array".to_string())?;

    let mut candidates = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| format!("element {i} is not an object"))?;

        let task = obj
            .get("task")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("element {i} is missing a string `task`"))?;
        let assignee = obj
            .get("assignee")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("element {i} is missing a string `assignee`"))?;

        let due_date = optional_string_field(obj, "due_date", i)?;
        let priority = optional_string_field(obj, "priority", i)?;
        let context = optional_string_field(obj, "context", i)?;

        candidates.push(TaskCandidate {
            task: task.to_string(),
            assignee: assignee.to_string(),
            due_date,
            priority,
            context,
        });
    }

    Ok(candidates)
}

fn optional_string_field(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    index: usize,
) -> Result<Option<String>, String> {
    match obj.get(key) {
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(format!("element {index} has a non-string `{key}`")),
        None => Err(format!("element {index} is missing the `{key}` key")),
    }
}
