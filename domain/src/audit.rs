//! Audit trail for terminal pipeline failures.
//!
//! Recording is fire-and-forget: an audit write that fails is logged and
//! swallowed so it can never mask the error being reported to the caller.

use crate::error::{DomainErrorKind, Error, PipelineErrorKind};
use crate::extraction::{TaskCandidate, PROMPT_VERSION};
use entity::pipeline_failures;
use entity::pipeline_run::PipelineRunType;
use entity::Id;
use entity_api::pipeline_failure;
use log::*;
use sea_orm::DatabaseConnection;

/// Upper bound on the transcript excerpt stored with each record.
const TRANSCRIPT_SAMPLE_LEN: usize = 200;

/// Code recorded for a completed dry run, which is an outcome rather
/// than a failure.
pub const DRY_RUN_RESULT_CODE: &str = "DRY_RUN_RESULT";

/// Durably records a terminal pipeline failure for offline inspection.
pub async fn record_failure(
    db: &DatabaseConnection,
    run_type: PipelineRunType,
    meeting_id: Option<Id>,
    transcript: &str,
    error: &Error,
) {
    let model = pipeline_failures::Model {
        id: Id::default(),
        meeting_id,
        run_type,
        transcript_sample: transcript_sample(transcript),
        error_code: error_code(error).to_string(),
        raw_output: raw_output(error),
        prompt_version: PROMPT_VERSION.to_string(),
        created_at: chrono::Utc::now().into(),
    };

    if let Err(audit_err) = pipeline_failure::create(db, model).await {
        warn!("Failed to record pipeline failure audit entry: {audit_err:?}");
    }
}

/// Records the result of a completed dry run for offline review.
///
/// Dry runs persist no task rows, so the extracted candidates are kept as
/// the record's raw payload instead.
pub async fn record_dry_run(
    db: &DatabaseConnection,
    meeting_id: Option<Id>,
    transcript: &str,
    candidates: &[TaskCandidate],
) {
    let model = pipeline_failures::Model {
        id: Id::default(),
        meeting_id,
        run_type: PipelineRunType::DryRun,
        transcript_sample: transcript_sample(transcript),
        error_code: DRY_RUN_RESULT_CODE.to_string(),
        raw_output: serde_json::to_string(candidates).ok(),
        prompt_version: PROMPT_VERSION.to_string(),
        created_at: chrono::Utc::now().into(),
    };

    if let Err(audit_err) = pipeline_failure::create(db, model).await {
        warn!("Failed to record dry run audit entry: {audit_err:?}");
    }
}

fn error_code(error: &Error) -> &'static str {
    match &error.error_kind {
        DomainErrorKind::Pipeline(kind) => kind.code(),
        DomainErrorKind::Internal(_) => "INTERNAL_ERROR",
        DomainErrorKind::External(_) => "EXTERNAL_ERROR",
    }
}

/// The raw model output is only available for schema-validation failures.
fn raw_output(error: &Error) -> Option<String> {
    match &error.error_kind {
        DomainErrorKind::Pipeline(PipelineErrorKind::InvalidSchema(raw)) => Some(raw.clone()),
        _ => None,
    }
}

/// Truncates the transcript to the sample bound on a char boundary.
fn transcript_sample(transcript: &str) -> String {
    transcript.chars().take(TRANSCRIPT_SAMPLE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_bounded_and_char_safe() {
        let long = "é".repeat(300);
        let sample = transcript_sample(&long);
        assert_eq!(sample.chars().count(), 200);
    }

    #[test]
    fn short_transcripts_are_kept_whole() {
        assert_eq!(transcript_sample("Hello world"), "Hello world");
    }

    #[test]
    fn schema_failures_carry_their_raw_output() {
        let err = Error::pipeline(PipelineErrorKind::InvalidSchema("garbled".to_string()));
        assert_eq!(raw_output(&err).as_deref(), Some("garbled"));
        assert_eq!(error_code(&err), "INVALID_MODEL_OUTPUT");
    }

    #[test]
    fn transport_failures_have_no_raw_output() {
        let err = Error::pipeline(PipelineErrorKind::RateLimited);
        assert_eq!(raw_output(&err), None);
        assert_eq!(error_code(&err), "RATE_LIMITED");
    }
}
