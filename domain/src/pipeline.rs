//! Extraction pipeline orchestration.
//!
//! A run is a stateless, sequential pass over one transcript: normalize,
//! resolve the owning meeting, extract candidates through the engine, then
//! persist. Terminal extraction and persistence failures are recorded in the
//! audit trail before they propagate.

use crate::audit;
use crate::error::{Error, PipelineErrorKind};
use crate::extraction::{CompletionApi, ExtractionEngine, TaskCandidate};
use crate::gateway::zoom::ZoomClient;
use crate::meeting::{self, RecordingMetadata};
use crate::task;
use crate::transcript::normalize_transcript;
use entity::pipeline_run::PipelineRunType;
use entity::Id;
use entity_api::user_integration;
use log::*;
use sea_orm::DatabaseConnection;

/// Result of a direct-transcript extraction run.
#[derive(Debug)]
pub struct ExtractionOutcome {
    /// Number of task rows persisted. Always zero for a dry run.
    pub tasks_count: usize,
    pub extracted_tasks: Vec<TaskCandidate>,
}

/// Result of a recording-based extraction run.
#[derive(Debug)]
pub struct ZoomExtractionOutcome {
    pub meeting_id: Id,
    pub tasks_extracted: usize,
    /// Set when the transcript was saved but the delegated extraction failed.
    pub warning: Option<String>,
}

/// Runs the pipeline for a transcript submitted against an existing meeting.
///
/// With `dry_run` set, extraction runs in full but nothing is persisted and
/// the meeting's transcript is left untouched.
pub async fn run_for_transcript<C: CompletionApi>(
    db: &DatabaseConnection,
    engine: &ExtractionEngine<C>,
    user_id: Id,
    meeting_id: Id,
    transcript: &str,
    dry_run: bool,
) -> Result<ExtractionOutcome, Error> {
    let run_type = if dry_run {
        PipelineRunType::DryRun
    } else {
        PipelineRunType::Live
    };

    let meeting = meeting::find_for_user(db, user_id, meeting_id).await?;
    let normalized = normalize_transcript(transcript)?;

    info!(
        "Starting {run_type:?} extraction for meeting {} ({} chars of transcript)",
        meeting.id,
        normalized.len()
    );

    let extracted_tasks = match engine.extract(&normalized).await {
        Ok(candidates) => candidates,
        Err(err) => {
            audit::record_failure(db, run_type, Some(meeting.id), &normalized, &err).await;
            return Err(err);
        }
    };

    if dry_run {
        info!(
            "Dry run extracted {} candidate(s) for meeting {}, skipping persistence",
            extracted_tasks.len(),
            meeting.id
        );
        audit::record_dry_run(db, Some(meeting.id), &normalized, &extracted_tasks).await;
        return Ok(ExtractionOutcome {
            tasks_count: 0,
            extracted_tasks,
        });
    }

    match task::persist_candidates(db, meeting.id, user_id, &normalized, &extracted_tasks).await {
        Ok(tasks_count) => Ok(ExtractionOutcome {
            tasks_count,
            extracted_tasks,
        }),
        Err(err) => {
            audit::record_failure(db, run_type, Some(meeting.id), &normalized, &err).await;
            Err(err)
        }
    }
}

/// Runs the pipeline for a Zoom cloud recording.
///
/// Downloads the recording's caption track with the user's stored Zoom
/// credential, reconciles the meeting row, saves the transcript, then
/// delegates into the transcript pipeline. A delegated extraction failure is
/// reported as a warning rather than an error, since the transcript save has
/// already succeeded and is worth keeping.
pub async fn run_for_zoom_recording<C: CompletionApi>(
    db: &DatabaseConnection,
    engine: &ExtractionEngine<C>,
    zoom: &ZoomClient,
    user_id: Id,
    zoom_meeting_id: &str,
) -> Result<ZoomExtractionOutcome, Error> {
    let integration = user_integration::find_by_user_id(db, user_id)
        .await?
        .ok_or_else(|| Error::pipeline(PipelineErrorKind::InvalidCredentials))?;

    if !integration.zoom_token_usable(chrono::Utc::now().into()) {
        return Err(Error::pipeline(PipelineErrorKind::InvalidCredentials));
    }
    let access_token = integration
        .zoom_access_token
        .as_deref()
        .ok_or_else(|| Error::pipeline(PipelineErrorKind::InvalidCredentials))?;

    let recording = zoom
        .get_meeting_recordings(access_token, zoom_meeting_id)
        .await?;

    let caption = recording
        .caption_file()
        .ok_or_else(|| Error::pipeline(PipelineErrorKind::EmptyTranscript))?;

    let raw = zoom.download_file(access_token, &caption.download_url).await?;
    let normalized = normalize_transcript(&raw)?;

    let metadata = RecordingMetadata::from(&recording);
    let meeting = meeting::reconcile_zoom_meeting(db, user_id, &metadata, &normalized).await?;

    match run_for_transcript(db, engine, user_id, meeting.id, &normalized, false).await {
        Ok(outcome) => Ok(ZoomExtractionOutcome {
            meeting_id: meeting.id,
            tasks_extracted: outcome.tasks_count,
            warning: None,
        }),
        Err(err) => {
            warn!(
                "Transcript saved for meeting {} but task extraction failed: {err:?}",
                meeting.id
            );
            Ok(ZoomExtractionOutcome {
                meeting_id: meeting.id,
                tasks_extracted: 0,
                warning: Some(
                    "Transcript was saved, but task extraction failed and can be retried later."
                        .to_string(),
                ),
            })
        }
    }
}
