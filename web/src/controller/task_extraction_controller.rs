//! Controller for direct transcript submission.

use crate::controller::extraction_engine;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::extraction::ExtractTasksParams;
use crate::{AppState, Error};

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use domain::extraction::TaskCandidate;
use domain::pipeline;
use log::*;
use serde::Serialize;
use service::config::ApiVersion;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExtractTasksResponse {
    success: bool,
    tasks_count: usize,
    #[schema(value_type = Vec<Object>)]
    extracted_tasks: Vec<TaskCandidate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DryRunResponse {
    success: bool,
    #[schema(value_type = Vec<Object>)]
    extracted_tasks: Vec<TaskCandidate>,
    message: String,
}

/// POST /tasks/extract
///
/// Runs the extraction pipeline over a transcript submitted for an existing
/// meeting owned by the caller.
#[utoipa::path(
    post,
    path = "/tasks/extract",
    params(ApiVersion),
    request_body(content = ExtractTasksParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Tasks extracted and persisted", body = ExtractTasksResponse),
        (status = 400, description = "Transcript empty or too short"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Meeting not found"),
        (status = 422, description = "Model output failed validation"),
        (status = 429, description = "AI provider rate limited the request"),
        (status = 503, description = "AI provider unavailable"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn extract(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<ExtractTasksParams>,
) -> Result<Response, Error> {
    debug!(
        "POST /tasks/extract for meeting {} (dry_run: {})",
        params.meeting_id, params.dry_run
    );

    let engine = extraction_engine(&app_state.config)?;

    let outcome = pipeline::run_for_transcript(
        app_state.db_conn_ref(),
        &engine,
        user.id,
        params.meeting_id,
        &params.transcript,
        params.dry_run,
    )
    .await?;

    if params.dry_run {
        return Ok(Json(DryRunResponse {
            success: true,
            message: format!(
                "Dry run extracted {} task(s); nothing was persisted.",
                outcome.extracted_tasks.len()
            ),
            extracted_tasks: outcome.extracted_tasks,
        })
        .into_response());
    }

    Ok(Json(ExtractTasksResponse {
        success: true,
        tasks_count: outcome.tasks_count,
        extracted_tasks: outcome.extracted_tasks,
    })
    .into_response())
}
