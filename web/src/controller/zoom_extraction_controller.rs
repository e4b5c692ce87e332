//! Controller for recording-based extraction.

use crate::controller::extraction_engine;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::extraction::ZoomExtractParams;
use crate::{AppState, Error};

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use domain::gateway::zoom::ZoomClient;
use domain::pipeline;
use domain::Id;
use log::*;
use serde::Serialize;
use service::config::ApiVersion;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ZoomExtractResponse {
    success: bool,
    message: String,
    #[schema(value_type = String, format = Uuid)]
    meeting_id: Id,
    tasks_extracted: usize,
    /// Present when the transcript was saved but extraction failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

/// POST /zoom/recordings/extract
///
/// Resolves a Zoom cloud recording, downloads its caption track with the
/// caller's stored Zoom credential, and runs the extraction pipeline over it.
/// The transcript save is reported as a success even when the delegated
/// extraction fails; the failure surfaces as a warning.
#[utoipa::path(
    post,
    path = "/zoom/recordings/extract",
    params(ApiVersion),
    request_body(content = ZoomExtractParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Transcript saved, tasks extracted when possible", body = ZoomExtractResponse),
        (status = 400, description = "Recording has no usable caption track"),
        (status = 401, description = "Unauthorized, or stored Zoom credential expired"),
        (status = 404, description = "No cloud recording for that meeting"),
        (status = 502, description = "Zoom could not be reached"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn extract(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<ZoomExtractParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST /zoom/recordings/extract for zoom meeting {}",
        params.zoom_meeting_id
    );

    let engine = extraction_engine(&app_state.config)?;
    let zoom = ZoomClient::new(app_state.config.zoom_base_url())?;

    let outcome = pipeline::run_for_zoom_recording(
        app_state.db_conn_ref(),
        &engine,
        &zoom,
        user.id,
        &params.zoom_meeting_id,
    )
    .await?;

    let message = if outcome.warning.is_some() {
        "Transcript saved.".to_string()
    } else {
        format!(
            "Transcript saved and {} task(s) extracted.",
            outcome.tasks_extracted
        )
    };

    Ok(Json(ZoomExtractResponse {
        success: true,
        message,
        meeting_id: outcome.meeting_id,
        tasks_extracted: outcome.tasks_extracted,
        warning: outcome.warning,
    }))
}
