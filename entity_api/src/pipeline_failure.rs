//! Append-only writes to the pipeline_failures audit table.

use super::error::Error;
use entity::pipeline_failures::{ActiveModel, Model};
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

/// Appends one audit record. The audit table is never read back by the
/// pipeline, only inspected offline.
pub async fn create(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    debug!(
        "Recording pipeline failure {} for meeting {:?}",
        model.error_code, model.meeting_id
    );

    let active_model = ActiveModel {
        meeting_id: Set(model.meeting_id),
        run_type: Set(model.run_type),
        transcript_sample: Set(model.transcript_sample),
        error_code: Set(model.error_code),
        raw_output: Set(model.raw_output),
        prompt_version: Set(model.prompt_version),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}
