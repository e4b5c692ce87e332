//! SeaORM Entity for the pipeline_failures audit table.
//! Append-only record of terminal pipeline failures and dry-run results;
//! written for offline inspection and never read back by the pipeline.

use crate::pipeline_run::PipelineRunType;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "tasklens", table_name = "pipeline_failures")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Meeting the run was operating on, when one had been resolved
    pub meeting_id: Option<Id>,

    pub run_type: PipelineRunType,

    /// Bounded excerpt of the input transcript (first 200 chars)
    #[sea_orm(column_type = "Text")]
    pub transcript_sample: String,

    /// Stable machine-readable classification, e.g. "INVALID_MODEL_OUTPUT"
    pub error_code: String,

    /// Raw model output when one was available
    #[sea_orm(column_type = "Text", nullable)]
    pub raw_output: Option<String>,

    /// Prompt revision that produced the failure
    pub prompt_version: String,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meetings::Entity",
        from = "Column::MeetingId",
        to = "super::meetings::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Meetings,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
