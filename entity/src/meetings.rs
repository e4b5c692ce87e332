//! SeaORM Entity for the meetings table.
//! A meeting is the durable record transcripts are attached to and tasks
//! are extracted against.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::meetings::Model)]
#[sea_orm(schema_name = "tasklens", table_name = "meetings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String, format = Uuid)]
    pub id: Id,

    #[schema(value_type = String, format = Uuid)]
    pub user_id: Id,

    pub title: String,

    /// Calendar date of the meeting
    #[schema(value_type = String, format = Date)]
    pub date: Date,

    /// Human-readable duration, e.g. "45 minutes"
    pub duration: Option<String>,

    /// Normalized transcript text; written by the reconciler and the
    /// task persister, never deleted by the pipeline
    #[sea_orm(column_type = "Text", nullable)]
    pub transcript: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,

    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,

    #[sea_orm(has_one = "super::zoom_meetings::Entity")]
    ZoomMeetings,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::zoom_meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ZoomMeetings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
