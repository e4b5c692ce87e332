//! SeaORM Entity for the tasks table.
//! Stores validated tasks extracted from a meeting transcript.

use crate::task_priority::TaskPriority;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::tasks::Model)]
#[sea_orm(schema_name = "tasklens", table_name = "tasks")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String, format = Uuid)]
    pub id: Id,

    #[schema(value_type = String, format = Uuid)]
    pub meeting_id: Id,

    #[schema(value_type = String, format = Uuid)]
    pub user_id: Id,

    /// What needs to be done
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Free-text assignee name, or the sentinel "Unassigned"
    pub assignee: String,

    #[schema(value_type = Option<String>, format = Date)]
    pub due_by: Option<Date>,

    pub priority: TaskPriority,

    /// Surrounding conversational context the model reported
    #[sea_orm(column_type = "Text", nullable)]
    pub context: Option<String>,

    pub completed: bool,

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
        belongs_to = "super::meetings::Entity",
        from = "Column::MeetingId",
        to = "super::meetings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Meetings,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
