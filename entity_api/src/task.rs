//! CRUD operations for the tasks table.

use super::error::Error;
use entity::tasks::{ActiveModel, Entity, Model};
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

/// Builds the insertable row for a task, stamping timestamps and leaving
/// id generation to the database.
pub fn to_active_model(model: Model) -> ActiveModel {
    let now = chrono::Utc::now();

    ActiveModel {
        meeting_id: Set(model.meeting_id),
        user_id: Set(model.user_id),
        description: Set(model.description),
        assignee: Set(model.assignee),
        due_by: Set(model.due_by),
        priority: Set(model.priority),
        context: Set(model.context),
        completed: Set(model.completed),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
}

/// Inserts all given tasks in a single bulk statement. Either every row
/// is inserted or the statement fails as a whole.
pub async fn create_batch(
    db: &impl ConnectionTrait,
    models: Vec<Model>,
) -> Result<usize, Error> {
    if models.is_empty() {
        return Ok(0);
    }

    let count = models.len();
    debug!("Bulk inserting {count} task(s)");

    let active_models: Vec<ActiveModel> = models.into_iter().map(to_active_model).collect();
    Entity::insert_many(active_models).exec(db).await?;

    Ok(count)
}
