//! Lookups for per-user external service credentials.

use super::error::Error;
use entity::user_integrations::{Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ConnectionTrait};

/// Finds a user's integration record, if they have connected any service
pub async fn find_by_user_id(
    db: &impl ConnectionTrait,
    user_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?)
}
