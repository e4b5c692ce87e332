//! CRUD operations for the zoom_meetings linking table.

use super::error::{EntityApiErrorKind, Error};
use entity::zoom_meetings::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, sea_query::OnConflict, ActiveValue::Set, ConnectionTrait};

/// Finds the linking record for a user's Zoom meeting, if one exists
pub async fn find_by_user_and_zoom_id(
    db: &impl ConnectionTrait,
    user_id: Id,
    zoom_meeting_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::ZoomMeetingId.eq(zoom_meeting_id))
        .one(db)
        .await?)
}

/// Inserts a linking record, relying on the (user_id, zoom_meeting_id)
/// unique index to reject duplicates. Returns `Ok(None)` when a concurrent
/// run won the insert race; callers then re-read the winning row.
pub async fn create_ignoring_conflict(
    db: &impl ConnectionTrait,
    model: Model,
) -> Result<Option<Model>, Error> {
    debug!(
        "Linking zoom meeting {} for user {}",
        model.zoom_meeting_id, model.user_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        user_id: Set(model.user_id),
        meeting_id: Set(model.meeting_id),
        zoom_meeting_id: Set(model.zoom_meeting_id),
        zoom_uuid: Set(model.zoom_uuid),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let result = Entity::insert(active_model)
        .on_conflict(
            OnConflict::columns([Column::UserId, Column::ZoomMeetingId])
                .do_nothing()
                .to_owned(),
        )
        .exec_with_returning(db)
        .await;

    match result {
        Ok(created) => Ok(Some(created)),
        Err(err) => {
            let err: Error = err.into();
            if err.error_kind == EntityApiErrorKind::RecordNotInserted {
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}
