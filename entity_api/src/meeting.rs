//! CRUD operations for the meetings table.

use super::error::{EntityApiErrorKind, Error};
use entity::meetings::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, TryIntoModel,
};

/// Creates a new meeting record owned by `model.user_id`
pub async fn create(db: &impl ConnectionTrait, model: Model) -> Result<Model, Error> {
    debug!("Creating new meeting for user: {}", model.user_id);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        user_id: Set(model.user_id),
        title: Set(model.title),
        date: Set(model.date),
        duration: Set(model.duration),
        transcript: Set(model.transcript),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?.try_into_model()?)
}

/// Finds a meeting by ID
pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Finds a meeting by ID, scoped to its owning user. A meeting that exists
/// but belongs to another user is indistinguishable from a missing one.
pub async fn find_by_id_for_user(
    db: &impl ConnectionTrait,
    id: Id,
    user_id: Id,
) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

/// Writes the transcript onto an existing meeting
pub async fn update_transcript(
    db: &impl ConnectionTrait,
    id: Id,
    transcript: &str,
) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(existing) => {
            debug!("Updating transcript for meeting: {id}");

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                user_id: Unchanged(existing.user_id),
                title: Unchanged(existing.title),
                date: Unchanged(existing.date),
                duration: Unchanged(existing.duration),
                transcript: Set(Some(transcript.to_owned())),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Meeting with id {id} not found");
            Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::RecordNotFound,
            })
        }
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn meeting_model(id: Id, user_id: Id) -> Model {
        let now = chrono::Utc::now();
        Model {
            id,
            user_id,
            title: "Weekly standup".to_owned(),
            date: now.date_naive(),
            duration: Some("30 minutes".to_owned()),
            transcript: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_id_for_user_returns_not_found_for_other_users_meeting() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // Scoped query returns no rows even though the meeting exists
            .append_query_results::<Model, Vec<_>, _>(vec![vec![]])
            .into_connection();

        let result = find_by_id_for_user(&db, Id::new_v4(), Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn update_transcript_writes_onto_existing_meeting() {
        let meeting_id = Id::new_v4();
        let user_id = Id::new_v4();
        let existing = meeting_model(meeting_id, user_id);
        let mut updated = existing.clone();
        updated.transcript = Some("Hello world".to_owned());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing]])
            .append_query_results(vec![vec![updated]])
            .into_connection();

        let result = update_transcript(&db, meeting_id, "Hello world")
            .await
            .unwrap();

        assert_eq!(result.transcript.as_deref(), Some("Hello world"));
    }
}
