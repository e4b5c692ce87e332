//! Meeting lookup and reconciliation.
//!
//! The reconciler converges repeated extraction runs for the same Zoom
//! meeting onto a single meeting row. The create path inserts the meeting and
//! its linking record in one transaction keyed on the (user, zoom meeting id)
//! unique index, so a concurrent run that loses the insert race rolls back
//! and re-reads the winner instead of creating a duplicate.

use crate::error::{DomainErrorKind, Error, PipelineErrorKind};
use crate::gateway::zoom::RecordingResponse;
use chrono::{DateTime, NaiveDate, Utc};
use entity::{meetings, zoom_meetings, Id};
use entity_api::error::Error as EntityApiError;
use entity_api::{meeting, zoom_meeting};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};

/// Title used when a recording carries no topic.
const FALLBACK_MEETING_TITLE: &str = "Zoom Meeting";

/// The subset of recording metadata the reconciler needs.
#[derive(Clone, Debug)]
pub struct RecordingMetadata {
    pub zoom_meeting_id: String,
    pub zoom_uuid: Option<String>,
    pub topic: Option<String>,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
}

impl RecordingMetadata {
    pub fn title(&self) -> String {
        self.topic
            .as_deref()
            .filter(|topic| !topic.trim().is_empty())
            .unwrap_or(FALLBACK_MEETING_TITLE)
            .to_string()
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    pub fn duration(&self) -> Option<String> {
        self.duration_minutes
            .map(|minutes| format!("{minutes} minutes"))
    }
}

impl From<&RecordingResponse> for RecordingMetadata {
    fn from(recording: &RecordingResponse) -> Self {
        Self {
            zoom_meeting_id: recording.id.to_string(),
            zoom_uuid: Some(recording.uuid.clone()),
            topic: recording.topic.clone(),
            start_time: recording.start_time,
            duration_minutes: recording.duration,
        }
    }
}

/// Finds a meeting by id, scoped to the requesting user.
///
/// Fails closed with `MeetingNotFound` when the meeting does not exist or
/// belongs to another user.
pub async fn find_for_user(
    db: &DatabaseConnection,
    user_id: Id,
    meeting_id: Id,
) -> Result<meetings::Model, Error> {
    meeting::find_by_id_for_user(db, meeting_id, user_id)
        .await
        .map_err(|err| {
            if err.error_kind == entity_api::error::EntityApiErrorKind::RecordNotFound {
                Error::pipeline(PipelineErrorKind::MeetingNotFound)
            } else {
                err.into()
            }
        })
}

/// Finds or creates the meeting row for a Zoom recording and writes the
/// transcript onto it. Returns the reconciled meeting with the transcript
/// attached.
pub async fn reconcile_zoom_meeting(
    db: &DatabaseConnection,
    user_id: Id,
    metadata: &RecordingMetadata,
    transcript: &str,
) -> Result<meetings::Model, Error> {
    if let Some(link) =
        zoom_meeting::find_by_user_and_zoom_id(db, user_id, &metadata.zoom_meeting_id).await?
    {
        debug!(
            "Zoom meeting {} already reconciled to meeting {}",
            metadata.zoom_meeting_id, link.meeting_id
        );
        return attach_transcript(db, link.meeting_id, transcript).await;
    }

    match create_linked_meeting(db, user_id, metadata, transcript).await? {
        Some(created) => Ok(created),
        None => {
            // A concurrent run inserted the link first. Re-read its meeting.
            info!(
                "Concurrent reconciliation won for zoom meeting {}, reusing its row",
                metadata.zoom_meeting_id
            );
            let link =
                zoom_meeting::find_by_user_and_zoom_id(db, user_id, &metadata.zoom_meeting_id)
                    .await?
                    .ok_or_else(|| Error::pipeline(PipelineErrorKind::MeetingNotFound))?;
            attach_transcript(db, link.meeting_id, transcript).await
        }
    }
}

/// Inserts the meeting and its linking record in one transaction. Returns
/// `Ok(None)` when the unique index rejected the link, leaving no rows behind.
async fn create_linked_meeting(
    db: &DatabaseConnection,
    user_id: Id,
    metadata: &RecordingMetadata,
    transcript: &str,
) -> Result<Option<meetings::Model>, Error> {
    let txn = db.begin().await.map_err(EntityApiError::from)?;
    let now = Utc::now();

    let created = meeting::create(
        &txn,
        meetings::Model {
            id: Id::default(),
            user_id,
            title: metadata.title(),
            date: metadata.date(),
            duration: metadata.duration(),
            transcript: Some(transcript.to_string()),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    let link = zoom_meeting::create_ignoring_conflict(
        &txn,
        zoom_meetings::Model {
            id: Id::default(),
            user_id,
            meeting_id: created.id,
            zoom_meeting_id: metadata.zoom_meeting_id.clone(),
            zoom_uuid: metadata.zoom_uuid.clone(),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    match link {
        Some(_) => {
            txn.commit().await.map_err(EntityApiError::from)?;
            Ok(Some(created))
        }
        None => {
            txn.rollback().await.map_err(EntityApiError::from)?;
            Ok(None)
        }
    }
}

/// Writes the transcript onto an existing meeting. Failures map to
/// `PersistenceError` since the transcript save is the first durable write
/// of a pipeline run.
pub async fn attach_transcript(
    db: &DatabaseConnection,
    meeting_id: Id,
    transcript: &str,
) -> Result<meetings::Model, Error> {
    meeting::update_transcript(db, meeting_id, transcript)
        .await
        .map_err(|err| Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Pipeline(PipelineErrorKind::PersistenceError),
        })
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn metadata() -> RecordingMetadata {
        RecordingMetadata {
            zoom_meeting_id: "123456789".to_string(),
            zoom_uuid: Some("abc==".to_string()),
            topic: Some("Sprint Planning".to_string()),
            start_time: "2024-01-15T10:00:00Z".parse().unwrap(),
            duration_minutes: Some(45),
        }
    }

    fn meeting_row(id: Id, user_id: Id, transcript: Option<&str>) -> meetings::Model {
        let now = Utc::now();
        meetings::Model {
            id,
            user_id,
            title: "Sprint Planning".to_string(),
            date: "2024-01-15".parse().unwrap(),
            duration: Some("45 minutes".to_string()),
            transcript: transcript.map(str::to_string),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn link_row(user_id: Id, meeting_id: Id) -> zoom_meetings::Model {
        let now = Utc::now();
        zoom_meetings::Model {
            id: Id::new_v4(),
            user_id,
            meeting_id,
            zoom_meeting_id: "123456789".to_string(),
            zoom_uuid: Some("abc==".to_string()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn metadata_derives_title_date_and_duration() {
        let metadata = metadata();
        assert_eq!(metadata.title(), "Sprint Planning");
        assert_eq!(metadata.date(), "2024-01-15".parse::<NaiveDate>().unwrap());
        assert_eq!(metadata.duration(), Some("45 minutes".to_string()));
    }

    #[test]
    fn metadata_falls_back_to_a_generic_title() {
        let mut metadata = metadata();
        metadata.topic = None;
        assert_eq!(metadata.title(), "Zoom Meeting");

        metadata.topic = Some("   ".to_string());
        assert_eq!(metadata.title(), "Zoom Meeting");
    }

    #[tokio::test]
    async fn second_reconciliation_reuses_the_existing_meeting() {
        let user_id = Id::new_v4();
        let meeting_id = Id::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // Link lookup finds the row created by the first run
            .append_query_results(vec![vec![link_row(user_id, meeting_id)]])
            // Transcript update reads then writes the same meeting
            .append_query_results(vec![vec![meeting_row(meeting_id, user_id, None)]])
            .append_query_results(vec![vec![meeting_row(
                meeting_id,
                user_id,
                Some("Hello world again"),
            )]])
            .into_connection();

        let reconciled = reconcile_zoom_meeting(&db, user_id, &metadata(), "Hello world again")
            .await
            .unwrap();

        assert_eq!(reconciled.id, meeting_id);
        assert_eq!(reconciled.transcript.as_deref(), Some("Hello world again"));
    }

    #[tokio::test]
    async fn first_reconciliation_creates_meeting_and_link() {
        let user_id = Id::new_v4();
        let meeting_id = Id::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // No link yet
            .append_query_results::<zoom_meetings::Model, Vec<_>, _>(vec![vec![]])
            // Meeting insert returning
            .append_query_results(vec![vec![meeting_row(
                meeting_id,
                user_id,
                Some("Hello world again"),
            )]])
            // Link insert returning
            .append_query_results(vec![vec![link_row(user_id, meeting_id)]])
            .into_connection();

        let reconciled = reconcile_zoom_meeting(&db, user_id, &metadata(), "Hello world again")
            .await
            .unwrap();

        assert_eq!(reconciled.id, meeting_id);
    }

    #[tokio::test]
    async fn find_for_user_fails_closed_on_foreign_meeting() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<meetings::Model, Vec<_>, _>(vec![vec![]])
            .into_connection();

        let err = find_for_user(&db, Id::new_v4(), Id::new_v4())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Pipeline(PipelineErrorKind::MeetingNotFound)
        );
    }
}
