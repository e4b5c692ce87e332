//! Persistence of validated task candidates.
//!
//! The transcript write and the bulk task insert share one transaction, so a
//! failed run leaves neither a stale transcript nor a partial task set behind.

use crate::error::{DomainErrorKind, Error, PipelineErrorKind};
use crate::extraction::TaskCandidate;
use entity::task_priority::TaskPriority;
use entity::{tasks, Id};
use entity_api::error::Error as EntityApiError;
use entity_api::{meeting, naive_date_parse_str, task};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};

/// Placeholder description for a candidate whose task text is blank.
const UNTITLED_TASK: &str = "Untitled task";

/// Sentinel assignee for a candidate with no named owner.
const UNASSIGNED: &str = "Unassigned";

/// Persists extracted candidates against a meeting, all-or-nothing.
///
/// Writes the transcript onto the meeting row and bulk-inserts one task per
/// candidate inside a single transaction. Any failure aborts with
/// `PersistenceError` and zero rows written by this call. Returns the number
/// of tasks inserted.
pub async fn persist_candidates(
    db: &DatabaseConnection,
    meeting_id: Id,
    user_id: Id,
    transcript: &str,
    candidates: &[TaskCandidate],
) -> Result<usize, Error> {
    let txn = db.begin().await.map_err(EntityApiError::from)?;

    meeting::update_transcript(&txn, meeting_id, transcript)
        .await
        .map_err(persistence_error)?;

    let models = candidates
        .iter()
        .map(|candidate| candidate_to_task(meeting_id, user_id, candidate))
        .collect();

    let count = task::create_batch(&txn, models)
        .await
        .map_err(persistence_error)?;

    txn.commit()
        .await
        .map_err(|e| persistence_error(EntityApiError::from(e)))?;

    info!("Persisted {count} task(s) for meeting {meeting_id}");
    Ok(count)
}

fn persistence_error(err: EntityApiError) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::Pipeline(PipelineErrorKind::PersistenceError),
    }
}

/// Maps a validated candidate to an insertable task row, applying defaults
/// for blank or missing fields.
pub fn candidate_to_task(meeting_id: Id, user_id: Id, candidate: &TaskCandidate) -> tasks::Model {
    let now = chrono::Utc::now();

    let description = if candidate.task.trim().is_empty() {
        UNTITLED_TASK.to_string()
    } else {
        candidate.task.clone()
    };

    let assignee = if candidate.assignee.trim().is_empty() {
        UNASSIGNED.to_string()
    } else {
        candidate.assignee.clone()
    };

    let due_by = candidate
        .due_date
        .as_deref()
        .and_then(|raw| naive_date_parse_str(raw).ok());

    tasks::Model {
        id: Id::default(),
        meeting_id,
        user_id,
        description,
        assignee,
        due_by,
        priority: TaskPriority::parse_lenient(candidate.priority.as_deref()),
        context: candidate.context.clone(),
        completed: false,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> TaskCandidate {
        TaskCandidate {
            task: "Send the report".to_string(),
            assignee: "John".to_string(),
            due_date: Some("2024-01-19".to_string()),
            priority: Some("Medium".to_string()),
            context: Some("standup".to_string()),
        }
    }

    #[test]
    fn maps_a_fully_specified_candidate() {
        let meeting_id = Id::new_v4();
        let user_id = Id::new_v4();

        let model = candidate_to_task(meeting_id, user_id, &candidate());

        assert_eq!(model.description, "Send the report");
        assert_eq!(model.assignee, "John");
        assert_eq!(model.due_by, Some("2024-01-19".parse().unwrap()));
        assert_eq!(model.priority, TaskPriority::Medium);
        assert_eq!(model.context.as_deref(), Some("standup"));
        assert!(!model.completed);
    }

    #[test]
    fn blank_fields_get_placeholder_defaults() {
        let mut blank = candidate();
        blank.task = "   ".to_string();
        blank.assignee = String::new();
        blank.priority = None;

        let model = candidate_to_task(Id::new_v4(), Id::new_v4(), &blank);

        assert_eq!(model.description, "Untitled task");
        assert_eq!(model.assignee, "Unassigned");
        assert_eq!(model.priority, TaskPriority::Medium);
    }

    #[test]
    fn unparseable_due_dates_become_none() {
        let mut bad_date = candidate();
        bad_date.due_date = Some("next Friday".to_string());

        let model = candidate_to_task(Id::new_v4(), Id::new_v4(), &bad_date);

        assert_eq!(model.due_by, None);
    }
}
