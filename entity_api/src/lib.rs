use chrono::Utc;
use password_auth::generate_hash;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

pub use entity::{
    meetings, pipeline_failures, pipeline_run, task_priority, tasks, user_integrations, users,
    zoom_meetings, Id,
};

pub mod error;
pub mod meeting;
pub mod pipeline_failure;
pub mod task;
pub mod user;
pub mod user_integration;
pub mod zoom_meeting;

pub fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}

/// Parses an ISO `%Y-%m-%d` date, the only due-date format the
/// extraction prompt asks the model for.
pub fn naive_date_parse_str(date_str: &str) -> Result<chrono::NaiveDate, error::Error> {
    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}

pub async fn seed_database(db: &DatabaseConnection) {
    let now = Utc::now();

    let demo_user: users::ActiveModel = users::ActiveModel {
        email: Set("demo@tasklens.app".to_owned()),
        first_name: Set("Demo".to_owned()),
        last_name: Set("User".to_owned()),
        display_name: Set(Some("Demo User".to_owned())),
        password: Set(generate_hash("password")),
        timezone: Set(Some("UTC".to_owned())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .save(db)
    .await
    .unwrap();

    meetings::ActiveModel {
        user_id: Set(demo_user.id.clone().unwrap()),
        title: Set("Weekly standup".to_owned()),
        date: Set(now.date_naive()),
        duration: Set(Some("30 minutes".to_owned())),
        transcript: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .save(db)
    .await
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_parse_str_parses_valid_uuid() {
        let uuid_str = "a98c3295-0933-44cb-89db-7db0f7250fb1";
        let uuid = uuid_parse_str(uuid_str).unwrap();
        assert_eq!(uuid.to_string(), uuid_str);
    }

    #[test]
    fn uuid_parse_str_returns_error_for_invalid_uuid() {
        let result = uuid_parse_str("invalid");
        assert!(result.is_err());
    }

    #[test]
    fn naive_date_parse_str_parses_valid_date() {
        let date = naive_date_parse_str("2024-01-19").unwrap();
        assert_eq!(date.to_string(), "2024-01-19");
    }

    #[test]
    fn naive_date_parse_str_returns_error_for_invalid_date() {
        assert!(naive_date_parse_str("next Friday").is_err());
    }
}
