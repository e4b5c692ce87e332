use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Priority assigned to an extracted task.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "PascalCase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_priority")]
pub enum TaskPriority {
    #[sea_orm(string_value = "high")]
    High,
    /// Default when the model omits or garbles the priority field
    #[sea_orm(string_value = "medium")]
    #[default]
    Medium,
    #[sea_orm(string_value = "low")]
    Low,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::High => write!(fmt, "high"),
            TaskPriority::Medium => write!(fmt, "medium"),
            TaskPriority::Low => write!(fmt, "low"),
        }
    }
}

impl TaskPriority {
    /// Parses the free-text priority the language model returns,
    /// falling back to Medium for anything unrecognized.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(ref v) if v == "high" => TaskPriority::High,
            Some(ref v) if v == "low" => TaskPriority::Low,
            _ => TaskPriority::Medium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lenient_accepts_known_priorities_case_insensitively() {
        assert_eq!(TaskPriority::parse_lenient(Some("High")), TaskPriority::High);
        assert_eq!(TaskPriority::parse_lenient(Some("LOW")), TaskPriority::Low);
        assert_eq!(
            TaskPriority::parse_lenient(Some("medium")),
            TaskPriority::Medium
        );
    }

    #[test]
    fn parse_lenient_defaults_to_medium() {
        assert_eq!(TaskPriority::parse_lenient(None), TaskPriority::Medium);
        assert_eq!(
            TaskPriority::parse_lenient(Some("urgent!!")),
            TaskPriority::Medium
        );
    }
}
