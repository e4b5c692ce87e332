use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a pipeline run was asked to persist its results.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pipeline_run_type")]
pub enum PipelineRunType {
    /// Normal run: extracted tasks are persisted
    #[sea_orm(string_value = "live")]
    #[default]
    Live,
    /// Extraction only; results are audit-logged for offline review
    #[sea_orm(string_value = "dry_run")]
    DryRun,
}

impl std::fmt::Display for PipelineRunType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineRunType::Live => write!(fmt, "live"),
            PipelineRunType::DryRun => write!(fmt, "dry_run"),
        }
    }
}
