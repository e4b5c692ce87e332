//! Core business logic for transcript-to-task extraction.
//!
//! Re-exports the entity types consumed by upper layers so that the `web`
//! crate does not depend on `entity_api` directly.

pub use entity_api::{
    meetings, pipeline_failures, pipeline_run, task_priority, tasks, user_integrations, users,
    zoom_meetings, Id,
};

pub mod audit;
pub mod error;
pub mod extraction;
pub mod gateway;
pub mod meeting;
pub mod pipeline;
pub mod task;
pub mod transcript;

pub mod user {
    //! Session-auth plumbing re-exported for the `web` layer.
    pub use entity_api::user::{AuthSession, Backend, Credentials};
}
