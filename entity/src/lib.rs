use uuid::Uuid;

// Core entities
pub mod meetings;
pub mod tasks;
pub mod users;

// Extraction pipeline entities
pub mod pipeline_failures;
pub mod pipeline_run;
pub mod task_priority;
pub mod user_integrations;
pub mod zoom_meetings;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
