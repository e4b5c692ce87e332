//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api`, and `web` is dependent on `domain`.
/// but `web` should not be dependent, directly, on `entity_api`. Each layer is free to define its own
/// error kinds to whatever richeness needed at that layer. Ultimately the various `error_kind`s are used
/// by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Pipeline(PipelineErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    DbTransaction,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Other(String),
}

/// Enum representing the distinct failure modes of a task extraction run.
/// Each variant carries enough information for the `web` layer to pick a
/// status code and for the audit trail to record a stable failure code.
#[derive(Debug, PartialEq)]
pub enum PipelineErrorKind {
    /// The transcript contained no usable content after normalization.
    EmptyTranscript,
    /// The referenced meeting does not exist or belongs to another user.
    MeetingNotFound,
    /// The model provider rejected the request with 429 on every attempt.
    RateLimited,
    /// The model provider rejected the configured credentials (401).
    InvalidCredentials,
    /// The model provider refused the request (403).
    Forbidden,
    /// The model provider returned a server error (5xx) on every attempt.
    ServiceError,
    /// The model returned output that failed schema validation on every
    /// attempt. Carries the raw text of the last response for auditing.
    InvalidSchema(String),
    /// Writing the extracted tasks to the database failed.
    PersistenceError,
    /// The model provider returned an unexpected client error status.
    Api(u16),
}

impl PipelineErrorKind {
    /// Stable machine-readable code recorded in the audit trail and
    /// returned to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineErrorKind::EmptyTranscript => "EMPTY_TRANSCRIPT",
            PipelineErrorKind::MeetingNotFound => "MEETING_NOT_FOUND",
            PipelineErrorKind::RateLimited => "RATE_LIMITED",
            PipelineErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            PipelineErrorKind::Forbidden => "FORBIDDEN",
            PipelineErrorKind::ServiceError => "SERVICE_ERROR",
            PipelineErrorKind::InvalidSchema(_) => "INVALID_MODEL_OUTPUT",
            PipelineErrorKind::PersistenceError => "PERSISTENCE_ERROR",
            PipelineErrorKind::Api(_) => "API_ERROR",
        }
    }
}

impl Error {
    /// Builds a pipeline error with no underlying source.
    pub fn pipeline(kind: PipelineErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Pipeline(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::InvalidQueryTerm => EntityErrorKind::Invalid,
            EntityApiErrorKind::RecordUnauthenticated => EntityErrorKind::Unauthenticated,
            _ => EntityErrorKind::Other("EntityErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_codes_are_stable() {
        assert_eq!(PipelineErrorKind::EmptyTranscript.code(), "EMPTY_TRANSCRIPT");
        assert_eq!(PipelineErrorKind::RateLimited.code(), "RATE_LIMITED");
        assert_eq!(
            PipelineErrorKind::InvalidSchema("not json".to_string()).code(),
            "INVALID_MODEL_OUTPUT"
        );
        assert_eq!(PipelineErrorKind::Api(418).code(), "API_ERROR");
    }

    #[test]
    fn entity_not_found_translates_to_domain_not_found() {
        let entity_err = EntityApiError {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        };
        let domain_err: Error = entity_err.into();
        assert_eq!(
            domain_err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
    }
}
