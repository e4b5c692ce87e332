use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
    PipelineErrorKind,
};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(pub DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message, code) = classify(&self.0);
        let body = Json(json!({
            "success": false,
            "error": message,
            "code": code,
        }));
        (status, body).into_response()
    }
}

/// Maps a domain error to the response status, user-facing message, and
/// stable machine-readable code. The message is deliberately distinct from
/// the internal classification and never echoes raw model output.
fn classify(err: &DomainError) -> (StatusCode, String, &'static str) {
    match &err.error_kind {
        DomainErrorKind::Pipeline(kind) => {
            let (status, message) = match kind {
                PipelineErrorKind::EmptyTranscript => (
                    StatusCode::BAD_REQUEST,
                    "The transcript is empty or too short to process.",
                ),
                PipelineErrorKind::MeetingNotFound => {
                    (StatusCode::NOT_FOUND, "Meeting not found.")
                }
                PipelineErrorKind::RateLimited => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "The AI service is busy, try again in a few minutes.",
                ),
                PipelineErrorKind::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "The configured credentials were rejected.",
                ),
                PipelineErrorKind::Forbidden => (
                    StatusCode::FORBIDDEN,
                    "The AI service refused the request.",
                ),
                PipelineErrorKind::ServiceError => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The AI service is unavailable, try again later.",
                ),
                PipelineErrorKind::InvalidSchema(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "The AI service returned an unusable response.",
                ),
                PipelineErrorKind::PersistenceError => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Saving the extracted tasks failed.",
                ),
                PipelineErrorKind::Api(_) => (
                    StatusCode::BAD_GATEWAY,
                    "The AI service returned an unexpected error.",
                ),
            };
            (status, message.to_string(), kind.code())
        }
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                EntityErrorKind::NotFound => (
                    StatusCode::NOT_FOUND,
                    "Not found.".to_string(),
                    "NOT_FOUND",
                ),
                EntityErrorKind::Invalid => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Invalid request.".to_string(),
                    "INVALID",
                ),
                EntityErrorKind::Unauthenticated => (
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized.".to_string(),
                    "UNAUTHORIZED",
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error.".to_string(),
                    "INTERNAL_ERROR",
                ),
            },
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.".to_string(),
                "INTERNAL_ERROR",
            ),
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Network => (
                StatusCode::BAD_GATEWAY,
                "An upstream service could not be reached.".to_string(),
                "NETWORK_ERROR",
            ),
            ExternalErrorKind::Other(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.".to_string(),
                "INTERNAL_ERROR",
            ),
        },
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_maps_to_429_with_friendly_message() {
        let err = DomainError::pipeline(PipelineErrorKind::RateLimited);
        let (status, message, code) = classify(&err);
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(message, "The AI service is busy, try again in a few minutes.");
        assert_eq!(code, "RATE_LIMITED");
    }

    #[test]
    fn invalid_schema_never_echoes_raw_model_output() {
        let err = DomainError::pipeline(PipelineErrorKind::InvalidSchema(
            "raw model text".to_string(),
        ));
        let (status, message, code) = classify(&err);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!message.contains("raw model text"));
        assert_eq!(code, "INVALID_MODEL_OUTPUT");
    }

    #[test]
    fn meeting_not_found_maps_to_404() {
        let err = DomainError::pipeline(PipelineErrorKind::MeetingNotFound);
        let (status, _, code) = classify(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "MEETING_NOT_FOUND");
    }

    #[test]
    fn upstream_status_maps_to_bad_gateway() {
        let err = DomainError::pipeline(PipelineErrorKind::Api(418));
        let (status, _, code) = classify(&err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "API_ERROR");
    }
}
