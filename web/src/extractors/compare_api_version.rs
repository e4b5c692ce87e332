use crate::extractors::RejectionType;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use semver::Version;
use service::config::ApiVersion;

/// Validates the `x-version` request header against the API versions this
/// server exposes. A missing header falls back to the current default
/// version; an unsupported one is rejected before the handler runs.
pub(crate) struct CompareApiVersion(pub Version);

#[async_trait]
impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let version_str = match parts.headers.get(ApiVersion::field_name()) {
            Some(value) => value.to_str().map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid {} header", ApiVersion::field_name()),
                )
            })?,
            None => ApiVersion::default_version(),
        };

        if !ApiVersion::versions().contains(&version_str) {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unsupported API version: {version_str}"),
            ));
        }

        let version = Version::parse(version_str).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("Unparseable API version: {version_str}"),
            )
        })?;

        Ok(CompareApiVersion(version))
    }
}
