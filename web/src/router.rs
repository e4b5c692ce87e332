use crate::{controller::health_check_controller, middleware::auth::require_auth, params, AppState};
use axum::{
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};

use crate::controller::{
    task_extraction_controller, user_session_controller, zoom_extraction_controller,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Tasklens API"
        ),
        paths(
            task_extraction_controller::extract,
            zoom_extraction_controller::extract,
            user_session_controller::login,
            user_session_controller::logout,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                domain::meetings::Model,
                domain::tasks::Model,
                domain::users::Model,
                domain::user::Credentials,
                params::extraction::ExtractTasksParams,
                params::extraction::ZoomExtractParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "tasklens", description = "Tasklens transcript-to-task extraction API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned from successful login via Set-Cookie header",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(extraction_routes(app_state))
        .merge(user_session_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn extraction_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/tasks/extract", post(task_extraction_controller::extract))
        .route(
            "/zoom/recordings/extract",
            post(zoom_extraction_controller::extract),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn user_session_routes() -> Router {
    Router::new()
        .route("/login", post(user_session_controller::login))
        .route("/logout", delete(user_session_controller::logout))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Rendering the document exercises every registered path and schema,
    // including the uuid and date field annotations on the entity models.
    #[test]
    fn openapi_document_renders_paths_and_schemas() {
        let doc = ApiDoc::openapi().to_json().unwrap();

        assert!(doc.contains("/tasks/extract"));
        assert!(doc.contains("/zoom/recordings/extract"));
        assert!(doc.contains("meetingId"));
        assert!(doc.contains("zoomMeetingId"));
        assert!(doc.contains("cookie_auth"));
    }
}
