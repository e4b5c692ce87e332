//! HTTP surface for the extraction pipeline.

use axum::http::{
    header::{HeaderName, HeaderValue, CONTENT_TYPE},
    Method,
};
use axum_login::{
    tower_sessions::{Expiry, SessionManagerLayer},
    AuthManagerLayerBuilder,
};
use domain::user::Backend;
use log::*;
use std::error::Error as StdError;
use time::Duration;
use tower_http::cors::CorsLayer;
use tower_sessions_sqlx_store::{sqlx::PgPool, PostgresStore};

pub use error::Error;
pub use service::AppState;

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
mod router;

/// Binds the listener and serves the API until shutdown.
pub async fn init_server(app_state: AppState) -> Result<(), Box<dyn StdError + Send + Sync>> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app_state.config.port;
    let listen_addr = format!("{host}:{port}");

    // Sessions are stored alongside the application data so that restarting
    // the server does not log everyone out.
    let pool = PgPool::connect(app_state.config.database_url()).await?;
    let session_store = PostgresStore::new(pool)
        .with_schema_name("tasklens")?
        .with_table_name("sessions")?;
    session_store.migrate().await?;

    let session_expiry_secs = app_state.config.backend_session_expiry_seconds as i64;
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(app_state.config.is_production())
        .with_expiry(Expiry::OnInactivity(Duration::seconds(session_expiry_secs)))
        .with_always_save(true);

    let backend = Backend::new(&app_state.database_connection);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let cors_layer = build_cors_layer(&app_state.config.allowed_origins);

    let app = router::define_routes(app_state)
        .layer(auth_layer)
        .layer(cors_layer);

    info!("Server starting... listening for connections on http://{listen_addr}");

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unparseable CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-version")])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_layer_skips_unparseable_origins() {
        // Building the layer must not panic on garbage input
        let _layer = build_cors_layer(&[
            "http://localhost:3000".to_string(),
            "not a header value\u{0}".to_string(),
        ]);
    }
}
