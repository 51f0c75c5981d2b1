mod error;
mod handlers;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::db::Database;

pub use error::ApiError;

/// Settings for the HTTP layer.
#[derive(Clone, Debug, Default)]
pub struct ApiConfig {
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl ApiConfig {
    /// Create a config restricted to specific CORS origins.
    pub fn with_cors_origins(origins: Vec<String>) -> Self {
        Self {
            cors_origins: Some(origins),
        }
    }

    fn cors_layer(&self) -> CorsLayer {
        let Some(origins) = &self.cors_origins else {
            return CorsLayer::permissive();
        };

        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

pub fn create_router(db: Database) -> Router {
    create_router_with_config(db, ApiConfig::default())
}

pub fn create_router_with_config(db: Database, config: ApiConfig) -> Router {
    Router::new()
        .route("/create", post(handlers::create_note))
        .route("/update", post(handlers::update_note))
        .route("/delete/{id}", post(handlers::delete_note))
        .route("/get/{id}", get(handlers::get_note))
        .route("/get-all", get(handlers::list_notes))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(config.cors_layer())
        .with_state(db)
}
