use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use qrledger_config::CorsConfig;
use qrledger_model::routes::{INDEX, STATIC_PREFIX};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{AppState, routes};

pub fn create_app(state: AppState) -> Router {
    let mut app = routes::create_api_router();

    if let Some(static_dir) = state.config().server.static_dir.clone() {
        let index = static_dir.join("index.html");
        if index.exists() {
            app = app.route_service(INDEX, ServeFile::new(index));
        } else {
            warn!(path = %index.display(), "static directory has no index.html");
        }
        info!(path = %static_dir.display(), "serving static assets");
        app = app.nest_service(STATIC_PREFIX, ServeDir::new(static_dir));
    }

    let cors_layer = cors_layer(&state.config().cors, state.config().dev_mode);

    app.layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive in dev mode, allow-list otherwise.
fn cors_layer(cors: &CorsConfig, dev_mode: bool) -> CorsLayer {
    if dev_mode {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
