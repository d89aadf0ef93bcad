use axum::{
    Router,
    routing::{get, post},
};
use qrledger_model::routes::{HEALTH, qrcodes};

use crate::{
    AppState,
    handlers::{health, qrcodes as handlers},
};

/// REST surface of the registry plus the health probe.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route(HEALTH, get(health::health_handler))
        .route(
            qrcodes::COLLECTION,
            get(handlers::list_qrcodes).post(handlers::create_qrcode),
        )
        .route(qrcodes::VERIFY, post(handlers::verify_qrcode))
        .route(qrcodes::STATS, get(handlers::qrcode_stats))
        .route(
            qrcodes::ITEM,
            get(handlers::get_qrcode).delete(handlers::delete_qrcode),
        )
}
