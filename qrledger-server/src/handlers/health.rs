use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::AppState;

pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<Value>) {
    let mut body = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.storage.as_str(),
        "checks": {}
    });

    let status = match state.registry().count().await {
        Ok(total) => {
            body["checks"]["storage"] = json!({
                "status": "healthy",
                "total_qr_codes": total,
            });
            StatusCode::OK
        }
        Err(err) => {
            body["status"] = json!("unhealthy");
            body["checks"]["storage"] = json!({
                "status": "unhealthy",
                "error": err.to_string(),
            });
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status, Json(body))
}
