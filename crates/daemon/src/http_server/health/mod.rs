use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

mod readiness;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/livez", get(livez_handler))
        .route("/readyz", get(readiness::handler))
        .with_state(state)
}

/// Process liveness: answering at all is the signal.
async fn livez_handler() -> impl IntoResponse {
    let msg = serde_json::json!({"status": "ok"});
    (StatusCode::OK, Json(msg))
}
