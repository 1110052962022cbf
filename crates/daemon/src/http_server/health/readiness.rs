use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::ServiceState;

/// Readiness gates on the vault holding an active key generation; the service
/// cannot answer key fetches or decapsulations before that.
pub async fn handler(State(state): State<ServiceState>) -> Response {
    if state.vault().is_initialized() {
        let msg = serde_json::json!({
            "status": "ok",
            "key_generation": state.vault().generation(),
        });
        (StatusCode::OK, Json(msg)).into_response()
    } else {
        let msg = serde_json::json!({
            "status": "failure",
            "message": "no active KEM key generation"
        });
        (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::kem::KeyVault;

    use super::*;

    #[tokio::test]
    async fn test_handler_direct() {
        let vault = Arc::new(KeyVault::new());
        let state = ServiceState::with_vault(vault.clone());

        let response = handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        vault.initialize().unwrap();
        let response = handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
