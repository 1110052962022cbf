use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::kem::{DecapsulationError, VaultError};

use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DecapsulateRequest {
    /// Base64 encoding of an ML-KEM-1024 ciphertext (1568 bytes decoded)
    #[arg(long)]
    pub ciphertext: String,
}

/// On success the response body is the bare base64 JSON string of the derived
/// 32-byte shared secret, which is what the probe-side clients expect.
pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<DecapsulateRequest>,
) -> Result<impl IntoResponse, DecapsulateError> {
    let ciphertext = BASE64
        .decode(&req.ciphertext)
        .map_err(|_| DecapsulateError::InvalidEncoding)?;

    // Length errors reject before the private key is touched; anything of the
    // right length decapsulates uniformly (implicit rejection).
    let secret = state.engine().decapsulate(&ciphertext)?;

    tracing::debug!(
        generation = state.vault().generation(),
        ciphertext_len = ciphertext.len(),
        "decapsulated ciphertext"
    );

    // The secret is encoded once for transport and the handle dropped
    // (zeroized) immediately after.
    let encoded = BASE64.encode(secret.as_bytes());
    secret.release();

    Ok(Json(encoded))
}

#[derive(Debug, thiserror::Error)]
pub enum DecapsulateError {
    #[error("ciphertext is not valid base64")]
    InvalidEncoding,
    #[error("decapsulation error: {0}")]
    Decapsulation(#[from] DecapsulationError),
}

impl IntoResponse for DecapsulateError {
    fn into_response(self) -> Response {
        tracing::warn!("DECAPSULATE ERROR: {:?}", self);
        match self {
            DecapsulateError::InvalidEncoding => (
                http::StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "invalid_base64"})),
            )
                .into_response(),
            DecapsulateError::Decapsulation(DecapsulationError::MalformedCiphertext(e)) => (
                http::StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "malformed_ciphertext",
                    "expected_length": e.expected,
                    "actual_length": e.actual,
                })),
            )
                .into_response(),
            DecapsulateError::Decapsulation(DecapsulationError::Vault(
                VaultError::NotInitialized,
            )) => (
                http::StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": "no_active_key"})),
            )
                .into_response(),
            // Internal primitive/vault failures stay opaque: no distinguishable
            // "wrong key" signal ever leaves this handler.
            DecapsulateError::Decapsulation(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "internal"})),
            )
                .into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for DecapsulateRequest {
    type Response = String;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/commsec/decapsulate").unwrap();
        client.post(full_url).json(&self)
    }
}
