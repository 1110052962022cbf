use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::kem::VaultError;

use crate::http_server::api::client::ApiRequest;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct PublicKeyRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    /// Base64 encoding of the ML-KEM-1024 public key (1568 bytes decoded)
    pub kem_public_key: String,
}

pub async fn handler(State(state): State<ServiceState>) -> Result<impl IntoResponse, KeysError> {
    let public_key = state.vault().public_key()?;
    tracing::debug!(
        generation = state.vault().generation(),
        key_len = public_key.len(),
        "serving KEM public key"
    );

    Ok(Json(PublicKeyResponse {
        kem_public_key: BASE64.encode(&public_key),
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum KeysError {
    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
}

impl IntoResponse for KeysError {
    fn into_response(self) -> Response {
        tracing::error!("PUBLIC KEY ERROR: {:?}", self);
        match self {
            KeysError::Vault(VaultError::NotInitialized) => (
                http::StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": "no_active_key"})),
            )
                .into_response(),
            KeysError::Vault(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "internal"})),
            )
                .into_response(),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for PublicKeyRequest {
    type Response = PublicKeyResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/commsec/keys/pq").unwrap();
        client.get(full_url)
    }
}
