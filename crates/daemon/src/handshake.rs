//! Peer-side half of the key-agreement protocol
//!
//! The [`HandshakeClient`] drives one handshake attempt through a strict
//! phase sequence: fetch the server's public key, encapsulate locally, send
//! the ciphertext, and compare the server's reported secret against the local
//! one in constant time. `Mismatched` is terminal for the attempt; a retry is
//! a fresh attempt from `Start` (ciphertext randomness makes each attempt
//! independent, there are no application-level counters).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use url::Url;

use common::kem::{encapsulate, EncapsulationError, SharedSecret, PUBLIC_KEY_SIZE};

use crate::http_server::api::client::{ApiClient, ApiError};
use crate::http_server::api::decapsulate::DecapsulateRequest;
use crate::http_server::api::keys::PublicKeyRequest;

/// Phases of a single handshake attempt, in order. No transition may be
/// skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandshakePhase {
    Start,
    PublicKeyFetched,
    Encapsulated,
    CiphertextSent,
    SecretCompared,
}

/// Terminal result of a completed handshake attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    Matched,
    Mismatched,
}

/// Summary of a completed attempt, safe to display (no secret material)
#[derive(Debug, Clone)]
pub struct HandshakeReport {
    pub outcome: HandshakeOutcome,
    pub public_key_b64_len: usize,
    pub ciphertext_len: usize,
    pub server_secret_b64_len: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("failed to retrieve server public key: {0}")]
    KeyRetrieval(String),
    #[error("encapsulation failed: {0}")]
    Encapsulation(#[from] EncapsulationError),
    #[error("transport error: {0}")]
    Transport(#[from] ApiError),
    #[error("server returned a secret that is not valid base64")]
    MalformedServerSecret,
    #[error("handshake phase violation: {from:?} -> {to:?}")]
    OutOfOrder {
        from: HandshakePhase,
        to: HandshakePhase,
    },
}

/// Client for performing the peer-side half of the protocol
///
/// Useful both as a library for real clients and as the verification logic an
/// end-to-end test exercises.
pub struct HandshakeClient {
    api: ApiClient,
    phase: HandshakePhase,
}

impl HandshakeClient {
    pub fn new(remote: &Url) -> Result<Self, HandshakeError> {
        Ok(Self {
            api: ApiClient::new(remote)?,
            phase: HandshakePhase::Start,
        })
    }

    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    /// Fetch and decode the server's KEM public key
    ///
    /// # Errors
    ///
    /// `Transport` on request failure or an error status; `KeyRetrieval` on
    /// undecodable base64 or wrong decoded length.
    pub async fn fetch_public_key(&mut self) -> Result<Vec<u8>, HandshakeError> {
        self.ensure(HandshakePhase::Start, HandshakePhase::PublicKeyFetched)?;

        let response = self.api.call(PublicKeyRequest).await?;

        let public_key = BASE64
            .decode(&response.kem_public_key)
            .map_err(|_| HandshakeError::KeyRetrieval("public key is not valid base64".into()))?;

        if public_key.len() != PUBLIC_KEY_SIZE {
            return Err(HandshakeError::KeyRetrieval(format!(
                "public key has wrong length, expected {}, got {}",
                PUBLIC_KEY_SIZE,
                public_key.len()
            )));
        }

        self.phase = HandshakePhase::PublicKeyFetched;
        tracing::debug!(key_len = public_key.len(), "fetched server public key");
        Ok(public_key)
    }

    /// Run one full handshake attempt from the current phase (must be `Start`)
    pub async fn run(&mut self) -> Result<HandshakeReport, HandshakeError> {
        let public_key = self.fetch_public_key().await?;

        self.ensure(HandshakePhase::PublicKeyFetched, HandshakePhase::Encapsulated)?;
        let (ciphertext, local_secret) = encapsulate(&public_key)?;
        let ciphertext_len = ciphertext.as_bytes().len();
        self.phase = HandshakePhase::Encapsulated;

        self.ensure(HandshakePhase::Encapsulated, HandshakePhase::CiphertextSent)?;
        let server_secret_b64 = self
            .api
            .call(DecapsulateRequest {
                ciphertext: BASE64.encode(ciphertext.as_bytes()),
            })
            .await?;
        self.phase = HandshakePhase::CiphertextSent;

        self.ensure(HandshakePhase::CiphertextSent, HandshakePhase::SecretCompared)?;
        let server_secret = BASE64
            .decode(&server_secret_b64)
            .map_err(|_| HandshakeError::MalformedServerSecret)?;

        let outcome = if verify_handshake(&server_secret, &local_secret) {
            HandshakeOutcome::Matched
        } else {
            HandshakeOutcome::Mismatched
        };
        local_secret.release();
        self.phase = HandshakePhase::SecretCompared;

        tracing::info!(?outcome, "handshake attempt complete");
        Ok(HandshakeReport {
            outcome,
            public_key_b64_len: BASE64.encode(&public_key).len(),
            ciphertext_len,
            server_secret_b64_len: server_secret_b64.len(),
        })
    }

    /// Phase guard: a step may only run from its expected predecessor, so no
    /// transition can be skipped and a finished attempt cannot be reused.
    fn ensure(&self, from: HandshakePhase, to: HandshakePhase) -> Result<(), HandshakeError> {
        if self.phase != from {
            return Err(HandshakeError::OutOfOrder {
                from: self.phase,
                to,
            });
        }
        Ok(())
    }
}

/// Constant-time comparison of the server-reported secret against the local
/// one. Never short-circuits on the first differing byte; a timing-sensitive
/// comparison here would leak secret bits over repeated attempts.
pub fn verify_handshake(server_reported_secret: &[u8], local_secret: &SharedSecret) -> bool {
    local_secret.ct_eq(server_reported_secret)
}
