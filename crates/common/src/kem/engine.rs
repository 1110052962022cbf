//! Ciphertext decapsulation with uniform timing and error shape

use std::sync::Arc;

use super::primitive::{self, MalformedCiphertext, CIPHERTEXT_SIZE};
use super::secret::SharedSecret;
use super::vault::{KeyVault, VaultError};

/// Errors that can occur during decapsulation
#[derive(Debug, thiserror::Error)]
pub enum DecapsulationError {
    #[error(transparent)]
    MalformedCiphertext(#[from] MalformedCiphertext),
    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Turns received ciphertexts into shared secrets
///
/// The only observable branch is the up-front length check; a correct-length
/// ciphertext always reaches the primitive and always yields a fixed-size
/// secret (implicit rejection), so validity never leaks through timing or
/// error shape. The engine persists nothing: no ciphertexts, no secrets.
#[derive(Clone)]
pub struct DecapsulationEngine {
    vault: Arc<KeyVault>,
}

impl DecapsulationEngine {
    pub fn new(vault: Arc<KeyVault>) -> Self {
        Self { vault }
    }

    pub fn vault(&self) -> &Arc<KeyVault> {
        &self.vault
    }

    /// Decapsulate a ciphertext into a shared secret
    ///
    /// # Errors
    ///
    /// - `MalformedCiphertext` if the length is wrong; rejected before the
    ///   private key is touched
    /// - `Vault(NotInitialized)` if no key generation is active
    pub fn decapsulate(&self, ciphertext: &[u8]) -> Result<SharedSecret, DecapsulationError> {
        if ciphertext.len() != CIPHERTEXT_SIZE {
            return Err(MalformedCiphertext {
                expected: CIPHERTEXT_SIZE,
                actual: ciphertext.len(),
            }
            .into());
        }
        let secret = self
            .vault
            .with_private_key(|sk| primitive::decapsulate(sk, ciphertext))?;
        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kem::{encapsulate, SHARED_SECRET_SIZE};

    fn engine() -> DecapsulationEngine {
        let vault = Arc::new(KeyVault::new());
        vault.initialize().unwrap();
        DecapsulationEngine::new(vault)
    }

    #[test]
    fn test_roundtrip_through_engine() {
        let engine = engine();
        let pk = engine.vault().public_key().unwrap();
        let (ct, client_secret) = encapsulate(&pk).unwrap();

        let server_secret = engine.decapsulate(ct.as_bytes()).unwrap();
        assert!(client_secret.ct_eq(server_secret.as_bytes()));
    }

    #[test]
    fn test_short_ciphertext_rejected_before_primitive() {
        let engine = engine();
        let err = engine.decapsulate(&[0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            DecapsulationError::MalformedCiphertext(MalformedCiphertext {
                expected: CIPHERTEXT_SIZE,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_garbage_of_correct_length_still_decapsulates() {
        let engine = engine();
        // implicit rejection: no error, just a pseudorandom secret
        let secret = engine.decapsulate(&[0xA5; CIPHERTEXT_SIZE]).unwrap();
        assert_eq!(secret.as_bytes().len(), SHARED_SECRET_SIZE);
    }

    #[test]
    fn test_uninitialized_vault_yields_vault_error() {
        let engine = DecapsulationEngine::new(Arc::new(KeyVault::new()));
        let err = engine.decapsulate(&[0u8; CIPHERTEXT_SIZE]).unwrap_err();
        assert!(matches!(
            err,
            DecapsulationError::Vault(VaultError::NotInitialized)
        ));
    }
}
