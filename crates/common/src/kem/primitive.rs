//! Typed wrapper around the ML-KEM-1024 primitive
//!
//! Everything in this file is plumbing around `pqcrypto-mlkem`: fixed-size
//! byte buffers in, fixed-size byte buffers out. Inputs are length-checked
//! before the primitive is ever invoked; the math itself is trusted as-is.

use pqcrypto_mlkem::mlkem1024;
use pqcrypto_traits::kem::{
    Ciphertext as CiphertextTrait, PublicKey as PublicKeyTrait, SecretKey as SecretKeyTrait,
    SharedSecret as SharedSecretTrait,
};
use zeroize::Zeroize;

use super::secret::SharedSecret;

/// Size of an ML-KEM-1024 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 1568;
/// Size of an ML-KEM-1024 secret key in bytes
pub const SECRET_KEY_SIZE: usize = 3168;
/// Size of an ML-KEM-1024 ciphertext in bytes
pub const CIPHERTEXT_SIZE: usize = 1568;
/// Size of the derived shared secret in bytes (256 bits)
pub const SHARED_SECRET_SIZE: usize = 32;

/// KEM algorithm identifier carried alongside key material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KemAlgorithm {
    MlKem1024,
}

impl std::fmt::Display for KemAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KemAlgorithm::MlKem1024 => write!(f, "ML-KEM-1024"),
        }
    }
}

/// Errors that can occur during keypair generation
#[derive(Debug, thiserror::Error)]
pub enum KeyGenerationError {
    #[error("primitive produced key material of unexpected size")]
    BadKeyMaterial,
}

/// Errors that can occur during encapsulation
#[derive(Debug, thiserror::Error)]
pub enum EncapsulationError {
    #[error("invalid public key size, expected {expected}, got {actual}")]
    InvalidPublicKey { expected: usize, actual: usize },
}

/// A ciphertext whose length does not match the primitive's fixed size
#[derive(Debug, thiserror::Error)]
#[error("invalid ciphertext size, expected {expected}, got {actual}")]
pub struct MalformedCiphertext {
    pub expected: usize,
    pub actual: usize,
}

/// An ML-KEM-1024 keypair
///
/// The secret key exists only in process memory and is zeroized when the
/// keypair is dropped. It is never serialized, logged, or transmitted; access
/// goes through [`KeyVault::with_private_key`](super::KeyVault::with_private_key).
pub struct KeyPair {
    algorithm: KemAlgorithm,
    public_key: Vec<u8>,
    secret_key: Vec<u8>,
}

impl KeyPair {
    /// Generate a fresh keypair from the primitive's internal CSPRNG
    pub fn generate() -> Result<Self, KeyGenerationError> {
        let (pk, sk) = mlkem1024::keypair();
        let public_key = pk.as_bytes().to_vec();
        let secret_key = sk.as_bytes().to_vec();
        if public_key.len() != PUBLIC_KEY_SIZE || secret_key.len() != SECRET_KEY_SIZE {
            return Err(KeyGenerationError::BadKeyMaterial);
        }
        Ok(Self {
            algorithm: KemAlgorithm::MlKem1024,
            public_key,
            secret_key,
        })
    }

    pub fn algorithm(&self) -> KemAlgorithm {
        self.algorithm
    }

    /// The public half, safe to copy and transmit
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Raw secret key bytes; only the vault hands these out, scoped
    pub(crate) fn secret_key_bytes(&self) -> &[u8] {
        &self.secret_key
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm)
            .field("public_key_len", &self.public_key.len())
            .finish_non_exhaustive()
    }
}

/// An ML-KEM-1024 ciphertext
///
/// Produced by [`encapsulate`], consumed by the peer's decapsulation. Carries
/// no ordering or replay protection; decapsulating the same ciphertext twice
/// yields the same secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    /// Create a ciphertext from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `CIPHERTEXT_SIZE`.
    pub fn from_slice(data: &[u8]) -> Result<Self, MalformedCiphertext> {
        if data.len() != CIPHERTEXT_SIZE {
            return Err(MalformedCiphertext {
                expected: CIPHERTEXT_SIZE,
                actual: data.len(),
            });
        }
        Ok(Self(data.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Encapsulate against a peer's public key
///
/// Returns the ciphertext to transmit and the locally derived shared secret.
/// The secret is exactly the value a correct decapsulation of the returned
/// ciphertext under the matching secret key will reproduce.
///
/// # Errors
///
/// Returns `InvalidPublicKey` if the public key is not exactly
/// `PUBLIC_KEY_SIZE` bytes; the primitive is not invoked in that case.
pub fn encapsulate(public_key: &[u8]) -> Result<(Ciphertext, SharedSecret), EncapsulationError> {
    if public_key.len() != PUBLIC_KEY_SIZE {
        return Err(EncapsulationError::InvalidPublicKey {
            expected: PUBLIC_KEY_SIZE,
            actual: public_key.len(),
        });
    }
    let pk = mlkem1024::PublicKey::from_bytes(public_key).map_err(|_| {
        EncapsulationError::InvalidPublicKey {
            expected: PUBLIC_KEY_SIZE,
            actual: public_key.len(),
        }
    })?;
    let (ss, ct) = mlkem1024::encapsulate(&pk);
    let secret = SharedSecret::from_primitive(ss.as_bytes());
    Ok((Ciphertext(ct.as_bytes().to_vec()), secret))
}

/// Decapsulate a length-validated ciphertext with raw secret key bytes
///
/// Callers are responsible for the length checks; this runs the primitive
/// unconditionally and uniformly. ML-KEM decapsulation is total, so this
/// never fails on ciphertext contents (implicit rejection).
pub(crate) fn decapsulate(secret_key: &[u8], ciphertext: &[u8]) -> SharedSecret {
    debug_assert_eq!(secret_key.len(), SECRET_KEY_SIZE);
    debug_assert_eq!(ciphertext.len(), CIPHERTEXT_SIZE);

    // from_bytes only inspects lengths, which are already validated
    let sk = mlkem1024::SecretKey::from_bytes(secret_key).expect("secret key size pre-validated");
    let ct = mlkem1024::Ciphertext::from_bytes(ciphertext).expect("ciphertext size pre-validated");
    let ss = mlkem1024::decapsulate(&ct, &sk);
    SharedSecret::from_primitive(ss.as_bytes())
}
