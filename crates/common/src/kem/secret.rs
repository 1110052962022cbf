//! Shared secret handle with bounded, explicit lifetime
//!
//! A [`SharedSecret`] is deliberately move-only: it does not implement `Clone`,
//! so the 32 bytes of agreed key material exist in exactly one place until the
//! handle is dropped (or explicitly released), at which point the buffer is
//! overwritten with zeros before deallocation. Comparison is constant-time via
//! `subtle` and never short-circuits on the first differing byte.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::primitive::SHARED_SECRET_SIZE;

/// Errors that can occur constructing a shared secret from raw bytes
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("invalid shared secret size, expected {expected}, got {actual}")]
    InvalidSize { expected: usize, actual: usize },
}

/// A 256-bit shared secret derived from KEM encapsulation or decapsulation
///
/// Owned exclusively by whichever component derived it. Move-only by contract;
/// the only copy beyond this buffer is whatever the caller encodes for
/// transport, which is the caller's responsibility to bound.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; SHARED_SECRET_SIZE]);

impl SharedSecret {
    /// Wrap secret bytes handed back by the KEM primitive
    ///
    /// Panics if the primitive ever yields a wrong-sized secret, which would
    /// violate its fixed contract.
    pub(crate) fn from_primitive(bytes: &[u8]) -> Self {
        let mut buff = [0u8; SHARED_SECRET_SIZE];
        buff.copy_from_slice(bytes);
        Self(buff)
    }

    /// Create a shared secret from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `SHARED_SECRET_SIZE`.
    pub fn from_slice(data: &[u8]) -> Result<Self, SecretError> {
        if data.len() != SHARED_SECRET_SIZE {
            return Err(SecretError::InvalidSize {
                expected: SHARED_SECRET_SIZE,
                actual: data.len(),
            });
        }
        let mut buff = [0u8; SHARED_SECRET_SIZE];
        buff.copy_from_slice(data);
        Ok(Self(buff))
    }

    /// Read-only view of the secret bytes, for transport encoding
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }

    /// Constant-time equality against raw bytes
    ///
    /// Length is the only early exit; for equal-length inputs every byte is
    /// always examined. A timing-sensitive comparison here would leak secret
    /// bits over repeated handshake attempts.
    pub fn ct_eq(&self, other: &[u8]) -> bool {
        if other.len() != SHARED_SECRET_SIZE {
            return false;
        }
        self.0.ct_eq(other).into()
    }

    /// Explicitly zeroize and consume the secret
    pub fn release(mut self) {
        self.0.zeroize();
    }
}

// Intentionally opaque: secret bytes must never reach logs or error messages.
impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret([REDACTED; {}])", SHARED_SECRET_SIZE)
    }
}
