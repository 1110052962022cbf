//! ML-KEM-1024 key agreement for commsec
//!
//! This module provides the cryptographic core of the commsec service:
//!
//! - **Key custody**: a [`KeyVault`] owns the server's long-lived KEM keypair,
//!   publishes the public key, and scopes all private-key access
//! - **Decapsulation**: a [`DecapsulationEngine`] turns received ciphertexts
//!   into shared secrets with uniform timing and error shape
//! - **Secret hygiene**: [`SharedSecret`] is move-only and zeroized on drop
//!
//! # Security Model
//!
//! ## The primitive is a black box
//! The lattice math (keypair generation, encapsulate, decapsulate) comes from
//! `pqcrypto-mlkem` and is never reimplemented here. This module only handles
//! the byte buffers around it: length validation, lifecycle, and exposure.
//!
//! ## Implicit rejection
//! ML-KEM decapsulation is total: a well-formed-length ciphertext that was
//! never honestly encapsulated still yields a deterministic pseudorandom
//! secret rather than an observable error. The engine preserves this property
//! by never branching on ciphertext validity beyond the length check.
//!
//! ## Key lifecycle
//! Exactly one key generation is active at a time. Rotation swaps the active
//! pointer atomically; a retired generation stays alive (read-only) until the
//! last in-flight decapsulation releases it, then its secret key is zeroized.

mod engine;
mod primitive;
mod secret;
mod vault;

pub use engine::{DecapsulationEngine, DecapsulationError};
pub use primitive::{
    encapsulate, Ciphertext, EncapsulationError, KemAlgorithm, KeyGenerationError, KeyPair,
    MalformedCiphertext,
};
pub use primitive::{CIPHERTEXT_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE, SHARED_SECRET_SIZE};
pub use secret::{SecretError, SharedSecret};
pub use vault::{KeyVault, VaultError};
