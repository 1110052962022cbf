//! Key custody for the server's long-lived ML-KEM keypair
//!
//! The vault holds exactly one active key generation at a time. Readers take
//! an `Arc` snapshot of the active generation, so rotation never blocks
//! in-flight decapsulations: the retired generation stays alive until its last
//! user drops the snapshot, and its secret key is zeroized at that point via
//! the keypair's `Drop` impl.
//!
//! Tests construct their own isolated `KeyVault` instances; there is no
//! process-wide singleton.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::primitive::{KeyGenerationError, KeyPair};

/// Errors that can occur during vault lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("key generation failed: {0}")]
    KeyGeneration(#[from] KeyGenerationError),
    #[error("no active key generation, vault is not initialized")]
    NotInitialized,
    #[error("vault is already initialized")]
    AlreadyInitialized,
    #[error("a key rotation is already in progress")]
    RotationInProgress,
}

/// A versioned keypair instance
///
/// Generation numbers are monotonic and start at 1; 0 means "never
/// initialized". Retired generations are read-only by construction since
/// nothing here exposes mutation.
struct KeyGeneration {
    number: u64,
    keypair: KeyPair,
}

/// Owns the server's KEM keypair and scopes all access to the private key
///
/// Cheap to share behind an `Arc`; all methods take `&self`. The swap lock is
/// held only for keypair generation and the pointer exchange, never across
/// decapsulation or I/O.
pub struct KeyVault {
    active: RwLock<Option<Arc<KeyGeneration>>>,
    // serializes initialize() and rotate() so exactly one keypair is ever
    // produced per generation
    swap: Mutex<()>,
    generation: AtomicU64,
}

impl Default for KeyVault {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyVault {
    /// Create an empty vault; call [`initialize`](Self::initialize) before serving
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
            swap: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Generate the first keypair and activate it
    ///
    /// Must be called exactly once before serving traffic. Concurrent calls
    /// are serialized; losers observe the winner's generation and fail with
    /// `AlreadyInitialized`.
    pub fn initialize(&self) -> Result<u64, VaultError> {
        let _guard = self.swap.lock();
        if self.active.read().is_some() {
            return Err(VaultError::AlreadyInitialized);
        }
        let keypair = KeyPair::generate()?;
        let number = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(generation = number, algorithm = %keypair.algorithm(), "KEM keypair generated");
        *self.active.write() = Some(Arc::new(KeyGeneration { number, keypair }));
        Ok(number)
    }

    /// Whether the vault currently holds an active keypair
    pub fn is_initialized(&self) -> bool {
        self.active.read().is_some()
    }

    /// The active generation number (0 if uninitialized)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Immutable copy of the current active public key
    ///
    /// Safe to call concurrently and unboundedly.
    pub fn public_key(&self) -> Result<Vec<u8>, VaultError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.keypair.public_key().to_vec())
    }

    /// Scoped access to the private key for the duration of `f`
    ///
    /// `f` receives the raw secret key bytes of a snapshot of the active
    /// generation; no reference escapes the call, and no lock is held while
    /// `f` runs, so concurrent read-only use by simultaneous decapsulations
    /// is unrestricted (the primitive's decapsulate is a pure function).
    pub fn with_private_key<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, VaultError> {
        let snapshot = self.snapshot()?;
        Ok(f(snapshot.keypair.secret_key_bytes()))
    }

    /// Generate a new keypair and atomically swap it in
    ///
    /// In-flight decapsulations holding a snapshot of the previous generation
    /// drain undisturbed; the retired keypair is zeroized when the last
    /// snapshot drops. Fails fast if another rotation is pending.
    pub fn rotate(&self) -> Result<u64, VaultError> {
        let _guard = self.swap.try_lock().ok_or(VaultError::RotationInProgress)?;
        if self.active.read().is_none() {
            return Err(VaultError::NotInitialized);
        }
        let keypair = KeyPair::generate()?;
        let number = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self
            .active
            .write()
            .replace(Arc::new(KeyGeneration { number, keypair }));
        if let Some(prev) = previous {
            tracing::info!(
                retired = prev.number,
                active = number,
                in_flight_refs = Arc::strong_count(&prev) - 1,
                "KEM keypair rotated"
            );
        }
        Ok(number)
    }

    fn snapshot(&self) -> Result<Arc<KeyGeneration>, VaultError> {
        self.active.read().clone().ok_or(VaultError::NotInitialized)
    }
}
