/**
 * Post-quantum key agreement core.
 *  - ML-KEM-1024 keypair custody (KeyVault)
 *  - Ciphertext decapsulation (DecapsulationEngine)
 *  - Move-only, zeroize-on-drop shared secrets
 * The lattice math itself lives in pqcrypto-mlkem and is
 *  treated as an opaque, trusted primitive.
 */
pub mod kem;

pub mod prelude {
    pub use crate::kem::{
        encapsulate, Ciphertext, DecapsulationEngine, KemAlgorithm, KeyPair, KeyVault,
        SharedSecret,
    };
    pub use crate::kem::{CIPHERTEXT_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE, SHARED_SECRET_SIZE};
}
