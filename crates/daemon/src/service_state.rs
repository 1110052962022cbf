use std::sync::Arc;

use common::kem::{DecapsulationEngine, KeyVault, VaultError};

use crate::service_config::Config;

/// Main service state - owns the key vault and decapsulation engine
///
/// Explicitly constructed and passed by reference (axum state), never a
/// process-wide global, so tests instantiate isolated instances per case.
#[derive(Clone)]
pub struct State {
    vault: Arc<KeyVault>,
    engine: DecapsulationEngine,
}

impl State {
    /// Build state from config, generating the service keypair at startup.
    ///
    /// The keypair lives in volatile memory only and is regenerated on every
    /// process start; a key generation failure here is fatal to startup.
    pub fn from_config(_config: &Config) -> Result<Self, StateSetupError> {
        let vault = Arc::new(KeyVault::new());
        let generation = vault.initialize()?;
        tracing::info!(generation, "service keypair ready");
        Ok(Self::with_vault(vault))
    }

    /// Wrap an existing vault, initialized or not. Used by tests to exercise
    /// the not-yet-initialized paths of the HTTP surface.
    pub fn with_vault(vault: Arc<KeyVault>) -> Self {
        Self {
            engine: DecapsulationEngine::new(vault.clone()),
            vault,
        }
    }

    pub fn vault(&self) -> &Arc<KeyVault> {
        &self.vault
    }

    pub fn engine(&self) -> &DecapsulationEngine {
        &self.engine
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to set up key vault: {0}")]
    Vault(#[from] VaultError),
}
