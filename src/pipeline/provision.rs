//! Wallet set and wallet creation

use tracing::info;

use crate::crypto::{EnvelopeEncryptor, IdempotencyKey};
use crate::error::{Error, Result};
use crate::platform::{Wallet, WalletPlatform, WalletSet};

/// Creates the run's wallet set and its wallets
pub struct Provisioner<'a> {
    platform: &'a dyn WalletPlatform,
    encryptor: &'a EnvelopeEncryptor,
}

impl<'a> Provisioner<'a> {
    pub fn new(platform: &'a dyn WalletPlatform, encryptor: &'a EnvelopeEncryptor) -> Self {
        Self { platform, encryptor }
    }

    /// Create a wallet set named after its own idempotency key
    pub async fn create_wallet_set(&self) -> Result<WalletSet> {
        let key = IdempotencyKey::new();
        let name = key.name_prefix();
        let envelope = self.encryptor.generate_envelope()?;

        let wallet_set = self.platform.create_wallet_set(key, envelope, &name).await?;
        info!("WalletSet id: {} (name {})", wallet_set.id, wallet_set.name);
        Ok(wallet_set)
    }

    /// Create exactly `count` wallets on one blockchain
    pub async fn create_wallets(
        &self,
        wallet_set_id: &str,
        count: u32,
        blockchain: &str,
    ) -> Result<Vec<Wallet>> {
        let key = IdempotencyKey::new();
        let envelope = self.encryptor.generate_envelope()?;

        let wallets = self
            .platform
            .create_wallets(key, envelope, wallet_set_id, blockchain, count)
            .await?;

        if wallets.len() != count as usize {
            return Err(Error::Decode(format!(
                "Requested {} wallets, platform returned {}",
                count,
                wallets.len()
            )));
        }

        info!("Created {} wallets on {}", wallets.len(), blockchain);
        Ok(wallets)
    }
}
