//! Entity secret and platform public key material
//!
//! The entity secret is only ever reached through [`SecretSource`], so where
//! it lives (config value, secret manager, HSM) can change without touching
//! the envelope encryptor.

use std::fmt;

use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::platform::WalletPlatform;

/// Required entity secret length in bytes
pub const ENTITY_SECRET_LEN: usize = 32;

/// Raw entity secret bytes, wiped on drop
#[derive(Clone)]
pub struct EntitySecret(Zeroizing<Vec<u8>>);

impl EntitySecret {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Decode a hex-encoded secret (the form the platform console hands out)
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| Error::Config(format!("Entity secret is not valid hex: {}", e)))?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EntitySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EntitySecret(***)")
    }
}

/// Narrow accessor for the entity secret
pub trait SecretSource: Send + Sync {
    fn entity_secret(&self) -> Result<EntitySecret>;
}

impl SecretSource for EntitySecret {
    fn entity_secret(&self) -> Result<EntitySecret> {
        Ok(self.clone())
    }
}

/// Secret held as the hex string it was configured with
pub struct HexSecret(Zeroizing<String>);

impl HexSecret {
    pub fn new(hex_str: impl Into<String>) -> Self {
        Self(Zeroizing::new(hex_str.into()))
    }

    /// Fail fast on a secret that can never produce a valid envelope
    pub fn validate(&self) -> Result<()> {
        let secret = self.entity_secret()?;
        if secret.len() != ENTITY_SECRET_LEN {
            return Err(Error::Config(format!(
                "Entity secret must be {} bytes, got {}",
                ENTITY_SECRET_LEN,
                secret.len()
            )));
        }
        Ok(())
    }
}

impl SecretSource for HexSecret {
    fn entity_secret(&self) -> Result<EntitySecret> {
        EntitySecret::from_hex(&self.0)
    }
}

/// Where the platform's RSA public key comes from
#[derive(Debug, Clone)]
pub enum PublicKeyProvider {
    /// PEM supplied through configuration
    Configured(String),
    /// Fetch the current key from the platform
    Fetch,
}

impl PublicKeyProvider {
    pub fn from_config(public_key: Option<&str>) -> Self {
        match public_key.map(str::trim) {
            Some(pem) if !pem.is_empty() => Self::Configured(pem.to_string()),
            _ => Self::Fetch,
        }
    }

    /// Resolve to PEM text
    pub async fn resolve(&self, platform: &dyn WalletPlatform) -> Result<String> {
        match self {
            Self::Configured(pem) => Ok(pem.clone()),
            Self::Fetch => {
                debug!("No public key configured, fetching from platform");
                platform.fetch_public_key().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_secret_roundtrip_length() {
        let source = HexSecret::new("ab".repeat(32));
        let secret = source.entity_secret().unwrap();
        assert_eq!(secret.len(), ENTITY_SECRET_LEN);
        assert_eq!(secret.as_bytes()[0], 0xab);
        assert!(source.validate().is_ok());
    }

    #[test]
    fn test_hex_secret_wrong_length_is_config_error() {
        let source = HexSecret::new("ab".repeat(31));
        assert!(matches!(source.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_hex_secret_not_hex() {
        let source = HexSecret::new("zz".repeat(32));
        assert!(matches!(source.entity_secret(), Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = EntitySecret::from_bytes(vec![0x42; 32]);
        let shown = format!("{:?}", secret);
        assert_eq!(shown, "EntitySecret(***)");
        assert!(!shown.contains("42"));
    }

    #[tokio::test]
    async fn test_public_key_provider_resolves() {
        use crate::pipeline::testing::FakePlatform;

        let platform = FakePlatform::default();
        let fetched = PublicKeyProvider::Fetch.resolve(&platform).await.unwrap();
        assert!(fetched.contains("BEGIN PUBLIC KEY"));

        let configured = PublicKeyProvider::Configured("pem".into())
            .resolve(&platform)
            .await
            .unwrap();
        assert_eq!(configured, "pem");
    }

    #[test]
    fn test_public_key_provider_from_config() {
        assert!(matches!(
            PublicKeyProvider::from_config(Some("-----BEGIN PUBLIC KEY-----")),
            PublicKeyProvider::Configured(_)
        ));
        assert!(matches!(PublicKeyProvider::from_config(Some("  ")), PublicKeyProvider::Fetch));
        assert!(matches!(PublicKeyProvider::from_config(None), PublicKeyProvider::Fetch));
    }
}
