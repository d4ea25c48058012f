//! Entity secret envelopes
//!
//! Every mutating platform call carries the entity secret encrypted to the
//! platform's RSA key with OAEP(SHA-256). OAEP padding is randomized, so a
//! fresh envelope is produced for each request and never reused.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;
use tracing::debug;

use super::secret::{SecretSource, ENTITY_SECRET_LEN};
use crate::error::{Error, Result};

/// Base64 ciphertext of the entity secret, good for one request
///
/// Not `Clone` for the same reason as [`super::IdempotencyKey`].
#[derive(PartialEq, Eq)]
pub struct Envelope(String);

impl Envelope {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Envelope({} chars)", self.0.len())
    }
}

/// Produces envelopes from a secret source and the platform key
pub struct EnvelopeEncryptor {
    secret: Box<dyn SecretSource>,
    public_key: RsaPublicKey,
}

impl EnvelopeEncryptor {
    /// Build an encryptor from a PEM-encoded RSA public key
    ///
    /// Accepts SubjectPublicKeyInfo (`PUBLIC KEY`) and PKCS#1
    /// (`RSA PUBLIC KEY`) encodings. Anything else, including non-RSA
    /// keys, is a crypto error.
    pub fn from_pem(secret: impl SecretSource + 'static, public_key_pem: &str) -> Result<Self> {
        let public_key = parse_rsa_public_key(public_key_pem)?;
        Ok(Self {
            secret: Box::new(secret),
            public_key,
        })
    }

    /// Encrypt the entity secret for a single request
    pub fn generate_envelope(&self) -> Result<Envelope> {
        let secret = self.secret.entity_secret()?;
        if secret.len() != ENTITY_SECRET_LEN {
            return Err(Error::Crypto(format!(
                "Invalid entity secret: expected {} bytes, got {}",
                ENTITY_SECRET_LEN,
                secret.len()
            )));
        }

        let ciphertext = self
            .public_key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), secret.as_bytes())
            .map_err(|e| Error::Crypto(format!("OAEP encryption failed: {}", e)))?;

        debug!("Generated envelope ({} byte ciphertext)", ciphertext.len());
        Ok(Envelope(STANDARD.encode(ciphertext)))
    }
}

/// Parse an RSA public key from SPKI or PKCS#1 PEM
pub fn parse_rsa_public_key(pem: &str) -> Result<RsaPublicKey> {
    let pem = pem.trim();

    if pem.contains("BEGIN RSA PUBLIC KEY") {
        return RsaPublicKey::from_pkcs1_pem(pem)
            .map_err(|e| Error::Crypto(format!("Failed to parse PKCS#1 public key: {}", e)));
    }

    if !pem.contains("BEGIN PUBLIC KEY") {
        return Err(Error::Crypto(
            "Failed to parse PEM block containing the key".to_string(),
        ));
    }

    RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| Error::Crypto(format!("Key is not a usable RSA public key: {}", e)))
}
