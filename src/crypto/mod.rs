//! Request authorization material
//!
//! Every state-changing platform call needs two fresh values:
//! - an [`IdempotencyKey`] so the platform can deduplicate the request
//! - an [`Envelope`], the entity secret encrypted to the platform key
//!
//! ```text
//! SecretSource ──┐
//!                ├─→ EnvelopeEncryptor ─→ Envelope (one per request)
//! PublicKeyPem ──┘
//! ```

pub mod envelope;
pub mod idempotency;
pub mod secret;

pub use envelope::{Envelope, EnvelopeEncryptor};
pub use idempotency::IdempotencyKey;
pub use secret::{EntitySecret, HexSecret, PublicKeyProvider, SecretSource, ENTITY_SECRET_LEN};
