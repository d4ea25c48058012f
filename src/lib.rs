//! Faucet Sweeper Library
//!
//! Bulk-provisions custodial testnet wallets through a wallet-as-a-service
//! platform, funds them from the faucet and sweeps every balance to a single
//! destination, leaving a share of the native token behind for fees.

pub mod amount;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod pipeline;
pub mod platform;

// Re-export commonly used types
pub use amount::Amount;
pub use config::Config;
pub use error::{Error, Result};
