//! Wallet-as-a-service platform access
//!
//! The pipeline only talks to [`WalletPlatform`]; [`CircleClient`] is the
//! HTTP implementation. Mutating calls take the idempotency key and envelope
//! by value so each pair is spent on exactly one request.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::crypto::{Envelope, IdempotencyKey};
use crate::error::Result;

pub use client::CircleClient;
pub use types::{
    FaucetDrip, FeeLevel, Token, TokenBalance, TransferAck, TransferRequest, Wallet, WalletSet,
};

#[async_trait]
pub trait WalletPlatform: Send + Sync {
    /// Current PEM-encoded RSA key used for entity secret envelopes
    async fn fetch_public_key(&self) -> Result<String>;

    async fn create_wallet_set(
        &self,
        key: IdempotencyKey,
        envelope: Envelope,
        name: &str,
    ) -> Result<WalletSet>;

    async fn create_wallets(
        &self,
        key: IdempotencyKey,
        envelope: Envelope,
        wallet_set_id: &str,
        blockchain: &str,
        count: u32,
    ) -> Result<Vec<Wallet>>;

    /// Ask the testnet faucet to drip funds; acceptance only, not arrival
    async fn fund_address(&self, address: &str, blockchain: &str, drip: &FaucetDrip) -> Result<()>;

    async fn get_wallet_balances(&self, wallet_id: &str) -> Result<Vec<TokenBalance>>;

    async fn make_transfer(
        &self,
        key: IdempotencyKey,
        envelope: Envelope,
        request: &TransferRequest,
    ) -> Result<TransferAck>;
}
