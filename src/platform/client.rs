//! Circle Programmable Wallets API client
//!
//! Developer-controlled wallets ("W3S") plus the testnet faucet.
//!
//! API Documentation: https://developers.circle.com/w3s/reference
//!
//! Any non-2xx response is returned as [`Error::Platform`] with the raw body
//! attached. Nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::types::{
    BalancesData, DataEnvelope, FaucetDrip, FeeLevel, PublicKeyData, TokenBalance, TransferAck,
    TransferRequest, Wallet, WalletSet, WalletSetData, WalletsData,
};
use super::WalletPlatform;
use crate::amount::Amount;
use crate::crypto::{Envelope, IdempotencyKey};
use crate::error::{Error, Result};

/// Default API base URL
pub const CIRCLE_API_URL: &str = "https://api.circle.com/v1";

const PUBLIC_KEY_PATH: &str = "/w3s/config/entity/publicKey";
const WALLET_SETS_PATH: &str = "/w3s/developer/walletSets";
const WALLETS_PATH: &str = "/w3s/developer/wallets";
const FAUCET_PATH: &str = "/faucet/drips";
const TRANSFER_PATH: &str = "/w3s/developer/transactions/transfer";

/// Create wallet set request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateWalletSetBody<'a> {
    idempotency_key: String,
    entity_secret_cipher_text: String,
    name: &'a str,
}

/// Create wallets request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateWalletsBody<'a> {
    idempotency_key: String,
    entity_secret_cipher_text: String,
    blockchains: [&'a str; 1],
    count: u32,
    wallet_set_id: &'a str,
}

/// Faucet drip request
#[derive(Debug, Serialize)]
struct FaucetBody<'a> {
    address: &'a str,
    blockchain: &'a str,
    native: bool,
    usdc: bool,
    eurc: bool,
}

/// Token transfer request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferBody<'a> {
    idempotency_key: String,
    entity_secret_cipher_text: String,
    amounts: [&'a Amount; 1],
    fee_level: FeeLevel,
    token_id: &'a str,
    wallet_id: &'a str,
    destination_address: &'a str,
}

/// HTTP client for the wallet platform
pub struct CircleClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CircleClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. [`CIRCLE_API_URL`]
    /// * `api_key` - Bearer token for all requests
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Balances endpoint with the wallet id escaped as a single path segment
    fn balances_url(&self, wallet_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid api_url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("api_url {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["w3s", "wallets", wallet_id, "balances"]);
        Ok(url)
    }

    /// Send with auth, returning the body of a successful response
    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        check_status(status, body)
    }
}

/// Turn a non-2xx status into a platform error carrying the body
fn check_status(status: u16, body: String) -> Result<String> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(Error::Platform { status, body })
    }
}

/// Unwrap the `data` field of a platform response
fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T> {
    serde_json::from_str::<DataEnvelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| Error::Decode(format!("Unexpected {} response: {}", what, e)))
}

#[async_trait]
impl WalletPlatform for CircleClient {
    async fn fetch_public_key(&self) -> Result<String> {
        debug!("Fetching entity public key");
        let body = self.send(self.client.get(self.url(PUBLIC_KEY_PATH))).await?;
        let data: PublicKeyData = decode(&body, "public key")?;
        Ok(data.public_key)
    }

    async fn create_wallet_set(
        &self,
        key: IdempotencyKey,
        envelope: Envelope,
        name: &str,
    ) -> Result<WalletSet> {
        let body = CreateWalletSetBody {
            idempotency_key: key.to_string(),
            entity_secret_cipher_text: envelope.into_string(),
            name,
        };

        debug!("Creating wallet set {} (key {})", name, body.idempotency_key);
        let response = self
            .send(self.client.post(self.url(WALLET_SETS_PATH)).json(&body))
            .await?;

        let data: WalletSetData = decode(&response, "wallet set")?;
        Ok(data.wallet_set)
    }

    async fn create_wallets(
        &self,
        key: IdempotencyKey,
        envelope: Envelope,
        wallet_set_id: &str,
        blockchain: &str,
        count: u32,
    ) -> Result<Vec<Wallet>> {
        let body = CreateWalletsBody {
            idempotency_key: key.to_string(),
            entity_secret_cipher_text: envelope.into_string(),
            blockchains: [blockchain],
            count,
            wallet_set_id,
        };

        debug!(
            "Creating {} wallets on {} in set {} (key {})",
            count, blockchain, wallet_set_id, body.idempotency_key
        );
        let response = self
            .send(self.client.post(self.url(WALLETS_PATH)).json(&body))
            .await?;

        let data: WalletsData = decode(&response, "wallets")?;
        Ok(data.wallets)
    }

    async fn fund_address(&self, address: &str, blockchain: &str, drip: &FaucetDrip) -> Result<()> {
        let body = FaucetBody {
            address,
            blockchain,
            native: drip.native,
            usdc: drip.usdc,
            eurc: drip.eurc,
        };

        debug!("Requesting faucet drip for {} on {}", address, blockchain);
        self.send(self.client.post(self.url(FAUCET_PATH)).json(&body))
            .await?;
        Ok(())
    }

    async fn get_wallet_balances(&self, wallet_id: &str) -> Result<Vec<TokenBalance>> {
        let url = self.balances_url(wallet_id)?;
        let response = self.send(self.client.get(url)).await?;
        let data: BalancesData = decode(&response, "balances")?;
        Ok(data.token_balances)
    }

    async fn make_transfer(
        &self,
        key: IdempotencyKey,
        envelope: Envelope,
        request: &TransferRequest,
    ) -> Result<TransferAck> {
        let body = TransferBody {
            idempotency_key: key.to_string(),
            entity_secret_cipher_text: envelope.into_string(),
            amounts: [&request.amount],
            fee_level: request.fee_level,
            token_id: &request.token_id,
            wallet_id: &request.wallet_id,
            destination_address: &request.destination_address,
        };

        debug!(
            "Transferring {} of token {} from wallet {} (key {})",
            request.amount, request.token_id, request.wallet_id, body.idempotency_key
        );
        let response = self
            .send(self.client.post(self.url(TRANSFER_PATH)).json(&body))
            .await?;

        // The ack is informational; an empty 2xx body still means accepted
        if response.trim().is_empty() {
            return Ok(TransferAck::default());
        }
        decode(&response, "transfer")
    }
}
