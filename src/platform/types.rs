//! Wallet platform data types
//!
//! Field names follow the platform's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// Group of wallets created together
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub custody_type: Option<String>,
    #[serde(default)]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_date: Option<DateTime<Utc>>,
}

/// Custodial wallet on one blockchain
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub address: String,
    pub blockchain: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub wallet_set_id: String,
    #[serde(default)]
    pub custody_type: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Chain's base currency (pays transaction fees)
    #[serde(default)]
    pub is_native: bool,
    #[serde(default)]
    pub blockchain: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// Balance of one token held by a wallet
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub token: Token,
    pub amount: Amount,
    #[serde(default)]
    pub update_date: Option<DateTime<Utc>>,
}

/// Transaction fee tier requested for transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeeLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Which assets to request from the faucet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaucetDrip {
    #[serde(default = "default_true")]
    pub native: bool,
    #[serde(default = "default_true")]
    pub usdc: bool,
    #[serde(default = "default_true")]
    pub eurc: bool,
}

impl Default for FaucetDrip {
    fn default() -> Self {
        Self {
            native: true,
            usdc: true,
            eurc: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One token transfer out of a wallet
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub wallet_id: String,
    pub token_id: String,
    pub amount: Amount,
    pub destination_address: String,
    pub fee_level: FeeLevel,
}

/// Platform acknowledgement of a submitted transfer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransferAck {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// `{"data": ...}` wrapper around every platform response
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublicKeyData {
    pub public_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WalletSetData {
    pub wallet_set: WalletSet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WalletsData {
    #[serde(default)]
    pub wallets: Vec<Wallet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BalancesData {
    #[serde(default)]
    pub token_balances: Vec<TokenBalance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_deserialize() {
        let json = r#"{
            "id": "01899cf2-d415-7052-a207-f9862157e546",
            "state": "LIVE",
            "walletSetId": "0189bc61-7c6e-7e41-a3a3-8a1b9bbd5e2f",
            "custodyType": "DEVELOPER",
            "address": "0x6e5eaf34c73d1cd0be4e24f923b97cf38e10d1f3",
            "blockchain": "ETH-SEPOLIA",
            "accountType": "EOA",
            "updateDate": "2023-08-15T15:42:05Z",
            "createDate": "2023-08-15T15:42:05Z"
        }"#;

        let wallet: Wallet = serde_json::from_str(json).unwrap();
        assert_eq!(wallet.blockchain, "ETH-SEPOLIA");
        assert_eq!(wallet.state, "LIVE");
        assert_eq!(wallet.account_type.as_deref(), Some("EOA"));
        assert!(wallet.create_date.is_some());
    }

    #[test]
    fn test_token_balance_deserialize() {
        let json = r#"{
            "token": {
                "id": "979869da-9115-5f7d-917d-12d434e56ae7",
                "blockchain": "ETH-SEPOLIA",
                "name": "Ethereum-Sepolia",
                "symbol": "ETH-SEPOLIA",
                "decimals": 18,
                "isNative": true
            },
            "amount": "0.05",
            "updateDate": "2023-10-18T09:12:00Z"
        }"#;

        let balance: TokenBalance = serde_json::from_str(json).unwrap();
        assert!(balance.token.is_native);
        assert_eq!(balance.token.decimals, Some(18));
        assert_eq!(balance.amount.to_string(), "0.05");
    }

    #[test]
    fn test_non_native_defaults() {
        let json = r#"{"token": {"id": "usdc-id", "symbol": "USDC"}, "amount": "10"}"#;
        let balance: TokenBalance = serde_json::from_str(json).unwrap();
        assert!(!balance.token.is_native);
    }

    #[test]
    fn test_fee_level_serde() {
        assert_eq!(serde_json::to_string(&FeeLevel::Medium).unwrap(), r#""MEDIUM""#);
        let level: FeeLevel = serde_json::from_str(r#""HIGH""#).unwrap();
        assert_eq!(level, FeeLevel::High);
        assert_eq!(FeeLevel::default(), FeeLevel::Medium);
    }

    #[test]
    fn test_faucet_drip_partial_config() {
        let drip: FaucetDrip = serde_json::from_str(r#"{"eurc": false}"#).unwrap();
        assert!(drip.native);
        assert!(drip.usdc);
        assert!(!drip.eurc);
    }
}
