//! In-memory platform for pipeline tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::amount::Amount;
use crate::crypto::{Envelope, IdempotencyKey};
use crate::error::{Error, Result};
use crate::platform::{
    FaucetDrip, Token, TokenBalance, TransferAck, TransferRequest, Wallet, WalletPlatform, WalletSet,
};

/// Mutating call as the platform saw it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub idempotency_key: String,
    pub envelope: String,
}

#[derive(Default)]
pub struct FakePlatform {
    /// Successive balance responses; the last one repeats
    pub balances: Mutex<VecDeque<Vec<TokenBalance>>>,
    pub balance_queries: Mutex<u32>,
    pub calls: Mutex<Vec<RecordedCall>>,
    pub funded: Mutex<Vec<String>>,
    pub transfers: Mutex<Vec<TransferRequest>>,
    /// Fail the n-th transfer (0-based)
    pub fail_transfer_at: Option<usize>,
    pub fail_balances: bool,
    /// Return one wallet fewer than requested
    pub short_wallets: bool,
}

impl FakePlatform {
    pub fn with_balances(responses: Vec<Vec<TokenBalance>>) -> Self {
        Self {
            balances: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    pub fn queries(&self) -> u32 {
        *self.balance_queries.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, key: IdempotencyKey, envelope: Envelope) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            idempotency_key: key.to_string(),
            envelope: envelope.into_string(),
        });
    }
}

pub fn balance(token_id: &str, symbol: &str, amount: &str, is_native: bool) -> TokenBalance {
    TokenBalance {
        token: Token {
            id: token_id.to_string(),
            symbol: symbol.to_string(),
            name: None,
            is_native,
            blockchain: Some("ETH-SEPOLIA".to_string()),
            decimals: None,
        },
        amount: Amount::parse(amount).unwrap(),
        update_date: None,
    }
}

pub fn wallet(id: &str) -> Wallet {
    Wallet {
        id: id.to_string(),
        address: format!("0x{}", id),
        blockchain: "ETH-SEPOLIA".to_string(),
        state: "LIVE".to_string(),
        wallet_set_id: "set-1".to_string(),
        custody_type: Some("DEVELOPER".to_string()),
        account_type: Some("EOA".to_string()),
        create_date: None,
        update_date: None,
    }
}

#[async_trait]
impl WalletPlatform for FakePlatform {
    async fn fetch_public_key(&self) -> Result<String> {
        Ok(crate::crypto::envelope::tests::test_public_pem())
    }

    async fn create_wallet_set(
        &self,
        key: IdempotencyKey,
        envelope: Envelope,
        name: &str,
    ) -> Result<WalletSet> {
        self.record("create_wallet_set", key, envelope);
        Ok(WalletSet {
            id: "set-1".to_string(),
            name: name.to_string(),
            custody_type: Some("DEVELOPER".to_string()),
            create_date: None,
            update_date: None,
        })
    }

    async fn create_wallets(
        &self,
        key: IdempotencyKey,
        envelope: Envelope,
        _wallet_set_id: &str,
        _blockchain: &str,
        count: u32,
    ) -> Result<Vec<Wallet>> {
        self.record("create_wallets", key, envelope);
        let count = if self.short_wallets { count - 1 } else { count };
        Ok((1..=count).map(|i| wallet(&format!("W{}", i))).collect())
    }

    async fn fund_address(&self, address: &str, _blockchain: &str, _drip: &FaucetDrip) -> Result<()> {
        self.funded.lock().unwrap().push(address.to_string());
        Ok(())
    }

    async fn get_wallet_balances(&self, _wallet_id: &str) -> Result<Vec<TokenBalance>> {
        *self.balance_queries.lock().unwrap() += 1;
        if self.fail_balances {
            return Err(Error::Platform {
                status: 500,
                body: "internal".to_string(),
            });
        }

        let mut responses = self.balances.lock().unwrap();
        if responses.len() > 1 {
            Ok(responses.pop_front().unwrap_or_default())
        } else {
            Ok(responses.front().cloned().unwrap_or_default())
        }
    }

    async fn make_transfer(
        &self,
        key: IdempotencyKey,
        envelope: Envelope,
        request: &TransferRequest,
    ) -> Result<TransferAck> {
        let index = self.transfers.lock().unwrap().len();
        if self.fail_transfer_at == Some(index) {
            return Err(Error::Platform {
                status: 400,
                body: r#"{"code":155201,"message":"insufficient funds"}"#.to_string(),
            });
        }

        self.record("make_transfer", key, envelope);
        self.transfers.lock().unwrap().push(request.clone());
        Ok(TransferAck {
            id: Some(format!("tx-{}", index)),
            state: Some("INITIATED".to_string()),
        })
    }
}
