//! Sweep planning and execution
//!
//! Balances are split into native and non-native tokens. Non-native tokens
//! are swept in full. The native token keeps `fee_reserve_percent`% behind
//! to pay for the transfers, and is swept last.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::amount::Amount;
use crate::crypto::{EnvelopeEncryptor, IdempotencyKey};
use crate::error::{Error, Result};
use crate::platform::{FeeLevel, TokenBalance, TransferAck, TransferRequest, Wallet, WalletPlatform};

/// One planned transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub token_id: String,
    pub symbol: String,
    pub is_native: bool,
    /// Balance the plan was computed from
    pub observed: Amount,
    pub amount: Amount,
    pub destination: String,
}

/// What happened to a plan
#[derive(Debug, Clone, PartialEq)]
pub enum TransferStatus {
    Submitted(TransferAck),
    /// Nothing left to send after the fee reserve
    SkippedZero,
    DryRun,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub plan: TransferPlan,
    pub status: TransferStatus,
}

/// Compute one transfer per balance
///
/// Non-native plans come first, native last. Order in `balances` does not
/// matter. The native amount is rounded down to the token's decimals, or to
/// the balance's own precision when the platform does not report them. A token id listed twice is rejected rather than swept twice.
pub fn plan_sweep(
    balances: &[TokenBalance],
    destination: &str,
    fee_reserve_percent: u8,
) -> Result<Vec<TransferPlan>> {
    if fee_reserve_percent > 100 {
        return Err(Error::Config(format!(
            "Fee reserve must be between 0 and 100, got {}",
            fee_reserve_percent
        )));
    }

    let mut seen = HashSet::new();
    for b in balances {
        if !seen.insert(b.token.id.as_str()) {
            return Err(Error::Decode(format!("Token {} listed twice", b.token.id)));
        }
    }

    let (native, tokens): (Vec<&TokenBalance>, Vec<&TokenBalance>) =
        balances.iter().partition(|b| b.token.is_native);

    if native.len() > 1 {
        warn!("{} native balances reported, reserving fees on each", native.len());
    }

    let mut plans = Vec::with_capacity(balances.len());

    for b in tokens {
        plans.push(TransferPlan {
            token_id: b.token.id.clone(),
            symbol: b.token.symbol.clone(),
            is_native: false,
            observed: b.amount,
            amount: b.amount,
            destination: destination.to_string(),
        });
    }

    for b in native {
        plans.push(TransferPlan {
            token_id: b.token.id.clone(),
            symbol: b.token.symbol.clone(),
            is_native: true,
            observed: b.amount,
            amount: b.amount.less_percent_to_scale(
                fee_reserve_percent,
                b.token.decimals.unwrap_or_else(|| b.amount.scale()),
            )?,
            destination: destination.to_string(),
        });
    }

    Ok(plans)
}

/// Submits planned transfers, one request per plan
pub struct SweepExecutor<'a> {
    platform: &'a dyn WalletPlatform,
    encryptor: &'a EnvelopeEncryptor,
    fee_level: FeeLevel,
    dry_run: bool,
}

impl<'a> SweepExecutor<'a> {
    pub fn new(
        platform: &'a dyn WalletPlatform,
        encryptor: &'a EnvelopeEncryptor,
        fee_level: FeeLevel,
    ) -> Self {
        Self {
            platform,
            encryptor,
            fee_level,
            dry_run: false,
        }
    }

    /// Log plans instead of submitting them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute plans in order, stopping at the first failure
    ///
    /// Transfers already submitted stay submitted.
    pub async fn execute(&self, wallet: &Wallet, plans: Vec<TransferPlan>) -> Result<Vec<TransferOutcome>> {
        let mut outcomes = Vec::with_capacity(plans.len());

        for plan in plans {
            let status = if self.dry_run {
                info!(
                    "[dry-run] Would send {} : {} to {}",
                    plan.amount, plan.symbol, plan.destination
                );
                TransferStatus::DryRun
            } else if plan.amount.is_zero() {
                warn!(
                    "Skipping {} from wallet {}: nothing left after fee reserve",
                    plan.symbol, wallet.id
                );
                TransferStatus::SkippedZero
            } else {
                let ack = self.submit(wallet, &plan).await?;
                info!(
                    "Sending {} : {} to {}. Transaction: {}",
                    plan.amount,
                    plan.symbol,
                    plan.destination,
                    ack.id.as_deref().unwrap_or("(no id)")
                );
                TransferStatus::Submitted(ack)
            };

            outcomes.push(TransferOutcome { plan, status });
        }

        Ok(outcomes)
    }

    async fn submit(&self, wallet: &Wallet, plan: &TransferPlan) -> Result<TransferAck> {
        let key = IdempotencyKey::new();
        let envelope = self.encryptor.generate_envelope()?;
        let request = TransferRequest {
            wallet_id: wallet.id.clone(),
            token_id: plan.token_id.clone(),
            amount: plan.amount,
            destination_address: plan.destination.clone(),
            fee_level: self.fee_level,
        };

        self.platform.make_transfer(key, envelope, &request).await
    }
}
