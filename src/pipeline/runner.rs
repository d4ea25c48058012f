//! Whole-run driver
//!
//! Wallets are processed strictly one after another; total run time is the
//! sum of every wallet's wait for faucet funds.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::faucet::fund_wallet;
use super::observer::BalanceObserver;
use super::provision::Provisioner;
use super::sweep::{plan_sweep, SweepExecutor, TransferOutcome, TransferStatus};
use crate::config::Config;
use crate::crypto::EnvelopeEncryptor;
use crate::error::Result;
use crate::platform::{Wallet, WalletPlatform, WalletSet};

/// Transfers made from one wallet
#[derive(Debug, Clone)]
pub struct WalletReport {
    pub wallet: Wallet,
    pub transfers: Vec<TransferOutcome>,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub wallet_set: WalletSet,
    pub wallets: Vec<WalletReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn submitted_transfers(&self) -> usize {
        self.wallets
            .iter()
            .flat_map(|w| &w.transfers)
            .filter(|t| matches!(t.status, TransferStatus::Submitted(_)))
            .count()
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut out = format!(
            "\n=== SWEEP SUMMARY ===\nWallet set: {} ({})\nDuration: {}s\n",
            self.wallet_set.id,
            self.wallet_set.name,
            (self.finished_at - self.started_at).num_seconds()
        );

        for report in &self.wallets {
            out.push_str(&format!("\nWallet {} ({})\n", report.wallet.id, report.wallet.address));
            for t in &report.transfers {
                let status = match &t.status {
                    TransferStatus::Submitted(ack) => {
                        format!("submitted {}", ack.id.as_deref().unwrap_or("(no id)"))
                    }
                    TransferStatus::SkippedZero => "skipped (zero)".to_string(),
                    TransferStatus::DryRun => "dry-run".to_string(),
                };
                out.push_str(&format!(
                    "  {:<14} {:>24} of {:>24} -> {}  [{}]\n",
                    t.plan.symbol, t.plan.amount, t.plan.observed, t.plan.destination, status
                ));
            }
        }

        out.push_str(&format!("\nSubmitted transfers: {}\n", self.submitted_transfers()));
        out
    }
}

/// Runs the whole provision → fund → observe → sweep sequence
pub struct Runner<'a> {
    platform: &'a dyn WalletPlatform,
    encryptor: &'a EnvelopeEncryptor,
    config: &'a Config,
    cancel: CancellationToken,
    dry_run: bool,
}

impl<'a> Runner<'a> {
    pub fn new(platform: &'a dyn WalletPlatform, encryptor: &'a EnvelopeEncryptor, config: &'a Config) -> Self {
        Self {
            platform,
            encryptor,
            config,
            cancel: CancellationToken::new(),
            dry_run: false,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.config.require_run()?;
        let run = &self.config.run;
        let started_at = Utc::now();

        let provisioner = Provisioner::new(self.platform, self.encryptor);
        let wallet_set = provisioner.create_wallet_set().await?;
        let wallets = provisioner
            .create_wallets(&wallet_set.id, run.wallet_count, &run.blockchain)
            .await?;

        let observer = BalanceObserver::new(self.platform, self.config.poll_policy(), self.cancel.clone());
        let executor =
            SweepExecutor::new(self.platform, self.encryptor, run.fee_level).dry_run(self.dry_run);

        let mut reports = Vec::with_capacity(wallets.len());
        for (i, wallet) in wallets.into_iter().enumerate() {
            info!("Processing wallet {}/{}: {}", i + 1, run.wallet_count, wallet.id);

            fund_wallet(self.platform, &wallet, &self.config.faucet).await?;
            let balances = observer.await_balances(&wallet).await?;
            let plans = plan_sweep(&balances, &run.destination_address, run.native_fee_reserve_percent)?;
            let transfers = executor.execute(&wallet, plans).await?;

            reports.push(WalletReport { wallet, transfers });
        }

        Ok(RunReport {
            wallet_set,
            wallets: reports,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::tests::test_encryptor;
    use crate::error::Error;
    use crate::pipeline::testing::{balance, FakePlatform};

    fn config(wallet_count: u32) -> Config {
        let mut config = Config::default();
        config.run.destination_address = "0xDEST".into();
        config.run.blockchain = "ETH-SEPOLIA".into();
        config.run.wallet_count = wallet_count;
        config.run.balance_poll_interval_secs = 1;
        config
    }

    #[tokio::test]
    async fn test_run_sweeps_every_wallet() {
        let platform = FakePlatform::with_balances(vec![vec![
            balance("eth", "ETH-SEPOLIA", "1.000000", true),
            balance("usdc", "USDC", "50.00", false),
        ]]);
        let encryptor = test_encryptor();
        let config = config(2);

        let report = Runner::new(&platform, &encryptor, &config).run().await.unwrap();

        assert_eq!(report.wallets.len(), 2);
        assert_eq!(report.submitted_transfers(), 4);
        assert_eq!(platform.funded.lock().unwrap().len(), 2);
        assert!(report.summary().contains("Submitted transfers: 4"));
    }

    #[tokio::test]
    async fn test_missing_destination_fails_before_any_call() {
        let platform = FakePlatform::default();
        let encryptor = test_encryptor();
        let mut config = config(1);
        config.run.destination_address.clear();

        let result = Runner::new(&platform, &encryptor, &config).run().await;

        assert!(matches!(result, Err(Error::Config(_))));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_provisions_but_does_not_transfer() {
        let platform = FakePlatform::with_balances(vec![vec![balance("usdc", "USDC", "5", false)]]);
        let encryptor = test_encryptor();
        let config = config(1);

        let report = Runner::new(&platform, &encryptor, &config)
            .dry_run(true)
            .run()
            .await
            .unwrap();

        assert_eq!(report.submitted_transfers(), 0);
        assert!(platform.transfers().is_empty());
        assert_eq!(platform.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_run_stops_waiting() {
        let platform = FakePlatform::with_balances(vec![Vec::new()]);
        let encryptor = test_encryptor();
        let config = config(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = Runner::new(&platform, &encryptor, &config)
            .with_cancellation(cancel)
            .run()
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(platform.transfers().is_empty());
    }
}
