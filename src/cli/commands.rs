//! CLI command implementations

use anyhow::Result;
use dialoguer::Confirm;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::crypto::envelope::parse_rsa_public_key;
use crate::crypto::{EnvelopeEncryptor, PublicKeyProvider};
use crate::pipeline::{plan_sweep, Runner, TransferPlan};
use crate::platform::{CircleClient, WalletPlatform};

fn client(config: &Config) -> Result<CircleClient> {
    Ok(CircleClient::new(
        &config.platform.api_url,
        &config.platform.api_key,
        config.request_timeout(),
    )?)
}

/// Provision, fund and sweep
pub async fn run(config: &Config, dry_run: bool, assume_yes: bool) -> Result<()> {
    // Fail fast before any network call
    config.require_platform()?;
    config.require_run()?;

    if dry_run {
        warn!("Running in DRY-RUN mode - wallets are created and funded, nothing is transferred");
    }

    info!(
        "Creating {} wallets on {}, sweeping to {} (native fee reserve {}%)",
        config.run.wallet_count,
        config.run.blockchain,
        config.run.destination_address,
        config.run.native_fee_reserve_percent
    );

    let client = client(config)?;
    let pem = PublicKeyProvider::from_config(config.platform.public_key.as_deref())
        .resolve(&client)
        .await?;
    let encryptor = EnvelopeEncryptor::from_pem(config.secret_source(), &pem)?;

    // Confirmation prompt (unless --yes)
    if !dry_run && !assume_yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Sweep {} new wallet(s) on {} to {}? Transfers cannot be undone.",
                config.run.wallet_count, config.run.blockchain, config.run.destination_address
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current request");
            on_signal.cancel();
        }
    });

    let report = Runner::new(&client, &encryptor, config)
        .with_cancellation(cancel)
        .dry_run(dry_run)
        .run()
        .await?;

    println!("{}", report.summary());
    Ok(())
}

/// Show the sweep an existing wallet would get, without sending anything
pub async fn plan(config: &Config, wallet_id: &str) -> Result<()> {
    config.require_api_key()?;

    let client = client(config)?;
    let plans = wallet_plan(&client, config, wallet_id).await?;

    if plans.is_empty() {
        println!("Wallet {} has no token balances", wallet_id);
        return Ok(());
    }

    println!("\n=== SWEEP PLAN: {} ===\n", wallet_id);
    for plan in &plans {
        println!(
            "  {:<14} {:>24} of {:>24}{} -> {}",
            plan.symbol,
            plan.amount,
            plan.observed,
            if plan.is_native { " (native)" } else { "" },
            plan.destination
        );
    }
    Ok(())
}

/// Plan a sweep of one wallet's current balances
///
/// Only the destination is required; the blockchain comes with the wallet.
async fn wallet_plan(
    platform: &dyn WalletPlatform,
    config: &Config,
    wallet_id: &str,
) -> Result<Vec<TransferPlan>> {
    config.require_destination()?;

    let balances = platform.get_wallet_balances(wallet_id).await?;
    Ok(plan_sweep(
        &balances,
        &config.run.destination_address,
        config.run.native_fee_reserve_percent,
    )?)
}

/// Print the platform's current entity public key
pub async fn public_key(config: &Config) -> Result<()> {
    config.require_api_key()?;

    let pem = client(config)?.fetch_public_key().await?;
    parse_rsa_public_key(&pem)?;
    println!("{}", pem);
    Ok(())
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{balance, FakePlatform};

    #[tokio::test]
    async fn test_plan_needs_only_destination() {
        let platform = FakePlatform::with_balances(vec![vec![
            balance("eth", "ETH-SEPOLIA", "1.000000", true),
            balance("usdc", "USDC", "50.00", false),
        ]]);
        let mut config = Config::default();
        config.run.destination_address = "0xDEST".into();

        let plans = wallet_plan(&platform, &config, "W1").await.unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[1].amount.to_string(), "0.800000");
        assert!(plans.iter().all(|p| p.destination == "0xDEST"));
    }

    #[tokio::test]
    async fn test_plan_without_destination_queries_nothing() {
        let platform = FakePlatform::default();
        let config = Config::default();

        assert!(wallet_plan(&platform, &config, "W1").await.is_err());
        assert_eq!(platform.queries(), 0);
    }
}
