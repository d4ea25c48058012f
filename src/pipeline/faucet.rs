//! Testnet faucet funding

use tracing::info;

use crate::error::Result;
use crate::platform::{FaucetDrip, Wallet, WalletPlatform};

/// Request a faucet drip to the wallet's address
///
/// Success only means the faucet accepted the request. Use
/// [`super::BalanceObserver`] to wait for the funds.
pub async fn fund_wallet(platform: &dyn WalletPlatform, wallet: &Wallet, drip: &FaucetDrip) -> Result<()> {
    info!("Funding wallet: {} ({})", wallet.id, wallet.address);
    platform
        .fund_address(&wallet.address, &wallet.blockchain, drip)
        .await
}
