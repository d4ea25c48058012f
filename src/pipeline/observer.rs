//! Balance observer
//!
//! Faucet funds land asynchronously. The observer polls a wallet's balances
//! until the list is non-empty:
//!
//! ```text
//! Polling ──(empty, sleep)──→ Polling
//!    └────(non-empty)──────→ Ready
//! ```
//!
//! A query failure ends the wait with that error. An optional attempt budget
//! turns an endless wait into [`Error::Timeout`], and the cancellation token
//! interrupts the sleep with [`Error::Cancelled`].

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::platform::{TokenBalance, Wallet, WalletPlatform};

/// How often and how long to poll
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until balances appear or the run is cancelled
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

enum PollState {
    Polling { attempt: u32 },
    Ready(Vec<TokenBalance>),
}

/// Waits for a wallet's balances to show up
pub struct BalanceObserver<'a> {
    platform: &'a dyn WalletPlatform,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl<'a> BalanceObserver<'a> {
    pub fn new(platform: &'a dyn WalletPlatform, policy: PollPolicy, cancel: CancellationToken) -> Self {
        Self {
            platform,
            policy,
            cancel,
        }
    }

    /// Block until the wallet reports at least one token balance
    pub async fn await_balances(&self, wallet: &Wallet) -> Result<Vec<TokenBalance>> {
        let mut state = PollState::Polling { attempt: 1 };

        loop {
            state = match state {
                PollState::Ready(balances) => {
                    info!("Wallet {} has {} token balances", wallet.id, balances.len());
                    return Ok(balances);
                }
                PollState::Polling { attempt } => {
                    if self.cancel.is_cancelled() {
                        return Err(Error::Cancelled);
                    }

                    let balances = self.platform.get_wallet_balances(&wallet.id).await?;
                    debug!("Balance query {} for {}: {} entries", attempt, wallet.id, balances.len());

                    if !balances.is_empty() {
                        PollState::Ready(balances)
                    } else {
                        if self.policy.max_attempts.is_some_and(|max| attempt >= max) {
                            return Err(Error::Timeout { attempts: attempt });
                        }

                        info!(
                            "Waiting for {} seconds for balance to update",
                            self.policy.interval.as_secs_f64()
                        );
                        tokio::select! {
                            _ = self.cancel.cancelled() => return Err(Error::Cancelled),
                            _ = tokio::time::sleep(self.policy.interval) => {}
                        }

                        PollState::Polling { attempt: attempt + 1 }
                    }
                }
            };
        }
    }
}
