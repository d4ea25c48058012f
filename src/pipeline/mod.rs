//! Provision → fund → observe → sweep
//!
//! ```text
//! Provisioner ──→ (per wallet, one at a time)
//!                   fund_wallet → BalanceObserver → plan_sweep → SweepExecutor
//! ```
//!
//! Every mutating step draws a fresh idempotency key and envelope right
//! before its request. Any error aborts the run; nothing is rolled back.

pub mod faucet;
pub mod observer;
pub mod provision;
pub mod runner;
pub mod sweep;

#[cfg(test)]
pub(crate) mod testing;

pub use faucet::fund_wallet;
pub use observer::{BalanceObserver, PollPolicy};
pub use provision::Provisioner;
pub use runner::{RunReport, Runner, WalletReport};
pub use sweep::{plan_sweep, SweepExecutor, TransferOutcome, TransferPlan, TransferStatus};
