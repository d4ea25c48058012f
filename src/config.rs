//! Configuration loading and validation
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. TOML file (`--config`, optional)
//! 3. `SWEEPER_` environment variables (`SWEEPER_RUN__WALLET_COUNT=3`)
//! 4. flat variables `CIRCLE_API_URL`, `API_KEY`, `ENTITY_SECRET`, `PUBLIC_KEY`,
//!    used only when the matching `SWEEPER_` variable is unset
//! 5. command line flags

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::crypto::HexSecret;
use crate::error::{Error, Result};
use crate::pipeline::observer::PollPolicy;
use crate::platform::client::CIRCLE_API_URL;
use crate::platform::{FaucetDrip, FeeLevel};

/// Flat variables accepted for the platform secrets: (config key, variable, prefixed variable)
const FLAT_ENV_VARS: &[(&str, &str, &str)] = &[
    ("platform.api_url", "CIRCLE_API_URL", "SWEEPER_PLATFORM__API_URL"),
    ("platform.api_key", "API_KEY", "SWEEPER_PLATFORM__API_KEY"),
    ("platform.entity_secret", "ENTITY_SECRET", "SWEEPER_PLATFORM__ENTITY_SECRET"),
    ("platform.public_key", "PUBLIC_KEY", "SWEEPER_PLATFORM__PUBLIC_KEY"),
];

static BLOCKCHAIN_TAG: OnceLock<Regex> = OnceLock::new();

fn blockchain_tag() -> &'static Regex {
    BLOCKCHAIN_TAG.get_or_init(|| {
        Regex::new(r"^[A-Z0-9]+(-[A-Z0-9]+)*$").expect("Invalid blockchain tag regex")
    })
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub faucet: FaucetDrip,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Hex-encoded 32-byte entity secret
    #[serde(default)]
    pub entity_secret: String,
    /// PEM public key; fetched from the platform when unset
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub destination_address: String,
    #[serde(default = "default_wallet_count")]
    pub wallet_count: u32,
    /// Platform blockchain tag, e.g. ETH-SEPOLIA or MATIC-AMOY
    #[serde(default)]
    pub blockchain: String,
    /// Share of the native balance left behind to pay transfer fees
    #[serde(default = "default_fee_reserve_percent")]
    pub native_fee_reserve_percent: u8,
    #[serde(default = "default_poll_interval_secs")]
    pub balance_poll_interval_secs: u64,
    /// 0 waits forever
    #[serde(default)]
    pub balance_max_attempts: u32,
    #[serde(default)]
    pub fee_level: FeeLevel,
}

/// Values given on the command line, applied over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub destination_address: Option<String>,
    pub wallet_count: Option<u32>,
    pub blockchain: Option<String>,
    pub native_fee_reserve_percent: Option<u8>,
    pub balance_poll_interval_secs: Option<u64>,
    pub balance_max_attempts: Option<u32>,
}

fn default_api_url() -> String {
    CIRCLE_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_wallet_count() -> u32 {
    1
}

fn default_fee_reserve_percent() -> u8 {
    20
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            entity_secret: String::new(),
            public_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            destination_address: String::new(),
            wallet_count: default_wallet_count(),
            blockchain: String::new(),
            native_fee_reserve_percent: default_fee_reserve_percent(),
            balance_poll_interval_secs: default_poll_interval_secs(),
            balance_max_attempts: 0,
            fee_level: FeeLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, environment and command line
    pub fn load<P: AsRef<Path>>(path: P, overrides: &ConfigOverrides) -> Result<Self> {
        let path = path.as_ref();

        let mut builder = config::Config::builder()
            // Start with defaults
            .set_default("platform.api_url", default_api_url())?
            .set_default("platform.request_timeout_secs", default_request_timeout_secs() as i64)?
            .set_default("run.wallet_count", default_wallet_count() as i64)?
            .set_default("run.native_fee_reserve_percent", default_fee_reserve_percent() as i64)?
            .set_default("run.balance_poll_interval_secs", default_poll_interval_secs() as i64)?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix SWEEPER_)
            .add_source(
                config::Environment::with_prefix("SWEEPER")
                    .prefix_separator("_")
                    .separator("__"),
            );

        for (key, var, prefixed) in FLAT_ENV_VARS {
            if std::env::var_os(prefixed).is_none() {
                builder = builder.set_override_option(*key, std::env::var(var).ok())?;
            }
        }

        let config: Config = builder
            .set_override_option("run.destination_address", overrides.destination_address.clone())?
            .set_override_option("run.wallet_count", overrides.wallet_count.map(i64::from))?
            .set_override_option("run.blockchain", overrides.blockchain.clone())?
            .set_override_option(
                "run.native_fee_reserve_percent",
                overrides.native_fee_reserve_percent.map(i64::from),
            )?
            .set_override_option(
                "run.balance_poll_interval_secs",
                overrides.balance_poll_interval_secs.map(|s| s as i64),
            )?
            .set_override_option(
                "run.balance_max_attempts",
                overrides.balance_max_attempts.map(i64::from),
            )?
            .build()
            .map_err(|e| Error::Config(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| Error::Config(format!("Failed to deserialize configuration: {}", e)))?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate value ranges (no mandatory fields)
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.platform.api_url)
            .map_err(|e| Error::Config(format!("Invalid api_url {}: {}", self.platform.api_url, e)))?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(Error::Config(format!(
                "api_url must be http(s), got {}",
                url.scheme()
            )));
        }

        if self.platform.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".into()));
        }

        if self.run.wallet_count == 0 {
            return Err(Error::Config("wallet_count must be at least 1".into()));
        }

        if self.run.native_fee_reserve_percent > 100 {
            return Err(Error::Config(format!(
                "native_fee_reserve_percent must be between 0 and 100, got {}",
                self.run.native_fee_reserve_percent
            )));
        }

        if self.run.balance_poll_interval_secs == 0 {
            return Err(Error::Config("balance_poll_interval_secs must be positive".into()));
        }

        Ok(())
    }

    /// Check the API key read-only platform calls need
    pub fn require_api_key(&self) -> Result<()> {
        if self.platform.api_key.trim().is_empty() {
            return Err(Error::Config(
                "API key is mandatory (API_KEY or SWEEPER_PLATFORM__API_KEY)".into(),
            ));
        }
        Ok(())
    }

    /// Check the credentials mutating platform calls need
    pub fn require_platform(&self) -> Result<()> {
        self.require_api_key()?;

        if self.platform.entity_secret.trim().is_empty() {
            return Err(Error::Config(
                "Entity secret is mandatory (ENTITY_SECRET or SWEEPER_PLATFORM__ENTITY_SECRET)".into(),
            ));
        }

        self.secret_source().validate()
    }

    /// Check the destination every sweep is sent to
    pub fn require_destination(&self) -> Result<()> {
        if self.run.destination_address.trim().is_empty() {
            return Err(Error::Config(
                "destination address is mandatory and can't be an empty string".into(),
            ));
        }
        Ok(())
    }

    /// Check the parameters a sweep run cannot do without
    pub fn require_run(&self) -> Result<()> {
        self.require_destination()?;

        if self.run.blockchain.trim().is_empty() {
            return Err(Error::Config(
                "blockchain is mandatory and can't be an empty string".into(),
            ));
        }

        if !blockchain_tag().is_match(&self.run.blockchain) {
            return Err(Error::Config(format!(
                "Invalid blockchain tag {:?} (expected e.g. ETH-SEPOLIA, MATIC-AMOY)",
                self.run.blockchain
            )));
        }

        Ok(())
    }

    pub fn secret_source(&self) -> HexSecret {
        HexSecret::new(self.platform.entity_secret.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.platform.request_timeout_secs)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.run.balance_poll_interval_secs),
            max_attempts: match self.run.balance_max_attempts {
                0 => None,
                n => Some(n),
            },
        }
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Platform:
    api_url: {}
    api_key: {}
    entity_secret: {}
    public_key: {}
    request_timeout: {}s
  Run:
    destination: {}
    wallets: {}
    blockchain: {}
    native_fee_reserve: {}%
    poll_interval: {}s
    max_poll_attempts: {}
    fee_level: {:?}
  Faucet:
    native: {}
    usdc: {}
    eurc: {}
"#,
            self.platform.api_url,
            mask(&self.platform.api_key),
            mask(&self.platform.entity_secret),
            match &self.platform.public_key {
                Some(_) => "(configured)",
                None => "(fetched from platform)",
            },
            self.platform.request_timeout_secs,
            or_not_set(&self.run.destination_address),
            self.run.wallet_count,
            or_not_set(&self.run.blockchain),
            self.run.native_fee_reserve_percent,
            self.run.balance_poll_interval_secs,
            match self.run.balance_max_attempts {
                0 => "unbounded".to_string(),
                n => n.to_string(),
            },
            self.run.fee_level,
            self.faucet.native,
            self.faucet.usdc,
            self.faucet.eurc,
        )
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "(not set)"
    } else {
        "***"
    }
}

fn or_not_set(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
