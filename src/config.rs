//! Configuration file model.
//!
//! Everything the marketplace adapter needs is carried in explicit structs so
//! several credential sets can live side by side in one process.

use crate::domain::credentials::Credentials;
use crate::error::{PurchaseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://fragment.com/api";

/// How the marketplace adapter reports transport and parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Degrade to the empty sentinel, indistinguishable from "not found".
    #[default]
    Collapse,
    /// Surface as `PurchaseError::Transport`.
    Distinct,
}

/// Wallet descriptor presented to the buy-link call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletDescriptor {
    pub address: String,
    pub public_key: String,
    pub state_init: String,
    #[serde(default = "default_chain")]
    pub chain: String,
}

/// Wallet-app identity the marketplace expects to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientProfile {
    pub platform: String,
    pub app_name: String,
    pub app_version: String,
    pub max_protocol_version: u32,
    pub origin: String,
    pub user_agent: Option<String>,
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            platform: "iphone".to_string(),
            app_name: "Tonkeeper".to_string(),
            app_version: "5.0.14".to_string(),
            max_protocol_version: 2,
            origin: "https://fragment.com".to_string(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub credentials: Credentials,
    pub wallet: WalletDescriptor,
    #[serde(default)]
    pub client: ClientProfile,
    #[serde(default)]
    pub failure_mode: FailureMode,
    /// Unset means the transport default (no timeout).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl MarketplaceConfig {
    pub fn new(credentials: Credentials, wallet: WalletDescriptor) -> Self {
        Self {
            base_url: default_base_url(),
            credentials,
            wallet,
            client: ClientProfile::default(),
            failure_mode: FailureMode::default(),
            timeout_secs: None,
        }
    }

    /// `<base_url>?hash=<hash>`
    pub fn endpoint(&self) -> String {
        format!("{}?hash={}", self.base_url, self.credentials.hash)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Accepted quantity range, checked before any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseLimits {
    pub min_quantity: u32,
    pub max_quantity: u32,
}

impl Default for PurchaseLimits {
    fn default() -> Self {
        Self {
            min_quantity: 50,
            max_quantity: 1_000_000,
        }
    }
}

impl PurchaseLimits {
    /// Any positive quantity.
    pub const UNBOUNDED: PurchaseLimits = PurchaseLimits {
        min_quantity: 1,
        max_quantity: u32::MAX,
    };

    pub fn check(&self, quantity: u32) -> Result<()> {
        if quantity < self.min_quantity || quantity > self.max_quantity {
            return Err(PurchaseError::InvalidRequest(format!(
                "quantity {} outside {}..={}",
                quantity, self.min_quantity, self.max_quantity
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub marketplace: MarketplaceConfig,
    #[serde(default)]
    pub limits: PurchaseLimits,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PurchaseError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.marketplace.credentials.hash.is_empty() {
            return Err(PurchaseError::Config("credentials.hash is empty".to_string()));
        }
        if self.limits.min_quantity == 0 || self.limits.min_quantity > self.limits.max_quantity {
            return Err(PurchaseError::Config(format!(
                "invalid limits {}..={}",
                self.limits.min_quantity, self.limits.max_quantity
            )));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_chain() -> String {
    // TON mainnet
    "-239".to_string()
}
