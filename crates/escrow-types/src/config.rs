//! Configuration types for the ledger.

use serde::{Deserialize, Serialize};

use crate::{EscrowError, Result, constants};

/// Storage deposit ("rent") parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentConfig {
    /// Storage price per byte per year.
    pub lamports_per_byte_year: u64,
    /// Years of storage an account must prepay.
    pub exemption_threshold_years: u64,
    /// Fixed bytes charged per account on top of its data.
    pub account_storage_overhead: u64,
}

impl Default for RentConfig {
    fn default() -> Self {
        Self {
            lamports_per_byte_year: constants::DEFAULT_LAMPORTS_PER_BYTE_YEAR,
            exemption_threshold_years: constants::DEFAULT_EXEMPTION_THRESHOLD_YEARS,
            account_storage_overhead: constants::ACCOUNT_STORAGE_OVERHEAD,
        }
    }
}

/// Ledger-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub rent: RentConfig,
    /// How many committed transaction ids to remember for replay rejection.
    pub replay_cache_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rent: RentConfig::default(),
            replay_cache_size: constants::DEFAULT_REPLAY_CACHE_SIZE,
        }
    }
}

impl LedgerConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the ledger cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.replay_cache_size == 0 {
            return Err(EscrowError::Configuration(
                "replay_cache_size must be positive".into(),
            ));
        }
        if self.rent.lamports_per_byte_year == 0 || self.rent.exemption_threshold_years == 0 {
            return Err(EscrowError::Configuration(
                "rent rate and exemption threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}
