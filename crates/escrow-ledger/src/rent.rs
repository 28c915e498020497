//! Storage deposits.
//!
//! Every account must hold a lamport deposit proportional to its size. The
//! deposit is paid by whoever creates the account and is returned in full to
//! the close destination when the account is closed.

use escrow_types::{EscrowError, RentConfig, Result};

/// Rent calculator built from [`RentConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rent {
    config: RentConfig,
}

impl Rent {
    #[must_use]
    pub fn new(config: RentConfig) -> Self {
        Self { config }
    }

    /// Minimum lamports for an account with `data_len` bytes of data.
    #[must_use]
    pub fn minimum_balance(&self, data_len: usize) -> u64 {
        let bytes = self
            .config
            .account_storage_overhead
            .saturating_add(u64::try_from(data_len).unwrap_or(u64::MAX));
        bytes
            .saturating_mul(self.config.lamports_per_byte_year)
            .saturating_mul(self.config.exemption_threshold_years)
    }

    /// Does `lamports` cover the deposit for `data_len` bytes?
    #[must_use]
    pub fn is_exempt(&self, lamports: u64, data_len: usize) -> bool {
        lamports >= self.minimum_balance(data_len)
    }

    /// Fail unless `available` lamports can pay the deposit for `data_len`.
    ///
    /// # Errors
    /// Returns `InsufficientLamports` with the shortfall details.
    pub fn require(&self, available: u64, data_len: usize) -> Result<u64> {
        let needed = self.minimum_balance(data_len);
        if available < needed {
            return Err(EscrowError::InsufficientLamports { needed, available });
        }
        Ok(needed)
    }
}

impl Default for Rent {
    fn default() -> Self {
        Self::new(RentConfig::default())
    }
}
