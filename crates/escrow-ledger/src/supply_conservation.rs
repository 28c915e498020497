//! Supply conservation invariant checker.
//!
//! ```text
//! ∀ asset: Σ(balances) == Σ(issued)
//! ```
//!
//! Value enters the ledger only through genesis issuance (airdrops and
//! `mint_to`). Transactions move value between accounts but never create or
//! destroy it, including storage deposits, which travel with the accounts
//! they fund.

use std::collections::HashMap;
use std::fmt;

use escrow_types::{Address, EscrowError, Result};

/// Something whose total supply is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    /// Native balance held by every account.
    Lamports,
    /// Units of one mint.
    Token(Address),
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lamports => write!(f, "lamports"),
            Self::Token(mint) => write!(f, "token:{}", mint.short()),
        }
    }
}

/// Tracks per-asset issuance totals.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    issued: HashMap<Asset, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record newly issued supply.
    pub fn record_issuance(&mut self, asset: Asset, amount: u64) {
        *self.issued.entry(asset).or_insert(0) += u128::from(amount);
    }

    /// Expected total supply for an asset.
    #[must_use]
    pub fn expected_supply(&self, asset: &Asset) -> u128 {
        self.issued.get(asset).copied().unwrap_or(0)
    }

    /// Verify that `actual_supply` (the sum of all balances) matches issuance.
    ///
    /// # Errors
    /// Returns [`EscrowError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, asset: &Asset, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply(asset);
        if actual_supply != expected {
            return Err(EscrowError::SupplyInvariantViolation {
                reason: format!("asset {asset}: actual supply {actual_supply} != issued {expected}"),
            });
        }
        Ok(())
    }

    /// All tracked assets, in a stable order.
    #[must_use]
    pub fn tracked_assets(&self) -> Vec<Asset> {
        let mut assets: Vec<Asset> = self.issued.keys().copied().collect();
        assets.sort();
        assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_supply_is_zero() {
        let sc = SupplyConservation::new();
        assert_eq!(sc.expected_supply(&Asset::Lamports), 0);
        assert!(sc.verify(&Asset::Lamports, 0).is_ok());
    }

    #[test]
    fn issuance_accumulates() {
        let mut sc = SupplyConservation::new();
        sc.record_issuance(Asset::Lamports, 1_000);
        sc.record_issuance(Asset::Lamports, 500);
        assert_eq!(sc.expected_supply(&Asset::Lamports), 1_500);
    }

    #[test]
    fn issuance_does_not_overflow_u64() {
        let mut sc = SupplyConservation::new();
        sc.record_issuance(Asset::Lamports, u64::MAX);
        sc.record_issuance(Asset::Lamports, u64::MAX);
        assert_eq!(
            sc.expected_supply(&Asset::Lamports),
            u128::from(u64::MAX) * 2
        );
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mint = Asset::Token(Address([1u8; 32]));
        let mut sc = SupplyConservation::new();
        sc.record_issuance(mint, 10);
        let err = sc.verify(&mint, 11).unwrap_err();
        assert!(matches!(err, EscrowError::SupplyInvariantViolation { .. }));
    }

    #[test]
    fn assets_are_independent() {
        let a = Asset::Token(Address([1u8; 32]));
        let b = Asset::Token(Address([2u8; 32]));
        let mut sc = SupplyConservation::new();
        sc.record_issuance(a, 5);
        sc.record_issuance(b, 50_000);
        assert!(sc.verify(&a, 5).is_ok());
        assert!(sc.verify(&b, 50_000).is_ok());
        assert_eq!(sc.tracked_assets(), vec![a, b]);
    }
}
