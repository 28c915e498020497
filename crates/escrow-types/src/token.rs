//! Token state: mints and holding accounts.
//!
//! Every holding account stores units of exactly one mint. Raw amounts are
//! integers; [`Mint::ui_amount`] scales them by the mint's decimals for
//! display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Address;

/// A fungible token type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    /// Who may mint new supply. `None` once supply is fixed.
    pub mint_authority: Option<Address>,
    /// Total units in circulation.
    pub supply: u64,
    /// Number of base-10 digits to the right of the decimal point.
    pub decimals: u8,
}

impl Mint {
    /// Storage footprint of a mint account in bytes.
    pub const LEN: usize = 82;

    /// Scale a raw amount into a decimal UI amount.
    #[must_use]
    pub fn ui_amount(&self, amount: u64) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(amount), u32::from(self.decimals))
    }
}

/// A token holding account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    /// The mint this account holds.
    pub mint: Address,
    /// The authority allowed to move tokens out (a wallet or a derived address).
    pub owner: Address,
    /// Units held.
    pub amount: u64,
}

impl TokenAccount {
    /// Storage footprint of a token account in bytes.
    pub const LEN: usize = 165;

    /// An empty holding account.
    #[must_use]
    pub fn new(mint: Address, owner: Address) -> Self {
        Self {
            mint,
            owner,
            amount: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_amount_scales_by_decimals() {
        let mint = Mint {
            mint_authority: None,
            supply: 0,
            decimals: 6,
        };
        assert_eq!(mint.ui_amount(10_000_000), Decimal::new(10, 0));
        assert_eq!(mint.ui_amount(1), Decimal::new(1, 6));
    }

    #[test]
    fn zero_decimals_is_identity() {
        let mint = Mint {
            mint_authority: None,
            supply: 0,
            decimals: 0,
        };
        assert_eq!(mint.ui_amount(42), Decimal::new(42, 0));
    }

    #[test]
    fn new_token_account_is_empty() {
        let acct = TokenAccount::new(Address([1u8; 32]), Address([2u8; 32]));
        assert_eq!(acct.amount, 0);
        assert_eq!(acct.mint, Address([1u8; 32]));
    }
}
