//! Ledger accounts.
//!
//! An account is a lamport balance (its storage deposit, plus any free
//! balance for wallets), the program that owns it, and typed data. Only the
//! owning program may change the data.

use serde::{Deserialize, Serialize};

use crate::{
    Address, EscrowError, Mint, Result, TokenAccount,
    constants::{SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID},
};

/// Account payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountData {
    /// A plain wallet with no data.
    Empty,
    /// A token type, owned by the token module.
    Mint(Mint),
    /// A token holding account, owned by the token module.
    Token(TokenAccount),
    /// Opaque bytes owned by a program.
    Program(Vec<u8>),
}

impl AccountData {
    /// Storage footprint in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Mint(_) => Mint::LEN,
            Self::Token(_) => TokenAccount::LEN,
            Self::Program(bytes) => bytes.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Native balance, including the storage deposit.
    pub lamports: u64,
    /// The program allowed to modify `data`.
    pub owner: Address,
    pub data: AccountData,
    /// Ledger version of the last committed write to this account.
    pub version: u64,
}

impl Account {
    /// A wallet account holding `lamports`.
    #[must_use]
    pub fn wallet(lamports: u64) -> Self {
        Self {
            lamports,
            owner: SYSTEM_PROGRAM_ID,
            data: AccountData::Empty,
            version: 0,
        }
    }

    /// Borrow the token holding state, or fail if this is not a token account.
    pub fn as_token(&self, address: &Address) -> Result<&TokenAccount> {
        match &self.data {
            AccountData::Token(token) if self.owner == TOKEN_PROGRAM_ID => Ok(token),
            _ => Err(EscrowError::InvalidAccountData {
                account: *address,
                reason: "not a token account".into(),
            }),
        }
    }

    /// Borrow the mint state, or fail if this is not a mint.
    pub fn as_mint(&self, address: &Address) -> Result<&Mint> {
        match &self.data {
            AccountData::Mint(mint) if self.owner == TOKEN_PROGRAM_ID => Ok(mint),
            _ => Err(EscrowError::InvalidAccountData {
                account: *address,
                reason: "not a mint".into(),
            }),
        }
    }

    /// Borrow program-owned bytes, checking the owning program.
    pub fn as_program_data(&self, address: &Address, program_id: &Address) -> Result<&[u8]> {
        if self.owner != *program_id {
            return Err(EscrowError::InvalidAccountOwner {
                account: *address,
                expected: *program_id,
                actual: self.owner,
            });
        }
        match &self.data {
            AccountData::Program(bytes) => Ok(bytes),
            _ => Err(EscrowError::InvalidAccountData {
                account: *address,
                reason: "not program data".into(),
            }),
        }
    }
}
