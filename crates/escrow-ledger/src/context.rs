//! Transactional execution context.
//!
//! An [`InvokeContext`] is created per transaction. Programs read committed
//! state through it and stage every write in an overlay. The ledger commits
//! the overlay only after every instruction succeeds; on error the context
//! is dropped and nothing is applied.
//!
//! The context also carries the built-in system and token operations:
//! account creation with storage deposits, checked token transfers, and
//! account closing. Each mutation requires the touched accounts to be
//! listed as writable in the current instruction.
//!
//! ## Derived-address authority
//!
//! A derived address has no private key. A program acts for it by passing
//! the signer seeds (bump included); the context re-derives the address
//! under the running program's id and compares.

use std::collections::HashMap;

use escrow_types::{
    Account, AccountData, AccountMeta, Address, EscrowError, Instruction, Mint, Result,
    TokenAccount,
    constants::{SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID},
    derivation::{create_program_address, holding_address},
};

use crate::rent::Rent;

/// A decimal-checked token transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub source: Address,
    pub mint: Address,
    pub destination: Address,
    /// Owner of `source`; must sign, or be proven by signer seeds.
    pub authority: Address,
    pub amount: u64,
    /// Must equal the mint's decimals.
    pub decimals: u8,
}

/// Staged writes handed back to the ledger for commit.
pub(crate) struct StagedChanges {
    /// `None` marks a closed account.
    pub writes: HashMap<Address, Option<Account>>,
    pub created: Vec<Address>,
    pub closed: Vec<Address>,
    pub logs: Vec<String>,
}

/// Per-transaction view of the ledger with staged writes.
pub struct InvokeContext<'a> {
    accounts: &'a HashMap<Address, Account>,
    tombstones: &'a HashMap<Address, u64>,
    rent: &'a Rent,
    staged: HashMap<Address, Option<Account>>,
    created: Vec<Address>,
    closed: Vec<Address>,
    logs: Vec<String>,
    /// Program running the current instruction.
    program_id: Address,
    /// Account list of the current instruction.
    metas: Vec<AccountMeta>,
}

impl<'a> InvokeContext<'a> {
    pub(crate) fn new(
        accounts: &'a HashMap<Address, Account>,
        tombstones: &'a HashMap<Address, u64>,
        rent: &'a Rent,
    ) -> Self {
        Self {
            accounts,
            tombstones,
            rent,
            staged: HashMap::new(),
            created: Vec::new(),
            closed: Vec::new(),
            logs: Vec::new(),
            program_id: SYSTEM_PROGRAM_ID,
            metas: Vec::new(),
        }
    }

    /// Switch to the next instruction. Staged writes carry over.
    pub(crate) fn begin_instruction(&mut self, instruction: &Instruction) {
        self.program_id = instruction.program_id;
        self.metas.clone_from(&instruction.accounts);
    }

    pub(crate) fn into_changes(self) -> StagedChanges {
        StagedChanges {
            writes: self.staged,
            created: self.created,
            closed: self.closed,
            logs: self.logs,
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[must_use]
    pub fn program_id(&self) -> Address {
        self.program_id
    }

    #[must_use]
    pub fn rent(&self) -> &Rent {
        self.rent
    }

    /// Current state of an account, staged writes included.
    #[must_use]
    pub fn account(&self, address: &Address) -> Option<&Account> {
        match self.staged.get(address) {
            Some(staged) => staged.as_ref(),
            None => self.accounts.get(address),
        }
    }

    #[must_use]
    pub fn exists(&self, address: &Address) -> bool {
        self.account(address).is_some()
    }

    /// Closed earlier, either in a committed transaction or in this one.
    #[must_use]
    pub fn is_closed(&self, address: &Address) -> bool {
        matches!(self.staged.get(address), Some(None)) || self.tombstones.contains_key(address)
    }

    pub fn require_account(&self, address: &Address) -> Result<&Account> {
        self.account(address)
            .ok_or(EscrowError::AccountNotFound(*address))
    }

    pub fn token_account(&self, address: &Address) -> Result<&TokenAccount> {
        self.require_account(address)?.as_token(address)
    }

    pub fn mint(&self, address: &Address) -> Result<&Mint> {
        self.require_account(address)?.as_mint(address)
    }

    /// Data of an account owned by the running program.
    pub fn program_data(&self, address: &Address) -> Result<&[u8]> {
        self.require_account(address)?
            .as_program_data(address, &self.program_id)
    }

    #[must_use]
    pub fn lamports(&self, address: &Address) -> u64 {
        self.account(address).map_or(0, |a| a.lamports)
    }

    /// Whether `address` signed the transaction and is marked signer here.
    ///
    /// Signatures of every signer-marked account are verified before any
    /// instruction runs.
    #[must_use]
    pub fn is_signer(&self, address: &Address) -> bool {
        self.metas
            .iter()
            .any(|m| m.address == *address && m.is_signer)
    }

    #[must_use]
    pub fn is_writable(&self, address: &Address) -> bool {
        self.metas
            .iter()
            .any(|m| m.address == *address && m.is_writable)
    }

    /// Append a line to the transaction log.
    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }

    // ------------------------------------------------------------------
    // System operations
    // ------------------------------------------------------------------

    /// Allocate a zeroed account of `space` bytes at a derived address owned
    /// by the running program. `payer` funds the storage deposit.
    ///
    /// # Errors
    /// - `SeedsMismatch` if `signer_seeds` do not derive `address`
    /// - `AccountAlreadyInUse` if the address exists or was ever closed
    /// - `InsufficientLamports` if the payer cannot fund the deposit
    pub fn create_program_account(
        &mut self,
        payer: &Address,
        address: &Address,
        space: usize,
        signer_seeds: &[&[u8]],
    ) -> Result<()> {
        self.check_authority(address, Some(signer_seeds))?;
        self.create_account(
            payer,
            address,
            self.program_id,
            AccountData::Program(vec![0u8; space]),
        )
    }

    /// Overwrite the data of a program-owned account. Size is fixed at creation.
    pub fn write_program_data(&mut self, address: &Address, data: &[u8]) -> Result<()> {
        self.require_writable(address)?;
        let mut account = self.load(address)?;
        let len = account.as_program_data(address, &self.program_id)?.len();
        if len != data.len() {
            return Err(EscrowError::InvalidAccountData {
                account: *address,
                reason: format!("expected {len} bytes, got {}", data.len()),
            });
        }
        account.data = AccountData::Program(data.to_vec());
        self.store(*address, account);
        Ok(())
    }

    /// Close a program-owned account, sending its deposit to `destination`.
    pub fn close_program_account(&mut self, address: &Address, destination: &Address) -> Result<()> {
        self.require_writable(address)?;
        self.require_writable(destination)?;
        let account = self.load(address)?;
        account.as_program_data(address, &self.program_id)?;
        self.close(address, account.lamports, destination)
    }

    // ------------------------------------------------------------------
    // Token operations
    // ------------------------------------------------------------------

    /// Create the canonical holding account for `(owner, mint)` at `holding`.
    ///
    /// # Errors
    /// - `HoldingAddressMismatch` if `holding` is not the canonical address
    /// - `InvalidAccountData` if `mint` is not a mint
    /// - `AccountAlreadyInUse`, `InsufficientLamports` as for any creation
    pub fn create_holding_account(
        &mut self,
        payer: &Address,
        holding: &Address,
        owner: &Address,
        mint: &Address,
    ) -> Result<()> {
        let (expected, _) = holding_address(owner, mint)?;
        if expected != *holding {
            return Err(EscrowError::HoldingAddressMismatch {
                expected,
                actual: *holding,
            });
        }
        self.mint(mint)?;
        self.create_account(
            payer,
            holding,
            TOKEN_PROGRAM_ID,
            AccountData::Token(TokenAccount::new(*mint, *owner)),
        )?;
        tracing::debug!(
            holding = %holding.short(),
            owner = %owner.short(),
            mint = %mint.short(),
            "holding account created"
        );
        Ok(())
    }

    /// Move `amount` of a mint between two holding accounts.
    ///
    /// Pass `signer_seeds` when the authority is a derived address.
    ///
    /// # Errors
    /// - `DecimalsMismatch`, `MintMismatch` on a wrong mint or decimals
    /// - `TokenOwnerMismatch` if `authority` does not own the source
    /// - `MissingRequiredSignature` / `SeedsMismatch` if authority is not proven
    /// - `InsufficientFunds` if the source balance is below `amount`
    pub fn transfer_checked(
        &mut self,
        transfer: &Transfer,
        signer_seeds: Option<&[&[u8]]>,
    ) -> Result<()> {
        let Transfer {
            source,
            mint,
            destination,
            authority,
            amount,
            decimals,
        } = *transfer;

        self.require_writable(&source)?;
        self.require_writable(&destination)?;

        let mint_decimals = self.mint(&mint)?.decimals;
        if mint_decimals != decimals {
            return Err(EscrowError::DecimalsMismatch {
                expected: mint_decimals,
                actual: decimals,
            });
        }

        let src = self.token_account(&source)?.clone();
        if src.mint != mint {
            return Err(EscrowError::MintMismatch {
                field: "source".into(),
                expected: mint,
                actual: src.mint,
            });
        }
        let dst = self.token_account(&destination)?.clone();
        if dst.mint != mint {
            return Err(EscrowError::MintMismatch {
                field: "destination".into(),
                expected: mint,
                actual: dst.mint,
            });
        }
        if src.owner != authority {
            return Err(EscrowError::TokenOwnerMismatch {
                account: source,
                expected: authority,
                actual: src.owner,
            });
        }
        self.check_authority(&authority, signer_seeds)?;

        if src.amount < amount {
            return Err(EscrowError::InsufficientFunds {
                needed: amount,
                available: src.amount,
            });
        }
        if source == destination {
            return Ok(());
        }
        let credited = dst
            .amount
            .checked_add(amount)
            .ok_or(EscrowError::AmountOverflow)?;

        self.set_token_amount(&source, src.amount - amount)?;
        self.set_token_amount(&destination, credited)?;

        tracing::debug!(
            from = %source.short(),
            to = %destination.short(),
            mint = %mint.short(),
            amount,
            "token transfer staged"
        );
        Ok(())
    }

    /// Close an empty holding account, sending its deposit to `destination`.
    ///
    /// # Errors
    /// `NonZeroBalance` if the account still holds tokens.
    pub fn close_token_account(
        &mut self,
        account: &Address,
        destination: &Address,
        authority: &Address,
        signer_seeds: Option<&[&[u8]]>,
    ) -> Result<()> {
        self.require_writable(account)?;
        self.require_writable(destination)?;

        let token = self.token_account(account)?.clone();
        if token.owner != *authority {
            return Err(EscrowError::TokenOwnerMismatch {
                account: *account,
                expected: *authority,
                actual: token.owner,
            });
        }
        self.check_authority(authority, signer_seeds)?;
        if token.amount != 0 {
            return Err(EscrowError::NonZeroBalance(*account));
        }

        let lamports = self.lamports(account);
        self.close(account, lamports, destination)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_writable(&self, address: &Address) -> Result<()> {
        if self.is_writable(address) {
            Ok(())
        } else {
            Err(EscrowError::AccountNotWritable(*address))
        }
    }

    fn require_signer(&self, address: &Address) -> Result<()> {
        if self.is_signer(address) {
            Ok(())
        } else {
            Err(EscrowError::MissingRequiredSignature(*address))
        }
    }

    /// Prove that the running program may act for `authority`.
    fn check_authority(&self, authority: &Address, signer_seeds: Option<&[&[u8]]>) -> Result<()> {
        let Some(seeds) = signer_seeds else {
            return self.require_signer(authority);
        };
        match create_program_address(seeds, &self.program_id) {
            Ok(derived) if derived == *authority => Ok(()),
            Ok(derived) => Err(EscrowError::SeedsMismatch {
                expected: derived.to_string(),
                actual: *authority,
            }),
            Err(err) => Err(EscrowError::SeedsMismatch {
                expected: err.to_string(),
                actual: *authority,
            }),
        }
    }

    fn load(&self, address: &Address) -> Result<Account> {
        self.require_account(address).cloned()
    }

    fn store(&mut self, address: Address, account: Account) {
        self.staged.insert(address, Some(account));
    }

    fn create_account(
        &mut self,
        payer: &Address,
        address: &Address,
        owner: Address,
        data: AccountData,
    ) -> Result<()> {
        self.require_signer(payer)?;
        self.require_writable(payer)?;
        self.require_writable(address)?;
        if self.exists(address) || self.is_closed(address) {
            return Err(EscrowError::AccountAlreadyInUse(*address));
        }

        let mut funder = self.load(payer)?;
        if funder.owner != SYSTEM_PROGRAM_ID {
            return Err(EscrowError::InvalidAccountOwner {
                account: *payer,
                expected: SYSTEM_PROGRAM_ID,
                actual: funder.owner,
            });
        }
        let deposit = self.rent.require(funder.lamports, data.len())?;
        funder.lamports -= deposit;
        self.store(*payer, funder);

        self.store(
            *address,
            Account {
                lamports: deposit,
                owner,
                data,
                version: 0,
            },
        );
        self.created.push(*address);
        Ok(())
    }

    fn close(&mut self, address: &Address, lamports: u64, destination: &Address) -> Result<()> {
        if address == destination {
            return Err(EscrowError::InvalidAccountData {
                account: *address,
                reason: "cannot close an account into itself".into(),
            });
        }
        let mut receiver = self.load(destination)?;
        receiver.lamports = receiver
            .lamports
            .checked_add(lamports)
            .ok_or(EscrowError::AmountOverflow)?;
        self.store(*destination, receiver);
        self.staged.insert(*address, None);
        self.closed.push(*address);
        Ok(())
    }

    fn set_token_amount(&mut self, address: &Address, amount: u64) -> Result<()> {
        let mut account = self.load(address)?;
        match &mut account.data {
            AccountData::Token(token) => token.amount = amount,
            _ => {
                return Err(EscrowError::InvalidAccountData {
                    account: *address,
                    reason: "not a token account".into(),
                });
            }
        }
        self.store(*address, account);
        Ok(())
    }
}
