//! The ledger: versioned account state with all-or-nothing transactions.
//!
//! ## Transaction pipeline
//!
//! ```text
//! verify signatures → replay check → run instructions (staged) → commit
//!                                              │ error
//!                                              ▼
//!                                      drop staged writes
//! ```
//!
//! A commit bumps the ledger version, stamps every written account with it,
//! tombstones closed accounts, records the transaction id for replay
//! rejection and appends a [`TxReceipt`].

use std::collections::HashMap;

use chrono::Utc;
use escrow_types::{
    Account, AccountData, Address, EscrowError, LedgerConfig, Mint, Result, TokenAccount,
    Transaction, TxId, TxReceipt,
    constants::TOKEN_PROGRAM_ID,
    derivation::holding_address,
};

use crate::context::{InvokeContext, StagedChanges};
use crate::program::Program;
use crate::rent::Rent;
use crate::replay_guard::ReplayGuard;
use crate::supply_conservation::{Asset, SupplyConservation};

/// In-memory account ledger.
pub struct Ledger {
    config: LedgerConfig,
    rent: Rent,
    accounts: HashMap<Address, Account>,
    /// Closed address → version at close.
    tombstones: HashMap<Address, u64>,
    programs: HashMap<Address, Box<dyn Program>>,
    replay: ReplayGuard,
    supply: SupplyConservation,
    version: u64,
    receipts: Vec<TxReceipt>,
}

impl Ledger {
    /// Create an empty ledger.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` does not validate.
    pub fn new(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rent: Rent::new(config.rent.clone()),
            replay: ReplayGuard::new(config.replay_cache_size),
            config,
            accounts: HashMap::new(),
            tombstones: HashMap::new(),
            programs: HashMap::new(),
            supply: SupplyConservation::new(),
            version: 0,
            receipts: Vec::new(),
        })
    }

    /// Register a program under its id.
    ///
    /// # Errors
    /// Returns `Configuration` if the id is already taken.
    pub fn register_program(&mut self, program: Box<dyn Program>) -> Result<()> {
        let id = program.id();
        if self.programs.contains_key(&id) {
            return Err(EscrowError::Configuration(format!(
                "program {id} is already registered"
            )));
        }
        tracing::info!(program = program.name(), id = %id.short(), "program registered");
        self.programs.insert(id, program);
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    #[must_use]
    pub fn rent(&self) -> &Rent {
        &self.rent
    }

    // ------------------------------------------------------------------
    // Genesis helpers (not transactions)
    // ------------------------------------------------------------------

    /// Credit `lamports` to a wallet, creating it if needed.
    pub fn airdrop(&mut self, address: &Address, lamports: u64) -> Result<()> {
        self.ensure_not_closed(address)?;
        let mut account = self
            .accounts
            .get(address)
            .cloned()
            .unwrap_or_else(|| Account::wallet(0));
        account.lamports = account
            .lamports
            .checked_add(lamports)
            .ok_or(EscrowError::AmountOverflow)?;
        self.supply.record_issuance(Asset::Lamports, lamports);
        self.genesis_write(*address, account);
        Ok(())
    }

    /// Create a mint at `mint` with the given authority and decimals.
    pub fn create_mint(&mut self, mint: &Address, authority: &Address, decimals: u8) -> Result<()> {
        self.ensure_vacant(mint)?;
        let deposit = self.rent.minimum_balance(Mint::LEN);
        self.supply.record_issuance(Asset::Lamports, deposit);
        self.genesis_write(
            *mint,
            Account {
                lamports: deposit,
                owner: TOKEN_PROGRAM_ID,
                data: AccountData::Mint(Mint {
                    mint_authority: Some(*authority),
                    supply: 0,
                    decimals,
                }),
                version: 0,
            },
        );
        Ok(())
    }

    /// Create the canonical holding account for `(owner, mint)`.
    pub fn create_holding_account(&mut self, owner: &Address, mint: &Address) -> Result<Address> {
        self.accounts
            .get(mint)
            .ok_or(EscrowError::AccountNotFound(*mint))?
            .as_mint(mint)?;
        let (holding, _) = holding_address(owner, mint)?;
        self.ensure_vacant(&holding)?;

        let deposit = self.rent.minimum_balance(TokenAccount::LEN);
        self.supply.record_issuance(Asset::Lamports, deposit);
        self.genesis_write(
            holding,
            Account {
                lamports: deposit,
                owner: TOKEN_PROGRAM_ID,
                data: AccountData::Token(TokenAccount::new(*mint, *owner)),
                version: 0,
            },
        );
        Ok(holding)
    }

    /// Issue `amount` new units of `mint` into `holding`.
    pub fn mint_to(&mut self, mint: &Address, holding: &Address, amount: u64) -> Result<()> {
        let mut mint_account = self
            .accounts
            .get(mint)
            .cloned()
            .ok_or(EscrowError::AccountNotFound(*mint))?;
        let mut holding_account = self
            .accounts
            .get(holding)
            .cloned()
            .ok_or(EscrowError::AccountNotFound(*holding))?;

        let AccountData::Mint(mint_state) = &mut mint_account.data else {
            return Err(EscrowError::InvalidAccountData {
                account: *mint,
                reason: "not a mint".into(),
            });
        };
        if mint_state.mint_authority.is_none() {
            return Err(EscrowError::InvalidAccountData {
                account: *mint,
                reason: "mint has a fixed supply".into(),
            });
        }
        let AccountData::Token(token) = &mut holding_account.data else {
            return Err(EscrowError::InvalidAccountData {
                account: *holding,
                reason: "not a token account".into(),
            });
        };
        if token.mint != *mint {
            return Err(EscrowError::MintMismatch {
                field: "holding".into(),
                expected: *mint,
                actual: token.mint,
            });
        }

        mint_state.supply = mint_state
            .supply
            .checked_add(amount)
            .ok_or(EscrowError::AmountOverflow)?;
        token.amount = token
            .amount
            .checked_add(amount)
            .ok_or(EscrowError::AmountOverflow)?;

        self.supply.record_issuance(Asset::Token(*mint), amount);
        self.genesis_write(*mint, mint_account);
        self.genesis_write(*holding, holding_account);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[must_use]
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Lamport balance; zero for missing accounts.
    #[must_use]
    pub fn lamports(&self, address: &Address) -> u64 {
        self.accounts.get(address).map_or(0, |a| a.lamports)
    }

    #[must_use]
    pub fn token_account(&self, address: &Address) -> Option<&TokenAccount> {
        self.accounts
            .get(address)
            .and_then(|a| a.as_token(address).ok())
    }

    /// Token balance; zero for missing accounts.
    #[must_use]
    pub fn token_balance(&self, address: &Address) -> u64 {
        self.token_account(address).map_or(0, |t| t.amount)
    }

    #[must_use]
    pub fn mint(&self, address: &Address) -> Option<&Mint> {
        self.accounts
            .get(address)
            .and_then(|a| a.as_mint(address).ok())
    }

    #[must_use]
    pub fn exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    /// Whether `address` was closed by a committed transaction.
    #[must_use]
    pub fn is_closed(&self, address: &Address) -> bool {
        self.tombstones.contains_key(address)
    }

    /// Ledger version at which `address` was closed.
    #[must_use]
    pub fn closed_at(&self, address: &Address) -> Option<u64> {
        self.tombstones.get(address).copied()
    }

    /// Current ledger version. Every commit and genesis write bumps it.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Receipts of every committed transaction, oldest first.
    #[must_use]
    pub fn receipts(&self) -> &[TxReceipt] {
        &self.receipts
    }

    /// Accounts owned by `program_id`, sorted by address.
    #[must_use]
    pub fn program_accounts(&self, program_id: &Address) -> Vec<(Address, &Account)> {
        let mut owned: Vec<(Address, &Account)> = self
            .accounts
            .iter()
            .filter(|(_, a)| a.owner == *program_id)
            .map(|(addr, a)| (*addr, a))
            .collect();
        owned.sort_by_key(|(addr, _)| *addr);
        owned
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Execute a signed transaction atomically.
    ///
    /// # Errors
    /// Any error from signature verification, the replay guard, or a
    /// program. On error the ledger is unchanged.
    pub fn process_transaction(&mut self, tx: &Transaction) -> Result<TxReceipt> {
        let tx_id = tx.id();
        let tag = tx_id.short();
        tracing::debug!(
            tx = %tag,
            instructions = tx.message.instructions.len(),
            "processing transaction"
        );

        match self.execute(tx, &tx_id) {
            Ok(changes) => self.commit(tx_id, changes),
            Err(err) => {
                tracing::warn!(tx = %tag, error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    fn execute(&self, tx: &Transaction, tx_id: &TxId) -> Result<StagedChanges> {
        tx.verify_signatures()?;
        self.replay.check(tx_id)?;
        if tx.message.instructions.is_empty() {
            return Err(EscrowError::InvalidInstruction {
                reason: "transaction has no instructions".into(),
            });
        }

        let mut ctx = InvokeContext::new(&self.accounts, &self.tombstones, &self.rent);
        for instruction in &tx.message.instructions {
            let program = self
                .programs
                .get(&instruction.program_id)
                .ok_or(EscrowError::UnknownProgram(instruction.program_id))?;
            ctx.begin_instruction(instruction);
            program.process(&mut ctx, instruction)?;
        }
        Ok(ctx.into_changes())
    }

    fn commit(&mut self, tx_id: TxId, changes: StagedChanges) -> Result<TxReceipt> {
        self.replay.mark_committed(tx_id)?;
        self.version += 1;
        let version = self.version;

        let mut touched: Vec<Address> = changes.writes.keys().copied().collect();
        touched.sort();

        for (address, write) in changes.writes {
            match write {
                Some(mut account) => {
                    account.version = version;
                    self.accounts.insert(address, account);
                }
                None => {
                    self.accounts.remove(&address);
                    self.tombstones.insert(address, version);
                }
            }
        }

        let receipt = TxReceipt {
            tx_id: tx_id.to_string(),
            version,
            created: changes.created,
            closed: changes.closed,
            touched,
            logs: changes.logs,
            executed_at: Utc::now(),
        };
        tracing::info!(
            tx = %receipt.tx_id,
            version,
            created = receipt.created.len(),
            closed = receipt.closed.len(),
            "transaction committed"
        );
        self.receipts.push(receipt.clone());
        Ok(receipt)
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    /// Check supply conservation for lamports and every issued mint.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` naming the first broken asset.
    pub fn verify_supply(&self) -> Result<()> {
        let lamports: u128 = self.accounts.values().map(|a| u128::from(a.lamports)).sum();
        self.supply.verify(&Asset::Lamports, lamports)?;

        for asset in self.supply.tracked_assets() {
            let Asset::Token(mint) = asset else { continue };
            let held: u128 = self
                .accounts
                .values()
                .filter_map(|a| match &a.data {
                    AccountData::Token(token) if token.mint == mint => Some(u128::from(token.amount)),
                    _ => None,
                })
                .sum();
            self.supply.verify(&asset, held)?;

            let recorded = self.mint(&mint).map_or(0, |m| u128::from(m.supply));
            self.supply.verify(&asset, recorded)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_not_closed(&self, address: &Address) -> Result<()> {
        if self.is_closed(address) {
            return Err(EscrowError::AccountAlreadyInUse(*address));
        }
        Ok(())
    }

    fn ensure_vacant(&self, address: &Address) -> Result<()> {
        self.ensure_not_closed(address)?;
        if self.exists(address) {
            return Err(EscrowError::AccountAlreadyInUse(*address));
        }
        Ok(())
    }

    fn genesis_write(&mut self, address: Address, mut account: Account) {
        self.version += 1;
        account.version = self.version;
        self.accounts.insert(address, account);
    }
}

/// Dry runs for program unit tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Ledger {
    /// Run `f` against a context over committed state, as if executing
    /// `instruction`. Staged writes are discarded.
    pub fn with_context<R>(
        &self,
        instruction: &escrow_types::Instruction,
        f: impl FnOnce(&mut InvokeContext<'_>) -> R,
    ) -> R {
        let mut ctx = InvokeContext::new(&self.accounts, &self.tombstones, &self.rent);
        ctx.begin_instruction(instruction);
        f(&mut ctx)
    }
}
