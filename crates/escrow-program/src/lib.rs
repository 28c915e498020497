//! # escrow-program
//!
//! Atomic two-party token swap. A maker deposits mint A into a vault
//! controlled by a derived escrow address and names how much of mint B it
//! wants back. A taker can fill the offer in one atomic step, or the maker
//! can cancel and reclaim the deposit.
//!
//! ## Instructions
//!
//! | Tag | Name     | Effect |
//! |-----|----------|--------|
//! | 0   | `make`   | create record + vault, deposit mint A |
//! | 1   | `take`   | pay mint B to maker, receive vault, close pair |
//! | 2   | `refund` | return vault to maker, close pair |
//!
//! ## Modules
//!
//! - [`instruction`]: wire codec and client builders
//! - [`validator`]: account constraints checked before any mutation
//! - [`pair`]: joint creation and release of record + vault
//! - [`instructions`]: the three handlers

pub mod instruction;
pub mod instructions;
pub mod pair;
pub mod validator;

use escrow_ledger::{InvokeContext, Ledger, Program};
use escrow_types::{
    Address, EscrowError, EscrowRecord, EscrowState, Instruction, Result,
    derivation::{escrow_address, holding_address},
};

pub use instruction::EscrowInstruction;
pub use pair::{Claim, EscrowPair};
pub use validator::Constraint;

/// Program id.
pub const ID: Address = Address::new([
    0xd0, 0x48, 0x8a, 0x1b, 0xa3, 0x5e, 0x8d, 0xee, 0xab, 0x8f, 0x73, 0xe0, 0x98, 0xc0, 0xfb, 0x60,
    0xe6, 0x1b, 0x42, 0x8c, 0x7a, 0x60, 0xce, 0x73, 0x12, 0xa8, 0x0f, 0xb3, 0x40, 0x01, 0x4f, 0x89,
]);

/// The escrow program, ready to register with a [`Ledger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EscrowProgram;

impl Program for EscrowProgram {
    fn id(&self) -> Address {
        ID
    }

    fn name(&self) -> &'static str {
        "escrow"
    }

    fn process(&self, ctx: &mut InvokeContext<'_>, instruction: &Instruction) -> Result<()> {
        match EscrowInstruction::unpack(&instruction.data)? {
            EscrowInstruction::Make {
                seed,
                deposit,
                receive,
            } => instructions::make::process(ctx, instruction, seed, deposit, receive),
            EscrowInstruction::Take { seed } => instructions::take::process(ctx, instruction, seed),
            EscrowInstruction::Refund { seed } => {
                instructions::refund::process(ctx, instruction, seed)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Escrow record address and bump for `(maker, seed)`.
pub fn find_escrow_address(maker: &Address, seed: u64) -> Result<(Address, u8)> {
    escrow_address(maker, seed, &ID)
}

/// Vault address of the escrow at `escrow` holding `mint_a`.
pub fn find_vault_address(escrow: &Address, mint_a: &Address) -> Result<Address> {
    Ok(holding_address(escrow, mint_a)?.0)
}

/// Lifecycle state of the escrow at `address`.
///
/// `None` means no escrow was ever created there.
#[must_use]
pub fn escrow_state(ledger: &Ledger, address: &Address) -> Option<EscrowState> {
    if fetch_escrow(ledger, address).is_ok() {
        Some(EscrowState::Active)
    } else if ledger.is_closed(address) {
        Some(EscrowState::Closed)
    } else {
        None
    }
}

/// Read the live escrow record at `address`.
///
/// # Errors
/// - `AccountNotFound` if nothing lives there
/// - `InvalidAccountOwner` / `InvalidAccountData` if it is not an escrow
pub fn fetch_escrow(ledger: &Ledger, address: &Address) -> Result<EscrowRecord> {
    let account = ledger
        .account(address)
        .ok_or(EscrowError::AccountNotFound(*address))?;
    EscrowRecord::unpack(address, account.as_program_data(address, &ID)?)
}

/// Every open escrow, sorted by address.
#[must_use]
pub fn open_escrows(ledger: &Ledger) -> Vec<(Address, EscrowRecord)> {
    ledger
        .program_accounts(&ID)
        .into_iter()
        .filter_map(|(address, account)| {
            let data = account.as_program_data(&address, &ID).ok()?;
            EscrowRecord::unpack(&address, data).ok().map(|r| (address, r))
        })
        .collect()
}
