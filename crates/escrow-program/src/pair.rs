//! The record + vault pair.
//!
//! An escrow record and its vault are created together by
//! [`EscrowPair::open`] and destroyed together by [`EscrowPair::release`].
//! Release is the only path that debits a vault: it drains the full balance
//! to one destination and closes both accounts, returning their storage
//! deposits to the maker.
//!
//! Everything happens inside the transaction's staged context, so an error
//! at any later point drops the whole pair operation.

use escrow_ledger::{InvokeContext, Transfer};
use escrow_types::{
    Address, EscrowRecord, Result, constants::ESCROW_NAMESPACE,
};

use crate::validator::{Constraint, load_record, validate};

/// Accounts a claimant presents to take or refund an escrow.
#[derive(Debug, Clone, Copy)]
pub struct Claim {
    /// Seed argument of the instruction.
    pub seed: u64,
    pub escrow: Address,
    pub vault: Address,
    /// Who must have signed: the taker, or the maker on refund.
    pub signer: Address,
    pub maker: Address,
    pub mint_a: Address,
    pub mint_b: Address,
}

/// A validated, loaded escrow with its vault.
#[derive(Debug)]
pub struct EscrowPair {
    pub address: Address,
    pub record: EscrowRecord,
    pub vault: Address,
    /// Vault balance at acquisition.
    pub deposit: u64,
}

impl EscrowPair {
    /// Create the record and its vault, then move `deposit` from `source`
    /// into the vault. The maker pays both storage deposits.
    pub fn open(
        ctx: &mut InvokeContext<'_>,
        record: EscrowRecord,
        address: Address,
        vault: Address,
        source: &Address,
        deposit: u64,
    ) -> Result<Self> {
        let maker = record.maker;
        let seed_bytes = record.seed.to_le_bytes();
        let bump = [record.bump];
        let signer_seeds: [&[u8]; 4] = [ESCROW_NAMESPACE, maker.as_ref(), &seed_bytes, &bump];

        ctx.create_program_account(&maker, &address, EscrowRecord::LEN, &signer_seeds)?;
        ctx.write_program_data(&address, &record.pack())?;
        ctx.create_holding_account(&maker, &vault, &address, &record.mint_a)?;

        let decimals = ctx.mint(&record.mint_a)?.decimals;
        ctx.transfer_checked(
            &Transfer {
                source: *source,
                mint: record.mint_a,
                destination: vault,
                authority: maker,
                amount: deposit,
                decimals,
            },
            None,
        )?;

        Ok(Self {
            address,
            record,
            vault,
            deposit,
        })
    }

    /// Load and validate an existing pair.
    ///
    /// Checks, in order: the record loads, the claimant signed, the stored
    /// maker and mints match the supplied accounts, the seed re-derives the
    /// record address, and the vault is the record's canonical holding
    /// account.
    pub fn acquire(ctx: &InvokeContext<'_>, claim: &Claim) -> Result<Self> {
        let record = load_record(ctx, &claim.escrow)?;
        validate(
            ctx,
            &[
                Constraint::Signer(claim.signer),
                Constraint::HasOne {
                    field: "maker",
                    stored: record.maker,
                    supplied: claim.maker,
                },
                Constraint::HasOne {
                    field: "mint_a",
                    stored: record.mint_a,
                    supplied: claim.mint_a,
                },
                Constraint::HasOne {
                    field: "mint_b",
                    stored: record.mint_b,
                    supplied: claim.mint_b,
                },
                Constraint::Seeds {
                    maker: claim.maker,
                    seed: claim.seed,
                    bump: record.bump,
                    supplied: claim.escrow,
                },
                Constraint::Holding {
                    supplied: claim.vault,
                    owner: claim.escrow,
                    mint: record.mint_a,
                },
            ],
        )?;
        let deposit = ctx.token_account(&claim.vault)?.amount;

        Ok(Self {
            address: claim.escrow,
            record,
            vault: claim.vault,
            deposit,
        })
    }

    /// Drain the vault to `destination` and close vault and record.
    ///
    /// Returns the amount released.
    pub fn release(self, ctx: &mut InvokeContext<'_>, destination: &Address) -> Result<u64> {
        let maker = self.record.maker;
        let seed_bytes = self.record.seed.to_le_bytes();
        let bump = [self.record.bump];
        let signer_seeds: [&[u8]; 4] = [ESCROW_NAMESPACE, maker.as_ref(), &seed_bytes, &bump];

        let decimals = ctx.mint(&self.record.mint_a)?.decimals;
        ctx.transfer_checked(
            &Transfer {
                source: self.vault,
                mint: self.record.mint_a,
                destination: *destination,
                authority: self.address,
                amount: self.deposit,
                decimals,
            },
            Some(&signer_seeds[..]),
        )?;
        ctx.close_token_account(&self.vault, &maker, &self.address, Some(&signer_seeds[..]))?;
        ctx.close_program_account(&self.address, &maker)?;

        tracing::debug!(
            escrow = %self.address.short(),
            to = %destination.short(),
            amount = self.deposit,
            "escrow pair released"
        );
        Ok(self.deposit)
    }
}
