//! `make`: open an offer.
//!
//! Allocates the escrow record at `("escrow", maker, seed)`, allocates its
//! vault, and moves the deposit of mint A from the maker into the vault.
//! The maker pays both storage deposits.

use escrow_ledger::InvokeContext;
use escrow_types::{
    EscrowError, EscrowRecord, Instruction, Result, derivation::escrow_address,
};

use super::account_keys;
use crate::pair::EscrowPair;
use crate::validator::{Constraint, validate};

pub fn process(
    ctx: &mut InvokeContext<'_>,
    instruction: &Instruction,
    seed: u64,
    deposit: u64,
    receive: u64,
) -> Result<()> {
    let [maker, mint_a, mint_b, maker_ata_a, escrow, vault] = account_keys::<6>(instruction)?;

    if deposit == 0 {
        return Err(EscrowError::InvalidAmount {
            reason: "deposit must be greater than zero".into(),
        });
    }

    let (_, bump) = escrow_address(&maker, seed, &ctx.program_id())?;
    validate(
        ctx,
        &[
            Constraint::Signer(maker),
            Constraint::Mint(mint_a),
            Constraint::Mint(mint_b),
            Constraint::Seeds {
                maker,
                seed,
                bump,
                supplied: escrow,
            },
            Constraint::Holding {
                supplied: maker_ata_a,
                owner: maker,
                mint: mint_a,
            },
            Constraint::Holding {
                supplied: vault,
                owner: escrow,
                mint: mint_a,
            },
        ],
    )?;

    let available = ctx.token_account(&maker_ata_a)?.amount;
    if available < deposit {
        return Err(EscrowError::InsufficientFunds {
            needed: deposit,
            available,
        });
    }

    let record = EscrowRecord {
        seed,
        maker,
        mint_a,
        mint_b,
        receive,
        bump,
    };
    EscrowPair::open(ctx, record, escrow, vault, &maker_ata_a, deposit)?;

    ctx.log(format!(
        "Instruction: Make seed={seed} deposit={deposit} receive={receive}"
    ));
    tracing::info!(
        escrow = %escrow.short(),
        maker = %maker.short(),
        seed,
        deposit,
        receive,
        "escrow opened"
    );
    Ok(())
}
