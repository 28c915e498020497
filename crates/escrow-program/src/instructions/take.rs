//! `take`: fill an offer.
//!
//! In one atomic unit the taker pays `receive` of mint B to the maker, the
//! vault's full balance of mint A goes to the taker, and vault and record
//! close with their deposits returned to the maker. Missing destination
//! holding accounts are created first at the taker's expense.

use escrow_ledger::{InvokeContext, Transfer};
use escrow_types::{EscrowError, Instruction, Result};

use super::account_keys;
use crate::pair::{Claim, EscrowPair};
use crate::validator::{Constraint, validate};

pub fn process(ctx: &mut InvokeContext<'_>, instruction: &Instruction, seed: u64) -> Result<()> {
    let [
        maker,
        taker,
        mint_a,
        mint_b,
        maker_ata_b,
        taker_ata_a,
        taker_ata_b,
        escrow,
        vault,
    ] = account_keys::<9>(instruction)?;

    let pair = EscrowPair::acquire(
        ctx,
        &Claim {
            seed,
            escrow,
            vault,
            signer: taker,
            maker,
            mint_a,
            mint_b,
        },
    )?;
    validate(
        ctx,
        &[
            Constraint::Holding {
                supplied: taker_ata_b,
                owner: taker,
                mint: mint_b,
            },
            Constraint::Holding {
                supplied: taker_ata_a,
                owner: taker,
                mint: mint_a,
            },
            Constraint::Holding {
                supplied: maker_ata_b,
                owner: maker,
                mint: mint_b,
            },
        ],
    )?;

    let receive = pair.record.receive;
    // A taker without a mint B account holds nothing to pay with.
    let available = if ctx.exists(&taker_ata_b) {
        ctx.token_account(&taker_ata_b)?.amount
    } else {
        0
    };
    if available < receive {
        return Err(EscrowError::InsufficientFunds {
            needed: receive,
            available,
        });
    }

    if !ctx.exists(&taker_ata_a) {
        ctx.create_holding_account(&taker, &taker_ata_a, &taker, &mint_a)?;
    }
    if !ctx.exists(&maker_ata_b) {
        ctx.create_holding_account(&taker, &maker_ata_b, &maker, &mint_b)?;
    }

    // A free offer needs no mint B source at all.
    if receive > 0 {
        let decimals = ctx.mint(&mint_b)?.decimals;
        ctx.transfer_checked(
            &Transfer {
                source: taker_ata_b,
                mint: mint_b,
                destination: maker_ata_b,
                authority: taker,
                amount: receive,
                decimals,
            },
            None,
        )?;
    }
    let released = pair.release(ctx, &taker_ata_a)?;

    ctx.log(format!(
        "Instruction: Take seed={seed} paid={receive} received={released}"
    ));
    tracing::info!(
        escrow = %escrow.short(),
        taker = %taker.short(),
        paid = receive,
        received = released,
        "escrow taken"
    );
    Ok(())
}
