//! `refund`: cancel an offer and return the deposit to the maker.

use escrow_ledger::InvokeContext;
use escrow_types::{Instruction, Result};

use super::account_keys;
use crate::pair::{Claim, EscrowPair};
use crate::validator::{Constraint, validate};

pub fn process(ctx: &mut InvokeContext<'_>, instruction: &Instruction, seed: u64) -> Result<()> {
    let [maker, mint_a, mint_b, maker_ata_a, escrow, vault] = account_keys::<6>(instruction)?;

    let pair = EscrowPair::acquire(
        ctx,
        &Claim {
            seed,
            escrow,
            vault,
            signer: maker,
            maker,
            mint_a,
            mint_b,
        },
    )?;
    validate(
        ctx,
        &[Constraint::Holding {
            supplied: maker_ata_a,
            owner: maker,
            mint: mint_a,
        }],
    )?;

    if !ctx.exists(&maker_ata_a) {
        ctx.create_holding_account(&maker, &maker_ata_a, &maker, &mint_a)?;
    }
    let refunded = pair.release(ctx, &maker_ata_a)?;

    ctx.log(format!("Instruction: Refund seed={seed} refunded={refunded}"));
    tracing::info!(
        escrow = %escrow.short(),
        maker = %maker.short(),
        refunded,
        "escrow refunded"
    );
    Ok(())
}
