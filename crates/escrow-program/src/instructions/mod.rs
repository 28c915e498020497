//! Instruction handlers.
//!
//! Each handler validates its accounts first and then mutates through the
//! staged context. Any error aborts the whole transaction.

pub mod make;
pub mod refund;
pub mod take;

use escrow_types::{Address, EscrowError, Instruction, Result};

/// First `N` account addresses of an instruction, in order.
pub(crate) fn account_keys<const N: usize>(instruction: &Instruction) -> Result<[Address; N]> {
    if instruction.accounts.len() < N {
        return Err(EscrowError::NotEnoughAccountKeys {
            expected: N,
            actual: instruction.accounts.len(),
        });
    }
    let mut keys = [Address::default(); N];
    for (key, meta) in keys.iter_mut().zip(&instruction.accounts) {
        *key = meta.address;
    }
    Ok(keys)
}
