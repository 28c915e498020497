//! Instruction codec and client-side builders.
//!
//! ## Wire format (little-endian)
//!
//! ```text
//! Make   : 0x00 || seed u64 || deposit u64 || receive u64   (25 bytes)
//! Take   : 0x01 || seed u64                                 ( 9 bytes)
//! Refund : 0x02 || seed u64                                 ( 9 bytes)
//! ```
//!
//! The builders derive every address (escrow record, vault, holding
//! accounts) from the maker, taker, mints and seed, so callers never pass
//! derived addresses by hand.

use escrow_types::{
    AccountMeta, Address, EscrowError, Instruction, Result,
    derivation::{escrow_address, holding_address},
};

/// Decoded escrow instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowInstruction {
    /// Open an offer: deposit `deposit` of mint A, ask `receive` of mint B.
    Make { seed: u64, deposit: u64, receive: u64 },
    /// Fill an offer.
    Take { seed: u64 },
    /// Cancel an offer and reclaim the deposit.
    Refund { seed: u64 },
}

impl EscrowInstruction {
    pub const MAKE: u8 = 0;
    pub const TAKE: u8 = 1;
    pub const REFUND: u8 = 2;

    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        match *self {
            Self::Make {
                seed,
                deposit,
                receive,
            } => {
                let mut data = Vec::with_capacity(25);
                data.push(Self::MAKE);
                data.extend_from_slice(&seed.to_le_bytes());
                data.extend_from_slice(&deposit.to_le_bytes());
                data.extend_from_slice(&receive.to_le_bytes());
                data
            }
            Self::Take { seed } => tagged(Self::TAKE, seed),
            Self::Refund { seed } => tagged(Self::REFUND, seed),
        }
    }

    /// Decode instruction data.
    ///
    /// # Errors
    /// Returns `InvalidInstruction` on an unknown tag or a wrong length.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        let (&tag, rest) = data.split_first().ok_or_else(|| invalid("empty instruction data"))?;
        match tag {
            Self::MAKE => {
                let [seed, deposit, receive] = read_u64s::<3>(rest)?;
                Ok(Self::Make {
                    seed,
                    deposit,
                    receive,
                })
            }
            Self::TAKE => {
                let [seed] = read_u64s::<1>(rest)?;
                Ok(Self::Take { seed })
            }
            Self::REFUND => {
                let [seed] = read_u64s::<1>(rest)?;
                Ok(Self::Refund { seed })
            }
            other => Err(invalid(&format!("unknown instruction tag {other}"))),
        }
    }
}

fn tagged(tag: u8, seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(9);
    data.push(tag);
    data.extend_from_slice(&seed.to_le_bytes());
    data
}

fn invalid(reason: &str) -> EscrowError {
    EscrowError::InvalidInstruction {
        reason: reason.to_string(),
    }
}

/// Read exactly `N` little-endian `u64`s.
fn read_u64s<const N: usize>(bytes: &[u8]) -> Result<[u64; N]> {
    if bytes.len() != N * 8 {
        return Err(invalid(&format!(
            "expected {} argument bytes, got {}",
            N * 8,
            bytes.len()
        )));
    }
    let mut out = [0u64; N];
    for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(chunk);
        *value = u64::from_le_bytes(buf);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// `make(seed, deposit, receive)`.
///
/// Accounts: maker (signer, writable), mint_a, mint_b, maker's mint_a
/// holding (writable), escrow (writable), vault (writable).
pub fn make(
    program_id: &Address,
    maker: &Address,
    mint_a: &Address,
    mint_b: &Address,
    seed: u64,
    deposit: u64,
    receive: u64,
) -> Result<Instruction> {
    let (escrow, _) = escrow_address(maker, seed, program_id)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*maker, true),
            AccountMeta::new_readonly(*mint_a, false),
            AccountMeta::new_readonly(*mint_b, false),
            AccountMeta::new(holding_address(maker, mint_a)?.0, false),
            AccountMeta::new(escrow, false),
            AccountMeta::new(holding_address(&escrow, mint_a)?.0, false),
        ],
        data: EscrowInstruction::Make {
            seed,
            deposit,
            receive,
        }
        .pack(),
    })
}

/// `take(seed)`.
///
/// Accounts: maker (writable), taker (signer, writable), mint_a, mint_b,
/// maker's mint_b holding, taker's mint_a holding, taker's mint_b holding,
/// escrow, vault (all writable).
pub fn take(
    program_id: &Address,
    maker: &Address,
    taker: &Address,
    mint_a: &Address,
    mint_b: &Address,
    seed: u64,
) -> Result<Instruction> {
    let (escrow, _) = escrow_address(maker, seed, program_id)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*maker, false),
            AccountMeta::new(*taker, true),
            AccountMeta::new_readonly(*mint_a, false),
            AccountMeta::new_readonly(*mint_b, false),
            AccountMeta::new(holding_address(maker, mint_b)?.0, false),
            AccountMeta::new(holding_address(taker, mint_a)?.0, false),
            AccountMeta::new(holding_address(taker, mint_b)?.0, false),
            AccountMeta::new(escrow, false),
            AccountMeta::new(holding_address(&escrow, mint_a)?.0, false),
        ],
        data: EscrowInstruction::Take { seed }.pack(),
    })
}

/// `refund(seed)`.
///
/// Accounts: maker (signer, writable), mint_a, mint_b, maker's mint_a
/// holding (writable), escrow (writable), vault (writable).
pub fn refund(
    program_id: &Address,
    maker: &Address,
    mint_a: &Address,
    mint_b: &Address,
    seed: u64,
) -> Result<Instruction> {
    let (escrow, _) = escrow_address(maker, seed, program_id)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*maker, true),
            AccountMeta::new_readonly(*mint_a, false),
            AccountMeta::new_readonly(*mint_b, false),
            AccountMeta::new(holding_address(maker, mint_a)?.0, false),
            AccountMeta::new(escrow, false),
            AccountMeta::new(holding_address(&escrow, mint_a)?.0, false),
        ],
        data: EscrowInstruction::Refund { seed }.pack(),
    })
}
