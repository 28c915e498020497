//! Deterministic address derivation.
//!
//! A derived address is `SHA-256(seed_0 || … || seed_n || program_id || "ProgramDerivedAddress")`,
//! accepted only if the digest is **not** a valid ed25519 point. Since no
//! private key exists for such an address, only the program that owns the
//! namespace can act for it, by presenting the seeds again.
//!
//! [`find_program_address`] appends a one-byte bump and searches downward
//! from 255, returning the first off-curve candidate. Callers store the bump
//! so later checks can use [`create_program_address`] without searching.

use sha2::{Digest, Sha256};

use crate::{
    Address, EscrowError, Result,
    constants::{
        ASSOCIATED_TOKEN_PROGRAM_ID, ESCROW_NAMESPACE, MAX_SEED_LEN, MAX_SEEDS, PDA_MARKER,
        TOKEN_PROGRAM_ID,
    },
};

/// Derive the address for an exact seed list (bump included, if any).
///
/// # Errors
/// - `InvalidSeeds` if there are too many seeds or one is too long
/// - `AddressOnCurve` if the digest is a valid ed25519 point
pub fn create_program_address(seeds: &[&[u8]], program_id: &Address) -> Result<Address> {
    if seeds.len() > MAX_SEEDS {
        return Err(EscrowError::InvalidSeeds {
            reason: format!("{} seeds exceeds the limit of {MAX_SEEDS}", seeds.len()),
        });
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(EscrowError::InvalidSeeds {
            reason: format!("seed of {} bytes exceeds {MAX_SEED_LEN}", seed.len()),
        });
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    let digest = hasher.finalize();

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    let address = Address(bytes);

    if address.is_on_curve() {
        return Err(EscrowError::AddressOnCurve);
    }
    Ok(address)
}

/// Search for the canonical derived address and its bump.
///
/// Tries bumps 255, 254, …, 0 and returns the first off-curve result.
///
/// # Errors
/// - `InvalidSeeds` if the seeds (plus the bump) break the limits
/// - `BumpSeedExhausted` if all 256 candidates are on-curve
pub fn find_program_address(seeds: &[&[u8]], program_id: &Address) -> Result<(Address, u8)> {
    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        with_bump.push(&bump_seed);

        match create_program_address(&with_bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(EscrowError::AddressOnCurve) => {}
            Err(err) => return Err(err),
        }
    }
    Err(EscrowError::BumpSeedExhausted)
}

/// Canonical escrow record address for `(maker, seed)` and its bump.
pub fn escrow_address(maker: &Address, seed: u64, program_id: &Address) -> Result<(Address, u8)> {
    let seed_bytes = seed.to_le_bytes();
    find_program_address(&[ESCROW_NAMESPACE, maker.as_ref(), &seed_bytes], program_id)
}

/// Re-derive an escrow address from a stored bump, without searching.
pub fn escrow_address_with_bump(
    maker: &Address,
    seed: u64,
    bump: u8,
    program_id: &Address,
) -> Result<Address> {
    let seed_bytes = seed.to_le_bytes();
    create_program_address(
        &[ESCROW_NAMESPACE, maker.as_ref(), &seed_bytes, &[bump]],
        program_id,
    )
}

/// Canonical token holding address for `(owner, mint)` and its bump.
pub fn holding_address(owner: &Address, mint: &Address) -> Result<(Address, u8)> {
    find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
}
