//! # Escrow record: the persistent state of one bilateral offer
//!
//! A record lives at the address derived from `("escrow", maker, seed)`.
//! Its vault (the holding account for the deposit) is the canonical holding
//! address of `(escrow address, mint_a)`. Record and vault are created
//! together and destroyed together.
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  take / refund  ┌────────┐
//!   │ ACTIVE ├────────────────▶│ CLOSED │
//!   └────────┘                 └────────┘
//! ```
//!
//! `CLOSED` is terminal: the record no longer exists and its address cannot
//! be reused.
//!
//! ## Byte Layout
//!
//! ```text
//! [0..8]     discriminator  sha256("account:Escrow")[..8]
//! [8..16]    u64 LE         seed
//! [16..48]   Address        maker
//! [48..80]   Address        mint_a
//! [80..112]  Address        mint_b
//! [112..120] u64 LE         receive
//! [120]      u8             bump
//! ```

use serde::{Deserialize, Serialize};

use crate::{Address, EscrowError, Result};

/// Lifecycle state of an escrow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowState {
    /// Deposit sits in the vault; the offer can be taken or refunded.
    Active,
    /// Taken or refunded. Record and vault are gone.
    Closed,
}

impl EscrowState {
    /// Can a record in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Active, Self::Closed))
    }
}

impl std::fmt::Display for EscrowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// The terms of one offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Maker-chosen value that disambiguates offers from the same maker.
    pub seed: u64,
    /// Who created the offer. Immutable.
    pub maker: Address,
    /// Token type deposited into the vault.
    pub mint_a: Address,
    /// Token type the maker wants back.
    pub mint_b: Address,
    /// Amount of `mint_b` required to take the offer.
    pub receive: u64,
    /// Bump returned by derivation; re-verifies the address without a search.
    pub bump: u8,
}

impl EscrowRecord {
    /// Account type tag: first 8 bytes of `sha256("account:Escrow")`.
    pub const DISCRIMINATOR: [u8; 8] = [0x1f, 0xd5, 0x7b, 0xbb, 0xba, 0x16, 0xda, 0x9b];

    /// Payload size without the discriminator.
    pub const INIT_SPACE: usize = 8 + 32 + 32 + 32 + 8 + 1;

    /// Total account data size.
    pub const LEN: usize = Self::DISCRIMINATOR.len() + Self::INIT_SPACE;

    /// Serialize into the fixed account layout.
    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN);
        data.extend_from_slice(&Self::DISCRIMINATOR);
        data.extend_from_slice(&self.seed.to_le_bytes());
        data.extend_from_slice(self.maker.as_bytes());
        data.extend_from_slice(self.mint_a.as_bytes());
        data.extend_from_slice(self.mint_b.as_bytes());
        data.extend_from_slice(&self.receive.to_le_bytes());
        data.push(self.bump);
        data
    }

    /// Parse the fixed account layout stored at `account`.
    ///
    /// # Errors
    /// Returns `InvalidAccountData` on a wrong length or discriminator.
    pub fn unpack(account: &Address, data: &[u8]) -> Result<Self> {
        let invalid = |reason: &str| EscrowError::InvalidAccountData {
            account: *account,
            reason: reason.to_string(),
        };

        if data.len() != Self::LEN {
            return Err(invalid(&format!(
                "expected {} bytes, found {}",
                Self::LEN,
                data.len()
            )));
        }
        let (disc, rest) = data.split_at(8);
        if disc != Self::DISCRIMINATOR {
            return Err(invalid("discriminator mismatch"));
        }

        let (seed, rest) = rest.split_at(8);
        let (maker, rest) = rest.split_at(32);
        let (mint_a, rest) = rest.split_at(32);
        let (mint_b, rest) = rest.split_at(32);
        let (receive, bump) = rest.split_at(8);

        Ok(Self {
            seed: u64::from_le_bytes(to_array(seed).ok_or_else(|| invalid("seed"))?),
            maker: Address(to_array(maker).ok_or_else(|| invalid("maker"))?),
            mint_a: Address(to_array(mint_a).ok_or_else(|| invalid("mint_a"))?),
            mint_b: Address(to_array(mint_b).ok_or_else(|| invalid("mint_b"))?),
            receive: u64::from_le_bytes(to_array(receive).ok_or_else(|| invalid("receive"))?),
            bump: bump[0],
        })
    }
}

fn to_array<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.try_into().ok()
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};

    use super::*;

    fn make_record() -> EscrowRecord {
        EscrowRecord {
            seed: 123_456_789,
            maker: Address([1u8; 32]),
            mint_a: Address([2u8; 32]),
            mint_b: Address([3u8; 32]),
            receive: 5_000_000,
            bump: 254,
        }
    }

    #[test]
    fn state_transitions() {
        assert!(EscrowState::Active.can_transition_to(EscrowState::Closed));
        assert!(!EscrowState::Closed.can_transition_to(EscrowState::Active));
        assert!(!EscrowState::Closed.can_transition_to(EscrowState::Closed));
        assert!(!EscrowState::Active.can_transition_to(EscrowState::Active));
    }

    #[test]
    fn discriminator_matches_type_name_hash() {
        let digest = Sha256::digest(b"account:Escrow");
        assert_eq!(&digest[..8], &EscrowRecord::DISCRIMINATOR);
    }

    #[test]
    fn layout_size() {
        assert_eq!(EscrowRecord::LEN, 121);
        assert_eq!(make_record().pack().len(), EscrowRecord::LEN);
    }

    #[test]
    fn pack_places_fields_at_fixed_offsets() {
        let data = make_record().pack();
        assert_eq!(&data[8..16], &123_456_789u64.to_le_bytes());
        assert_eq!(&data[16..48], &[1u8; 32]);
        assert_eq!(&data[112..120], &5_000_000u64.to_le_bytes());
        assert_eq!(data[120], 254);
    }

    #[test]
    fn unpack_reads_back_packed_record() {
        let record = make_record();
        let back = EscrowRecord::unpack(&Address::default(), &record.pack()).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn unpack_rejects_bad_discriminator() {
        let mut data = make_record().pack();
        data[0] ^= 0xFF;
        let err = EscrowRecord::unpack(&Address::default(), &data).unwrap_err();
        assert!(matches!(err, EscrowError::InvalidAccountData { .. }));
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        let data = make_record().pack();
        let err = EscrowRecord::unpack(&Address::default(), &data[..100]).unwrap_err();
        assert!(matches!(err, EscrowError::InvalidAccountData { .. }));
    }

    #[test]
    fn same_mint_is_representable() {
        let mut record = make_record();
        record.mint_b = record.mint_a;
        let back = EscrowRecord::unpack(&Address::default(), &record.pack()).unwrap();
        assert_eq!(back.mint_a, back.mint_b);
    }
}
