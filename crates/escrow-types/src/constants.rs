//! System-wide constants for the escrow ledger and program.

use crate::Address;

/// Namespace tag that prefixes every escrow record's derivation seeds.
pub const ESCROW_NAMESPACE: &[u8] = b"escrow";

/// Domain separator appended to derived-address preimages.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum number of seeds in one derivation (bump included).
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single derivation seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Owner of plain wallet accounts.
pub const SYSTEM_PROGRAM_ID: Address = Address::new([0u8; 32]);

/// Owner of mints and token holding accounts.
pub const TOKEN_PROGRAM_ID: Address = Address::new([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79, 0xac,
    0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff, 0x00, 0xa9,
]);

/// Namespace under which canonical holding addresses are derived.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Address = Address::new([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d, 0x83,
    0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9, 0xf8, 0x59,
]);

/// Fixed per-account storage overhead charged on top of the data length.
pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

/// Default storage price in lamports per byte-year.
pub const DEFAULT_LAMPORTS_PER_BYTE_YEAR: u64 = 3_480;

/// Default number of years of storage an account must prepay.
pub const DEFAULT_EXEMPTION_THRESHOLD_YEARS: u64 = 2;

/// Number of committed transaction ids remembered for replay rejection.
pub const DEFAULT_REPLAY_CACHE_SIZE: usize = 100_000;

/// Lamports in one whole native unit.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
