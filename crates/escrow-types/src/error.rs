//! Error types for the escrow ledger and program.
//!
//! All errors use the `ESC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by [`ErrorKind`]:
//! - 1xx: Validation (malformed arguments or transactions)
//! - 2xx: Insufficient funds
//! - 3xx: Constraint violations (signers, ownership relations)
//! - 4xx: Derivation mismatches (seeds, canonical addresses)
//! - 5xx: Account existence
//! - 9xx: General / internal errors

use std::fmt;

use thiserror::Error;

use crate::Address;

/// Stable classification of every [`EscrowError`].
///
/// Callers should branch on the kind rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed instruction arguments or transaction.
    Validation,
    /// A source balance is below the amount being moved.
    InsufficientFunds,
    /// Signer or ownership mismatch.
    ConstraintViolation,
    /// Supplied seeds or addresses do not reproduce the derived ones.
    DerivationMismatch,
    /// Referenced account does not exist (or unexpectedly does).
    NotFound,
    /// Invariant breach or internal failure.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::InsufficientFunds => write!(f, "INSUFFICIENT_FUNDS"),
            Self::ConstraintViolation => write!(f, "CONSTRAINT_VIOLATION"),
            Self::DerivationMismatch => write!(f, "DERIVATION_MISMATCH"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Central error enum for all ledger and escrow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// An amount argument is out of range (e.g. zero deposit).
    #[error("ESC_ERR_100: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Instruction data could not be decoded.
    #[error("ESC_ERR_101: Invalid instruction data: {reason}")]
    InvalidInstruction { reason: String },

    /// The instruction named fewer accounts than the handler requires.
    #[error("ESC_ERR_102: Not enough account keys: expected {expected}, got {actual}")]
    NotEnoughAccountKeys { expected: usize, actual: usize },

    /// Derivation seeds violate the count or length limits.
    #[error("ESC_ERR_103: Invalid seeds: {reason}")]
    InvalidSeeds { reason: String },

    /// A checked transfer named the wrong number of decimals.
    #[error("ESC_ERR_104: Decimals mismatch: mint has {expected}, got {actual}")]
    DecimalsMismatch { expected: u8, actual: u8 },

    /// Account data has the wrong type, length, or discriminator.
    #[error("ESC_ERR_105: Invalid data in account {account}: {reason}")]
    InvalidAccountData { account: Address, reason: String },

    /// This exact signed transaction was already committed.
    #[error("ESC_ERR_106: Transaction already processed: {tx_id}")]
    TransactionReplayed { tx_id: String },

    /// No program is registered under the instruction's program id.
    #[error("ESC_ERR_107: Unknown program: {0}")]
    UnknownProgram(Address),

    // =================================================================
    // Funds Errors (2xx)
    // =================================================================
    /// Token balance is below the amount being moved.
    #[error("ESC_ERR_200: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// Lamport balance cannot cover a storage deposit.
    #[error("ESC_ERR_201: Insufficient lamports for storage deposit: need {needed}, have {available}")]
    InsufficientLamports { needed: u64, available: u64 },

    /// A balance addition overflowed `u64`.
    #[error("ESC_ERR_202: Amount overflow")]
    AmountOverflow,

    /// A token account cannot be closed while it still holds tokens.
    #[error("ESC_ERR_203: Account {0} still holds a non-zero token balance")]
    NonZeroBalance(Address),

    // =================================================================
    // Constraint Errors (3xx)
    // =================================================================
    /// An account that must sign did not.
    #[error("ESC_ERR_300: Missing required signature from {0}")]
    MissingRequiredSignature(Address),

    /// A signature failed ed25519 verification.
    #[error("ESC_ERR_301: Invalid signature from {0}")]
    SignatureInvalid(Address),

    /// The escrow's stored maker differs from the supplied maker.
    #[error("ESC_ERR_302: Maker mismatch: escrow belongs to {expected}, got {actual}")]
    MakerMismatch { expected: Address, actual: Address },

    /// A stored or expected mint differs from the supplied mint.
    #[error("ESC_ERR_303: Mint mismatch on {field}: expected {expected}, got {actual}")]
    MintMismatch {
        field: String,
        expected: Address,
        actual: Address,
    },

    /// A token account is owned by someone other than the expected authority.
    #[error("ESC_ERR_304: Token account {account} is owned by {actual}, expected {expected}")]
    TokenOwnerMismatch {
        account: Address,
        expected: Address,
        actual: Address,
    },

    /// An account is owned by the wrong program.
    #[error("ESC_ERR_305: Account {account} is owned by program {actual}, expected {expected}")]
    InvalidAccountOwner {
        account: Address,
        expected: Address,
        actual: Address,
    },

    /// A mutated account was not marked writable in the instruction.
    #[error("ESC_ERR_306: Account {0} is not writable in this instruction")]
    AccountNotWritable(Address),

    // =================================================================
    // Derivation Errors (4xx)
    // =================================================================
    /// The seeds do not reproduce the supplied derived address.
    #[error("ESC_ERR_400: Seeds mismatch: seeds derive {expected}, got {actual}")]
    SeedsMismatch { expected: String, actual: Address },

    /// The supplied token account is not the canonical holding address.
    #[error("ESC_ERR_401: Holding address mismatch: expected {expected}, got {actual}")]
    HoldingAddressMismatch { expected: Address, actual: Address },

    /// The derivation candidate is a valid curve point and cannot be used.
    #[error("ESC_ERR_402: Derived address lies on the ed25519 curve")]
    AddressOnCurve,

    /// No bump in 255..=0 yielded an off-curve address.
    #[error("ESC_ERR_403: Unable to find a viable bump seed")]
    BumpSeedExhausted,

    // =================================================================
    // Account Existence Errors (5xx)
    // =================================================================
    /// The referenced account does not exist (never created or closed).
    #[error("ESC_ERR_500: Account not found: {0}")]
    AccountNotFound(Address),

    /// An account already exists (or was closed) at the target address.
    #[error("ESC_ERR_501: Account already in use: {0}")]
    AccountAlreadyInUse(Address),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Supply conservation invariant violated.
    #[error("ESC_ERR_900: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// Serialization / deserialization error.
    #[error("ESC_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config, missing fields, etc.).
    #[error("ESC_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// Unrecoverable internal error.
    #[error("ESC_ERR_903: Internal error: {0}")]
    Internal(String),
}

impl EscrowError {
    /// The stable kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount { .. }
            | Self::InvalidInstruction { .. }
            | Self::NotEnoughAccountKeys { .. }
            | Self::InvalidSeeds { .. }
            | Self::DecimalsMismatch { .. }
            | Self::InvalidAccountData { .. }
            | Self::TransactionReplayed { .. }
            | Self::UnknownProgram(_) => ErrorKind::Validation,

            Self::InsufficientFunds { .. }
            | Self::InsufficientLamports { .. }
            | Self::AmountOverflow
            | Self::NonZeroBalance(_) => ErrorKind::InsufficientFunds,

            Self::MissingRequiredSignature(_)
            | Self::SignatureInvalid(_)
            | Self::MakerMismatch { .. }
            | Self::MintMismatch { .. }
            | Self::TokenOwnerMismatch { .. }
            | Self::InvalidAccountOwner { .. }
            | Self::AccountNotWritable(_) => ErrorKind::ConstraintViolation,

            Self::SeedsMismatch { .. }
            | Self::HoldingAddressMismatch { .. }
            | Self::AddressOnCurve
            | Self::BumpSeedExhausted => ErrorKind::DerivationMismatch,

            Self::AccountNotFound(_) | Self::AccountAlreadyInUse(_) => ErrorKind::NotFound,

            Self::SupplyInvariantViolation { .. }
            | Self::Serialization(_)
            | Self::Configuration(_)
            | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EscrowError>;

impl From<serde_json::Error> for EscrowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = EscrowError::AccountNotFound(Address([1u8; 32]));
        let msg = format!("{err}");
        assert!(msg.starts_with("ESC_ERR_500"), "Got: {msg}");
    }

    #[test]
    fn insufficient_funds_display() {
        let err = EscrowError::InsufficientFunds {
            needed: 10_000_000,
            available: 3_000_000,
        };
        let msg = format!("{err}");
        assert!(msg.contains("ESC_ERR_200"));
        assert!(msg.contains("10000000"));
        assert!(msg.contains("3000000"));
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    }

    #[test]
    fn maker_and_seed_mismatch_are_distinct_kinds() {
        let maker = EscrowError::MakerMismatch {
            expected: Address([1u8; 32]),
            actual: Address([2u8; 32]),
        };
        let seeds = EscrowError::SeedsMismatch {
            expected: Address([3u8; 32]).to_string(),
            actual: Address([4u8; 32]),
        };
        assert_eq!(maker.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(seeds.kind(), ErrorKind::DerivationMismatch);
    }

    #[test]
    fn all_errors_have_esc_err_prefix() {
        let errors: Vec<EscrowError> = vec![
            EscrowError::AmountOverflow,
            EscrowError::AddressOnCurve,
            EscrowError::BumpSeedExhausted,
            EscrowError::Internal("test".into()),
            EscrowError::InvalidAmount {
                reason: "zero".into(),
            },
            EscrowError::AccountAlreadyInUse(Address::default()),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("ESC_ERR_"),
                "Error missing ESC_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_json_errors_convert() {
        let err: EscrowError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
