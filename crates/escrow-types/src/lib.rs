//! # escrow-types
//!
//! Shared types, errors, and configuration for the **escrow swap** workspace.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identity**: [`Address`], [`Keypair`], [`Signature`]
//! - **Derivation**: [`derivation::escrow_address`], [`derivation::holding_address`]
//! - **Escrow model**: [`EscrowRecord`], [`EscrowState`]
//! - **Token model**: [`Mint`], [`TokenAccount`]
//! - **Account model**: [`Account`], [`AccountData`]
//! - **Transactions**: [`AccountMeta`], [`Instruction`], [`Message`], [`Transaction`]
//! - **Receipts**: [`TxReceipt`]
//! - **Configuration**: [`LedgerConfig`], [`RentConfig`]
//! - **Errors**: [`EscrowError`] with `ESC_ERR_` prefix codes, classified by [`ErrorKind`]
//! - **Constants**: program ids, derivation limits, rent defaults

pub mod account;
pub mod address;
pub mod config;
pub mod constants;
pub mod derivation;
pub mod error;
pub mod escrow;
pub mod receipt;
pub mod token;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use escrow_types::{Address, EscrowRecord, Transaction, ...};

pub use account::*;
pub use address::*;
pub use config::*;
pub use error::*;
pub use escrow::*;
pub use receipt::*;
pub use token::*;
pub use transaction::*;

pub use ed25519_dalek::Signature;

// Constants and derivation functions are accessed via their modules
// (`escrow_types::constants::FOO`, `escrow_types::derivation::bar`).
