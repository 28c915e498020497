//! # escrow-ledger
//!
//! The ledger the escrow program runs on: an in-memory, versioned account
//! store where every transaction executes all-or-nothing.
//!
//! ## Architecture
//!
//! - [`Ledger`] owns committed state, registered programs, the replay guard
//!   and the supply tracker.
//! - [`InvokeContext`] is the per-transaction overlay. Programs read through
//!   it and stage writes in it; it also provides the built-in system and
//!   token operations (account creation, checked transfers, closing).
//! - [`Program`] is the trait every program implements.
//! - [`Rent`] computes storage deposits.

pub mod context;
pub mod ledger;
pub mod program;
pub mod rent;
pub mod replay_guard;
pub mod supply_conservation;

pub use context::{InvokeContext, Transfer};
pub use ledger::Ledger;
pub use program::Program;
pub use rent::Rent;
pub use replay_guard::ReplayGuard;
pub use supply_conservation::{Asset, SupplyConservation};
