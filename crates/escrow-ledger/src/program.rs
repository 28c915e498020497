//! The seam between the ledger and the programs it runs.

use escrow_types::{Address, Instruction, Result};

use crate::context::InvokeContext;

/// A program the ledger can dispatch instructions to.
///
/// `process` sees the world only through the [`InvokeContext`]: every write
/// it makes is staged and becomes visible only if the whole transaction
/// succeeds. Returning an error aborts the transaction.
pub trait Program: Send + Sync {
    /// Address under which the program is registered and owns accounts.
    fn id(&self) -> Address;

    /// Human-readable name for logs.
    fn name(&self) -> &'static str;

    fn process(&self, ctx: &mut InvokeContext<'_>, instruction: &Instruction) -> Result<()>;
}
