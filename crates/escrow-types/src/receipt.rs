//! Transaction receipts for the ledger's audit trail.
//!
//! Every committed transaction produces a [`TxReceipt`]. Failed transactions
//! leave nothing behind, not even a receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Address;

/// Proof that a transaction committed, and what it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Hex transaction id.
    pub tx_id: String,
    /// Ledger version assigned to this commit.
    pub version: u64,
    /// Accounts that did not exist before this transaction.
    pub created: Vec<Address>,
    /// Accounts closed (tombstoned) by this transaction.
    pub closed: Vec<Address>,
    /// Every account written, including created ones.
    pub touched: Vec<Address>,
    /// Program log lines, in emission order.
    pub logs: Vec<String>,
    pub executed_at: DateTime<Utc>,
}

impl TxReceipt {
    /// Did this transaction close `address`?
    #[must_use]
    pub fn closed_account(&self, address: &Address) -> bool {
        self.closed.contains(address)
    }

    /// Did this transaction create `address`?
    #[must_use]
    pub fn created_account(&self, address: &Address) -> bool {
        self.created.contains(address)
    }
}
