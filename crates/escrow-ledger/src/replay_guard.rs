//! Replay guard: a committed transaction never executes twice.
//!
//! The ledger asks the guard before executing ([`ReplayGuard::check`]) and
//! records the id only once the transaction commits
//! ([`ReplayGuard::mark_committed`]). A transaction that failed leaves no
//! trace here, so the caller can fix it and resubmit the same message.
//!
//! Memory is bounded: past `capacity` ids the oldest is forgotten. A replay
//! older than the window is still stopped by the account state it would
//! have to consume (closed records are tombstoned).

use std::collections::{HashSet, VecDeque};

use escrow_types::{EscrowError, Result, TxId};

/// Committed transaction ids, oldest first.
pub struct ReplayGuard {
    seen: HashSet<TxId>,
    fifo: VecDeque<TxId>,
    capacity: usize,
}

impl ReplayGuard {
    /// # Panics
    /// Panics if `capacity` is zero. [`escrow_types::LedgerConfig::validate`]
    /// rejects such a config before a ledger is built.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay window must hold at least one id");
        let reserve = capacity.min(1_024);
        Self {
            seen: HashSet::with_capacity(reserve),
            fifo: VecDeque::with_capacity(reserve),
            capacity,
        }
    }

    /// # Errors
    /// `TransactionReplayed` if `tx_id` already committed.
    pub fn check(&self, tx_id: &TxId) -> Result<()> {
        if self.seen.contains(tx_id) {
            return Err(EscrowError::TransactionReplayed {
                tx_id: tx_id.to_string(),
            });
        }
        Ok(())
    }

    /// Remember `tx_id`, forgetting the oldest id if the window is full.
    ///
    /// # Errors
    /// `TransactionReplayed` if `tx_id` is already remembered.
    pub fn mark_committed(&mut self, tx_id: TxId) -> Result<()> {
        self.check(&tx_id)?;
        while self.fifo.len() >= self.capacity {
            let Some(expired) = self.fifo.pop_front() else {
                break;
            };
            self.seen.remove(&expired);
        }
        self.fifo.push_back(tx_id);
        self.seen.insert(tx_id);
        Ok(())
    }

    pub fn is_committed(&self, tx_id: &TxId) -> bool {
        self.seen.contains(tx_id)
    }

    pub fn len(&self) -> usize {
        self.fifo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fifo.is_empty()
    }
}
