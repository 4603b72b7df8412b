//! Pending-transaction pool
//!
//! Admitted transactions wait here, in submission order, until the next
//! block is mined. Admission rules live in the ledger; the pool itself
//! accepts anything it is given.

use crate::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AccountId;

    #[test]
    fn test_preserves_submission_order() {
        let mut mempool = Mempool::new();
        assert!(mempool.is_empty());

        for amount in [3, 1, 2] {
            mempool.add_transaction(Transaction::issuance(AccountId::from_bytes(vec![1]), amount));
        }

        let amounts: Vec<u64> = mempool.transactions().iter().map(|tx| tx.amount).collect();
        assert_eq!(amounts, vec![3, 1, 2]);
        assert_eq!(mempool.len(), 3);

        mempool.clear();
        assert!(mempool.is_empty());
    }
}
