use crate::crypto::AccountId;
use crate::transaction::Transaction;
use std::collections::HashMap;

use super::chain::Block;

/// Signed account balance. Entries may go negative (see `apply_transaction`).
pub type Balance = i128;

/// Account balances derived from applied transactions.
///
/// The table is a left fold over committed blocks: [`BalanceTable::from_blocks`]
/// rebuilds it from genesis, and the ledger's incrementally maintained copy
/// must always equal that rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceTable {
    balances: HashMap<AccountId, Balance>,
}

impl BalanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Self {
        let mut table = Self::new();
        for block in blocks {
            table.apply_block(block);
        }
        table
    }

    pub fn get_balance(&self, account: &AccountId) -> Balance {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, account: &AccountId, amount: u64) {
        *self.balances.entry(account.clone()).or_insert(0) += Balance::from(amount);
    }

    pub fn debit(&mut self, account: &AccountId, amount: u64) {
        *self.balances.entry(account.clone()).or_insert(0) -= Balance::from(amount);
    }

    /// Debits the sender (if any) and credits the recipient.
    ///
    /// No solvency check happens here; admission is the only gate, so a
    /// sender can end up negative.
    pub fn apply_transaction(&mut self, tx: &Transaction) {
        if let Some(sender) = &tx.sender {
            self.debit(sender, tx.amount);
        }
        self.credit(&tx.recipient, tx.amount);
    }

    pub fn apply_block(&mut self, block: &Block) {
        for tx in &block.transactions {
            self.apply_transaction(tx);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Balance)> {
        self.balances.iter()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all balances; equals everything ever issued.
    pub fn total_supply(&self) -> Balance {
        self.balances.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: u8) -> AccountId {
        AccountId::from_bytes(vec![byte; 33])
    }

    #[test]
    fn test_unknown_account_is_zero() {
        let table = BalanceTable::new();
        assert_eq!(table.get_balance(&account(1)), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_transfer_moves_value() {
        let mut table = BalanceTable::new();
        table.apply_transaction(&Transaction::issuance(account(1), 100));
        table.apply_transaction(&Transaction::new(account(1), account(2), 30));

        assert_eq!(table.get_balance(&account(1)), 70);
        assert_eq!(table.get_balance(&account(2)), 30);
        assert_eq!(table.total_supply(), 100);
    }

    #[test]
    fn test_overdraft_goes_negative() {
        let mut table = BalanceTable::new();
        table.apply_transaction(&Transaction::new(account(1), account(2), 30));
        assert_eq!(table.get_balance(&account(1)), -30);
        assert_eq!(table.get_balance(&account(2)), 30);
        assert_eq!(table.total_supply(), 0);
    }

    #[test]
    fn test_from_blocks_folds_in_order() {
        let genesis = Block::new(0, vec![Transaction::issuance(account(1), 1000)], "0".to_string());
        let next = Block::new(
            1,
            vec![
                Transaction::new(account(1), account(2), 400),
                Transaction::issuance(account(3), 50),
            ],
            genesis.compute_hash(),
        );

        let table = BalanceTable::from_blocks([&genesis, &next]);
        assert_eq!(table.get_balance(&account(1)), 600);
        assert_eq!(table.get_balance(&account(2)), 400);
        assert_eq!(table.get_balance(&account(3)), 50);
        assert_eq!(table.len(), 3);
    }
}
