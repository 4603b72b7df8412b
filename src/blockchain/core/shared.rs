use crate::crypto::{AccountId, Secp256k1Verifier, SignatureVerifier};
use crate::error::Result;
use crate::transaction::Transaction;
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::chain::{Block, Blockchain};
use super::state::Balance;

/// A ledger handle that can be cloned across threads.
///
/// Every operation takes the same exclusive lock, so admission never
/// interleaves with a mining pass that is draining the mempool.
pub struct SharedBlockchain<V = Secp256k1Verifier> {
    inner: Arc<Mutex<Blockchain<V>>>,
}

impl<V> Clone for SharedBlockchain<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: SignatureVerifier> SharedBlockchain<V> {
    pub fn new(blockchain: Blockchain<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(blockchain)),
        }
    }

    pub fn add_transaction(&self, tx: Transaction) -> bool {
        self.inner.lock().add_transaction(tx)
    }

    pub fn submit_transaction(&self, tx: Transaction) -> Result<()> {
        self.inner.lock().submit_transaction(tx)
    }

    /// Mines under the lock and returns a copy of the new block.
    pub fn mine_block(&self, miner: &AccountId) -> Block {
        self.inner.lock().mine_block(miner).clone()
    }

    pub fn mine_block_cancellable(&self, miner: &AccountId, cancel: &AtomicBool) -> Result<Block> {
        self.inner.lock().mine_block_cancellable(miner, cancel).cloned()
    }

    pub fn get_balance(&self, account: &AccountId) -> Balance {
        self.inner.lock().get_balance(account)
    }

    pub fn height(&self) -> u64 {
        self.inner.lock().height()
    }

    /// Runs `f` with shared access to the ledger while holding the lock.
    pub fn with_chain<R>(&self, f: impl FnOnce(&Blockchain<V>) -> R) -> R {
        f(&self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainConfig;
    use crate::crypto::{KeyPair, Signer};
    use crate::error::ChainError;
    use std::thread;

    #[test]
    fn test_concurrent_submissions_and_mining() {
        let genesis_key = KeyPair::generate();
        let chain = Blockchain::with_genesis_account(genesis_key.account_id(), ChainConfig::default()).unwrap();
        let shared = SharedBlockchain::new(chain);
        let recipient = KeyPair::generate().account_id();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let genesis_key = genesis_key.clone();
                let recipient = recipient.clone();
                thread::spawn(move || {
                    let mut tx = Transaction::new(genesis_key.account_id(), recipient, 10);
                    tx.sign(&genesis_key).unwrap();
                    shared.add_transaction(tx)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }

        let miner = KeyPair::generate().account_id();
        let block = shared.mine_block(&miner);
        assert_eq!(block.index, 1);
        assert_eq!(block.transactions.len(), 5);

        assert_eq!(shared.height(), 1);
        assert_eq!(shared.get_balance(&recipient), 40);
        assert_eq!(shared.get_balance(&genesis_key.account_id()), 960);
        assert!(shared.with_chain(|chain| chain.mempool().is_empty()));
        assert!(shared.with_chain(|chain| chain.validate_chain()).is_ok());
    }

    #[test]
    fn test_cancelled_mining_keeps_pending_state() {
        let genesis_key = KeyPair::generate();
        let config = ChainConfig {
            difficulty: 64,
            ..ChainConfig::default()
        };
        let chain = Blockchain::with_genesis_account(genesis_key.account_id(), config).unwrap();
        let shared = SharedBlockchain::new(chain);

        let mut tx = Transaction::new(genesis_key.account_id(), KeyPair::generate().account_id(), 10);
        tx.sign(&genesis_key).unwrap();
        assert!(shared.add_transaction(tx));

        let cancel = AtomicBool::new(true);
        let miner = KeyPair::generate().account_id();
        let result = shared.mine_block_cancellable(&miner, &cancel);
        assert_eq!(result.unwrap_err(), ChainError::MiningCancelled);

        assert_eq!(shared.height(), 0);
        assert_eq!(shared.with_chain(|chain| chain.mempool().len()), 1);
        assert_eq!(shared.get_balance(&miner), 0);
    }
}
