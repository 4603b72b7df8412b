use crate::config::ChainConfig;
use crate::crypto::{AccountId, KeyPair, Secp256k1Verifier, SignatureVerifier, Signer};
use crate::error::{ChainError, Result};
use crate::mempool::Mempool;
use crate::miner::{self, hash_meets_difficulty};
use crate::transaction::Transaction;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::atomic::AtomicBool;
use tracing::{debug, info, warn};

use super::state::{Balance, BalanceTable};

/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub prev_hash: String,
    pub nonce: u64,
    /// Milliseconds since the Unix epoch. Informational only.
    pub timestamp: u64,
}

impl Block {
    pub fn new(index: u64, transactions: Vec<Transaction>, prev_hash: String) -> Self {
        Block {
            index,
            transactions,
            prev_hash,
            nonce: 0,
            timestamp: chrono::Utc::now().timestamp_millis() as u64,
        }
    }

    /// Canonical JSON array of the block's transactions.
    pub fn transactions_json(&self) -> String {
        Value::Array(self.transactions.iter().map(Transaction::to_canonical).collect()).to_string()
    }

    /// SHA-256 hex digest over index, previous hash, nonce, timestamp and transactions.
    pub fn compute_hash(&self) -> String {
        self.compute_hash_with(&self.transactions_json())
    }

    /// Same as [`Block::compute_hash`] with the transaction JSON supplied by the caller.
    pub fn compute_hash_with(&self, transactions_json: &str) -> String {
        let preimage = format!(
            "{}{}{}{}{}",
            self.index, self.prev_hash, self.nonce, self.timestamp, transactions_json
        );
        hex::encode(Sha256::digest(preimage.as_bytes()))
    }

    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        hash_meets_difficulty(&self.compute_hash(), difficulty)
    }
}

/// The ledger: chain, pending pool and balance table.
///
/// Generic over the signature scheme so the core never names a concrete
/// cryptographic library; secp256k1 is the default.
pub struct Blockchain<V = Secp256k1Verifier> {
    blocks: Vec<Block>,
    mempool: Mempool,
    balances: BalanceTable,
    config: ChainConfig,
    genesis_account: AccountId,
    verifier: V,
}

impl Blockchain<Secp256k1Verifier> {
    /// Creates a ledger with default constants, minting genesis to a fresh account.
    pub fn new() -> Result<Self> {
        Self::with_config(ChainConfig::default())
    }

    /// Creates a ledger minting genesis to a freshly generated account whose key is discarded.
    pub fn with_config(config: ChainConfig) -> Result<Self> {
        let genesis_account = KeyPair::generate().account_id();
        Self::with_genesis_account(genesis_account, config)
    }

    pub fn with_genesis_account(genesis_account: AccountId, config: ChainConfig) -> Result<Self> {
        Self::with_verifier(genesis_account, config, Secp256k1Verifier)
    }
}

impl<V: SignatureVerifier> Blockchain<V> {
    pub fn with_verifier(genesis_account: AccountId, config: ChainConfig, verifier: V) -> Result<Self> {
        config.validate()?;

        let mut blockchain = Blockchain {
            blocks: vec![],
            mempool: Mempool::new(),
            balances: BalanceTable::new(),
            config,
            genesis_account,
            verifier,
        };
        blockchain.create_genesis_block();
        Ok(blockchain)
    }

    fn create_genesis_block(&mut self) {
        let genesis_tx = Transaction::issuance(self.genesis_account.clone(), self.config.genesis_amount);
        let genesis_block = Block::new(0, vec![genesis_tx], GENESIS_PREV_HASH.to_string());

        self.balances.credit(&self.genesis_account, self.config.genesis_amount);
        debug!(
            hash = %genesis_block.compute_hash(),
            account = %self.genesis_account,
            amount = self.config.genesis_amount,
            "created genesis block"
        );
        self.blocks.push(genesis_block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn last_block(&self) -> &Block {
        // Genesis is pushed on construction and blocks are never removed.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Index of the top block.
    pub fn height(&self) -> u64 {
        self.last_block().index
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn balances(&self) -> &BalanceTable {
        &self.balances
    }

    pub fn genesis_account(&self) -> &AccountId {
        &self.genesis_account
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    pub fn mining_reward(&self) -> u64 {
        self.config.mining_reward
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn get_balance(&self, account: &AccountId) -> Balance {
        self.balances.get_balance(account)
    }

    /// Validates `tx` and queues it for the next block.
    ///
    /// Solvency is checked against the live balance only; pending transfers
    /// from the same sender are not reserved.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<()> {
        if !tx.verify_with(&self.verifier) {
            return Err(ChainError::InvalidSignature);
        }

        if let Some(sender) = &tx.sender {
            let balance = self.balances.get_balance(sender);
            if balance < Balance::from(tx.amount) {
                return Err(ChainError::InsufficientBalance {
                    account: sender.to_hex(),
                    balance,
                    amount: tx.amount,
                });
            }
        }

        debug!(tx = %tx.hash(), amount = tx.amount, "transaction admitted to mempool");
        self.mempool.add_transaction(tx);
        Ok(())
    }

    /// Boolean form of [`Blockchain::submit_transaction`]; the reason for a rejection is logged.
    pub fn add_transaction(&mut self, tx: Transaction) -> bool {
        match self.submit_transaction(tx) {
            Ok(()) => true,
            Err(e) => {
                warn!("Transaction rejected: {}", e);
                false
            }
        }
    }

    /// Mines the mempool plus a reward for `miner` into a new block and commits it.
    ///
    /// Blocks the calling thread until a qualifying nonce is found.
    pub fn mine_block(&mut self, miner: &AccountId) -> &Block {
        let candidate = self.candidate_block(miner);
        let block = miner::mine_block(candidate, self.config.difficulty);
        self.commit_block(block)
    }

    /// [`Blockchain::mine_block`] that stops with [`ChainError::MiningCancelled`]
    /// once `cancel` is set, leaving the ledger untouched.
    pub fn mine_block_cancellable(&mut self, miner: &AccountId, cancel: &AtomicBool) -> Result<&Block> {
        let candidate = self.candidate_block(miner);
        let block = miner::mine_block_until(candidate, self.config.difficulty, cancel)?;
        Ok(self.commit_block(block))
    }

    fn candidate_block(&self, miner: &AccountId) -> Block {
        let reward_tx = Transaction::issuance(miner.clone(), self.config.mining_reward);
        let mut transactions = self.mempool.transactions().to_vec();
        transactions.push(reward_tx);

        let last_block = self.last_block();
        Block::new(last_block.index + 1, transactions, last_block.compute_hash())
    }

    fn commit_block(&mut self, block: Block) -> &Block {
        self.balances.apply_block(&block);
        self.mempool.clear();

        info!(
            "Block #{} mined with nonce {} (hash {}), miner rewarded {}",
            block.index,
            block.nonce,
            block.compute_hash(),
            self.config.mining_reward
        );
        self.blocks.push(block);
        self.last_block()
    }

    /// Recomputes the balance table by folding every committed block from genesis.
    pub fn rebuild_balances(&self) -> BalanceTable {
        BalanceTable::from_blocks(&self.blocks)
    }
}
