//! Proof-of-work mining
//!
//! A linear nonce search on the calling thread. [`mine_block`] runs until a
//! qualifying nonce is found; [`mine_block_until`] additionally polls a
//! cancellation flag between attempts.

use crate::blockchain::Block;
use crate::error::{ChainError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// True when `hash` starts with at least `difficulty` `'0'` characters.
pub fn hash_meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}

/// Increments the nonce until the block hash meets `difficulty`.
pub fn mine_block(block: Block, difficulty: usize) -> Block {
    search(block, difficulty, || false).unwrap_or_else(|block| block)
}

/// Like [`mine_block`], but gives up with [`ChainError::MiningCancelled`] once `cancel` is set.
pub fn mine_block_until(block: Block, difficulty: usize, cancel: &AtomicBool) -> Result<Block> {
    search(block, difficulty, || cancel.load(Ordering::Relaxed)).map_err(|_| ChainError::MiningCancelled)
}

/// Returns `Ok` with the mined block, or `Err` with the partially searched
/// block once `stop` reports true.
fn search(mut block: Block, difficulty: usize, stop: impl Fn() -> bool) -> std::result::Result<Block, Block> {
    // Transactions are fixed for the whole search.
    let tx_json = block.transactions_json();
    while !hash_meets_difficulty(&block.compute_hash_with(&tx_json), difficulty) {
        if stop() {
            return Err(block);
        }
        block.nonce = block.nonce.wrapping_add(1);
    }
    debug!(index = block.index, nonce = block.nonce, "found proof of work");
    Ok(block)
}
