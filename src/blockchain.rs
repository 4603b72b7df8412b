// Thin re-export module: implementation is in `blockchain/core.rs`, split
// into chain management, balance state, validation and shared access.

pub mod core;
pub use core::*;
