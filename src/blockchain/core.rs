// core.rs splits responsibilities into submodules for easier maintenance.
pub mod chain;
pub mod shared;
pub mod state;
pub mod validation;

pub use chain::*;
pub use shared::*;
pub use state::*;
pub use validation::*;
