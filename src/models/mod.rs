//! AN-model implementation.
//!
//! `model` assembles the per-cycle state table; `kernel` holds the nested
//! thickness sum and the memoised delay weights it shares with the other stages.

pub mod kernel;
pub mod model;

pub use kernel::DecayTable;
pub use model::*;
