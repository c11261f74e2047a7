//! Numerical utilities: growth-rate estimation and bounded minimisation.

pub mod growth;
pub mod nelder_mead;

pub use growth::*;
pub use nelder_mead::*;
