//! Scenario fitting orchestration.
//!
//! Responsibilities:
//!
//! - score a model table against measured non-growth points
//! - fit one scenario with a bounded Nelder–Mead search
//! - run the canonical scenarios (parallel) and select the best

pub mod fitter;
pub mod scenarios;
pub mod scorer;
pub mod selection;

pub use fitter::*;
pub use scenarios::*;
pub use scorer::*;
pub use selection::*;
