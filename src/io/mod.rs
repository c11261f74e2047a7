//! Input/output helpers.
//!
//! - series CSV ingest + validation (`ingest`)
//! - state table CSV export (`export`)
//! - result JSON read/write (`result`)

pub mod export;
pub mod ingest;
pub mod result;

pub use export::*;
pub use ingest::*;
pub use result::*;
