//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measured inputs (`SamplePoint`, `SampleSeries`)
//! - model parameters and scenario definitions (`ModelParameters`, `ScenarioSpec`)
//! - model and fit outputs (`StateTable`, `FitResult`, `AnOutput`)

pub mod types;

pub use types::*;
