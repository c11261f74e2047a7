//! `asd-an-model` library crate.
//!
//! Fits the AN kinetic model of area-selective deposition to measured film
//! thickness on a growth and a non-growth surface.
//!
//! The binary (`an`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fitting engine can be embedded elsewhere via `app::pipeline::run_an_model`

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

pub use app::pipeline::run_an_model;
