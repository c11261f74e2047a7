//! Command-line parsing for the `an` fitting tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code. Tunables can also come from the
//! environment (or a `.env` file), e.g. `AN_MAX_EVALS=500`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "an", version, about = "AN-model fitting for area-selective deposition")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the nucleation scenarios to measured data and report the best one.
    Fit(FitArgs),
    /// Run the forward model for given parameters.
    Simulate(SimulateArgs),
    /// Generate a synthetic non-growth CSV from the forward model.
    Sample(SampleArgs),
    /// Plot a previously exported result JSON.
    Plot(PlotArgs),
}

/// Model parameters given on the command line.
#[derive(Debug, Args, Clone)]
pub struct ParamArgs {
    /// Areal nucleation density.
    #[arg(long)]
    pub nhat: Option<f64>,

    /// Initial nucleation rate.
    #[arg(long)]
    pub ndot0: Option<f64>,

    /// Nucleation delay time (cycles).
    #[arg(long)]
    pub td: Option<u32>,
}

impl ParamArgs {
    /// True when any parameter was given.
    pub fn any(&self) -> bool {
        self.nhat.is_some() || self.ndot0.is_some() || self.td.is_some()
    }
}

/// Plot geometry.
#[derive(Debug, Args, Clone)]
pub struct PlotSize {
    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for `an fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Growth-surface CSV (cycle, thickness).
    #[arg(long, value_name = "CSV")]
    pub growth: PathBuf,

    /// Non-growth-surface CSV (cycle, thickness).
    #[arg(long, value_name = "CSV")]
    pub nongrowth: PathBuf,

    /// Fixed parameters: skip the search and evaluate the model once.
    #[command(flatten)]
    pub params: ParamArgs,

    /// Objective evaluations per scenario.
    #[arg(long, env = "AN_MAX_EVALS", default_value_t = 300)]
    pub max_evals: usize,

    /// Simplex value-spread tolerance.
    #[arg(long, env = "AN_F_TOL", default_value_t = 1e-8)]
    pub f_tol: f64,

    /// Simplex diameter tolerance.
    #[arg(long, env = "AN_X_TOL", default_value_t = 1e-8)]
    pub x_tol: f64,

    /// Parameters at or below this magnitude count as zero during selection.
    #[arg(long, env = "AN_ZERO_TOL", default_value_t = 1e-8)]
    pub zero_tol: f64,

    /// Skip scenarios not started within this many seconds.
    #[arg(long, env = "AN_DEADLINE_SECS")]
    pub deadline_secs: Option<f64>,

    /// Fit scenarios one after another instead of in parallel.
    #[arg(long, env = "AN_SEQUENTIAL")]
    pub sequential: bool,

    /// Render an ASCII plot of the best fit.
    #[arg(long)]
    pub plot: bool,

    #[command(flatten)]
    pub size: PlotSize,

    /// Export the full result to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Export the best state table to CSV.
    #[arg(long = "export-table", value_name = "CSV")]
    pub export_table: Option<PathBuf>,
}

/// Options for `an simulate`.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Growth rate (thickness per cycle).
    #[arg(long)]
    pub gdot: f64,

    #[command(flatten)]
    pub params: ParamArgs,

    /// Number of simulated cycles.
    #[arg(long, default_value_t = 100)]
    pub cycles: usize,

    /// Export the state table to CSV.
    #[arg(long = "export-table", value_name = "CSV")]
    pub export_table: Option<PathBuf>,
}

/// Options for `an sample`.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Growth rate (thickness per cycle).
    #[arg(long)]
    pub gdot: f64,

    #[command(flatten)]
    pub params: ParamArgs,

    /// Cycles to sample, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub cycles: Vec<f64>,

    /// Gaussian noise standard deviation added to each thickness.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV (stdout when omitted).
    #[arg(long, short = 'o', value_name = "CSV")]
    pub output: Option<PathBuf>,
}

/// Options for plotting a saved result.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Result JSON file produced by `an fit --export`.
    #[arg(long, value_name = "JSON")]
    pub result: PathBuf,

    #[command(flatten)]
    pub size: PlotSize,
}
