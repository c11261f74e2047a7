//! Synthetic non-growth samples from the forward model.
//!
//! Used to produce test inputs for `an fit` with known parameters:
//! the model is simulated over the requested cycles, each thickness gets
//! seeded Gaussian noise, and negative results are clamped to 0.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ModelParameters, SamplePoint, SampleSeries};
use crate::error::AppError;
use crate::math::table_rows;
use crate::models::simulate;

/// Inputs for one synthetic series.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRequest {
    pub gdot: f64,
    pub params: ModelParameters,
    /// Cycles to sample, ascending.
    pub cycles: Vec<f64>,
    /// Standard deviation of the additive noise.
    pub noise: f64,
    pub seed: u64,
}

/// Generate a synthetic non-growth series.
pub fn generate_sample(req: &SampleRequest) -> Result<SampleSeries, AppError> {
    if !(req.gdot.is_finite() && req.gdot >= 0.0) {
        return Err(AppError::invalid_input(format!(
            "Growth rate must be finite and >= 0 (got {}).",
            req.gdot
        )));
    }
    req.params.validate()?;
    if req.cycles.is_empty() {
        return Err(AppError::insufficient_data("No sample cycles requested."));
    }

    // Validates ordering and sign before anything is simulated.
    let cycles = SampleSeries::new(
        req.cycles
            .iter()
            .map(|&cycle| SamplePoint { cycle, thickness: 0.0 })
            .collect(),
    )?;
    let last = cycles.last_cycle().unwrap_or(0.0);
    let table = simulate(req.gdot, &req.params, table_rows(last.ceil())?);

    let normal = Normal::new(0.0, req.noise)
        .map_err(|e| AppError::invalid_input(format!("Noise distribution error: {e}")))?;
    let mut rng = StdRng::seed_from_u64(req.seed);

    let mut points = Vec::with_capacity(cycles.len());
    for p in cycles.points() {
        let idx = table.nearest_row(p.cycle).unwrap_or(0);
        let clean = table.nongrowth_thickness[idx];
        let noisy = (clean + normal.sample(&mut rng)).max(0.0);
        points.push(SamplePoint {
            cycle: p.cycle,
            thickness: if noisy.is_finite() { noisy } else { 0.0 },
        });
    }
    SampleSeries::new(points)
}
