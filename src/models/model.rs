//! Forward AN model: parameters in, per-cycle `StateTable` out.
//!
//! Three stages, in order:
//!
//! 1. fractional coverage of the non-growth surface from the extended
//!    (excluded) area of all nuclei formed so far
//! 2. nucleation density, a strictly sequential recurrence in `t`
//! 3. non-growth thickness via the nested kernel in `models::kernel`
//!
//! Growth-surface thickness is simply `gdot * t`.

use std::f64::consts::PI;

use crate::domain::{ModelParameters, StateTable};
use crate::models::kernel::{DecayTable, nongrowth_thickness, uncovered_complement};

/// Run the forward model for `rmax` cycles (`t = 0..rmax-1`).
///
/// Inputs are assumed valid (`gdot >= 0`, parameters non-negative). The result
/// may still hold non-finite values for extreme inputs; callers that need a
/// clean table check `StateTable::is_finite`.
pub fn simulate(gdot: f64, params: &ModelParameters, rmax: usize) -> StateTable {
    let ModelParameters { nhat, ndot0, td } = *params;
    let decay = DecayTable::new(td, rmax);

    let cycle: Vec<f64> = (0..rmax).map(|t| t as f64).collect();
    let growth_thickness: Vec<f64> = cycle.iter().map(|&t| gdot * t).collect();

    let coverage = coverage(gdot, nhat, ndot0, &decay, rmax);
    let nucleation_density = nucleation_density(nhat, ndot0, &decay, &coverage);
    let nongrowth = nongrowth_thickness(gdot, nhat, ndot0, &decay, rmax);

    let mut selectivity = Vec::with_capacity(rmax);
    let mut coverage_selectivity = Vec::with_capacity(rmax);
    let mut thickness_delta = Vec::with_capacity(rmax);
    let mut particle_radius = Vec::with_capacity(rmax);

    for t in 0..rmax {
        let hg = growth_thickness[t];
        let hn = nongrowth[t];
        let c = coverage[t];
        let n = nucleation_density[t];

        selectivity.push(if t == 0 {
            1.0
        } else if hg + hn != 0.0 {
            (hg - hn) / (hg + hn)
        } else {
            0.0
        });
        coverage_selectivity.push((1.0 - c) / (1.0 + c));
        thickness_delta.push(if t == 0 { 0.0 } else { hn - nongrowth[t - 1] });
        particle_radius.push(if n > 0.0 { (c / n / PI).sqrt() } else { 0.0 });
    }

    StateTable {
        cycle,
        growth_thickness,
        nongrowth_thickness: nongrowth,
        selectivity,
        coverage,
        coverage_selectivity,
        nucleation_density,
        thickness_delta,
        particle_radius,
    }
}

/// Stage 1: fractional coverage, 0 at `t = 0`.
fn coverage(gdot: f64, nhat: f64, ndot0: f64, decay: &DecayTable, rmax: usize) -> Vec<f64> {
    let mut out = vec![0.0; rmax];
    for (t, slot) in out.iter_mut().enumerate().skip(1) {
        let r = gdot * t as f64;
        let mut area = PI * r * r * nhat;
        if ndot0 != 0.0 {
            // Nuclei born at τ have grown for t-τ cycles.
            let mut born = 0.0;
            for lag in 0..=t {
                let r = gdot * lag as f64;
                born += decay.weight(lag) * r * r;
            }
            area += ndot0 * PI * born;
        }
        *slot = uncovered_complement(area);
    }
    out
}

/// Stage 2: nucleation density.
///
/// Constant at `nhat` without a rate term; otherwise
/// `n[t] = n[t-1] + ndot0 * w[t] * (1 - coverage[t])` from `t = 2`.
fn nucleation_density(nhat: f64, ndot0: f64, decay: &DecayTable, coverage: &[f64]) -> Vec<f64> {
    let rmax = coverage.len();
    let mut out = vec![nhat; rmax];
    if ndot0 == 0.0 {
        return out;
    }
    for t in 2..rmax {
        out[t] = out[t - 1] + ndot0 * decay.weight(t) * (1.0 - coverage[t]);
    }
    out
}
