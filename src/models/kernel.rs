//! Non-growth thickness kernel.
//!
//! For every cycle `t` the non-growth thickness is a sum over earlier cycles
//! `s ≤ t` of the locally uncovered fraction times `gdot`:
//!
//! ```text
//! h[t] = Σ_{s=0..t} (1 - exp(-a(t, s))) * gdot
//! a(t, s) = π nhat gdot² (t² - s²)
//!         + Σ_{τ: t-τ ≥ s} ndot0 w[τ] π gdot² ((t-τ)² - s²)
//! ```
//!
//! With `ndot0 = 0` only the areal term remains and the cost is O(rmax²);
//! otherwise the inner τ sum makes it O(rmax³). Rows are independent and are
//! computed in parallel over `t`.

use std::f64::consts::PI;

use rayon::prelude::*;

/// Memoised delay weights, indexed by lag in cycles.
///
/// `td = 0`: every weight is 1. `td > 0`: `w[0] = 0` and `w[k] = exp(-td/k)`.
/// A zero lag therefore contributes no decay-weighted area and nothing is ever
/// divided by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayTable {
    weights: Vec<f64>,
}

impl DecayTable {
    pub fn new(td: u32, rmax: usize) -> Self {
        let weights = if td == 0 {
            vec![1.0; rmax]
        } else {
            let td = f64::from(td);
            (0..rmax)
                .map(|k| if k == 0 { 0.0 } else { (-td / k as f64).exp() })
                .collect()
        };
        Self { weights }
    }

    #[inline]
    pub fn weight(&self, lag: usize) -> f64 {
        self.weights[lag]
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// `1 - exp(-a)` without cancellation for small `a`.
#[inline]
pub(crate) fn uncovered_complement(a: f64) -> f64 {
    -(-a).exp_m1()
}

/// Non-growth thickness for `t = 0..rmax-1`.
pub fn nongrowth_thickness(
    gdot: f64,
    nhat: f64,
    ndot0: f64,
    decay: &DecayTable,
    rmax: usize,
) -> Vec<f64> {
    (0..rmax)
        .into_par_iter()
        .map(|t| {
            if ndot0 == 0.0 {
                areal_row(gdot, nhat, t)
            } else {
                full_row(gdot, nhat, ndot0, decay, t)
            }
        })
        .collect()
}

/// Closed form for a single row when only the areal term is present.
pub(crate) fn areal_row(gdot: f64, nhat: f64, t: usize) -> f64 {
    let g2 = gdot * gdot;
    let t2 = (t * t) as f64;
    (0..=t)
        .map(|s| {
            let a = PI * nhat * g2 * (t2 - (s * s) as f64);
            uncovered_complement(a) * gdot
        })
        .sum()
}

/// Full triple sum for a single row.
pub(crate) fn full_row(gdot: f64, nhat: f64, ndot0: f64, decay: &DecayTable, t: usize) -> f64 {
    let g2 = gdot * gdot;
    let t2 = (t * t) as f64;
    let mut h = 0.0;
    for s in 0..=t {
        let s2 = s * s;
        let areal = PI * nhat * g2 * (t2 - s2 as f64);

        // (t-τ)² - s² ≥ 0  ⇔  τ ≤ t - s
        let mut rate = 0.0;
        for tau in 0..=(t - s) {
            let lag = t - tau;
            let d = (lag * lag - s2) as f64;
            rate += decay.weight(tau) * d;
        }
        let rate = ndot0 * PI * g2 * rate;

        h += uncovered_complement(areal + rate) * gdot;
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_table_guards_zero_lag() {
        let d = DecayTable::new(3, 4);
        assert_eq!(d.weight(0), 0.0);
        assert!((d.weight(1) - (-3.0f64).exp()).abs() < 1e-15);
        assert!((d.weight(3) - (-1.0f64).exp()).abs() < 1e-15);

        let flat = DecayTable::new(0, 3);
        assert_eq!(flat.weight(0), 1.0);
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn general_kernel_reduces_to_closed_form_without_rate_term() {
        let decay = DecayTable::new(5, 40);
        for t in 0..40 {
            let closed = areal_row(0.8, 0.03, t);
            let general = full_row(0.8, 0.03, 0.0, &decay, t);
            assert_eq!(closed, general, "t={t}");
        }
    }

    #[test]
    fn row_zero_is_zero() {
        let decay = DecayTable::new(2, 1);
        assert_eq!(nongrowth_thickness(1.0, 0.05, 0.05, &decay, 1), vec![0.0]);
    }

    #[test]
    fn no_nucleation_means_no_growth() {
        let decay = DecayTable::new(0, 10);
        let h = nongrowth_thickness(1.0, 0.0, 0.0, &decay, 10);
        assert!(h.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn saturated_surface_approaches_growth_rate() {
        // Dense nucleation: every past cycle but the current one is fully covered.
        let decay = DecayTable::new(0, 6);
        let h = nongrowth_thickness(1.0, 1e3, 0.0, &decay, 6);
        for (t, &v) in h.iter().enumerate() {
            assert!((v - t as f64).abs() < 1e-9, "t={t} h={v}");
        }
    }
}
