//! Growth-surface rate estimation and the simulated cycle horizon.
//!
//! The growth rate is the unweighted mean of consecutive pairwise slopes:
//!
//! ```text
//! gdot = Σ (h[i+1] - h[i]) / (c[i+1] - c[i])  /  (n - 1)
//! ```
//!
//! This is not the end-to-end slope when samples are unevenly spaced; short
//! intervals count as much as long ones. Fitted parameters published with the
//! existing datasets depend on this exact estimator.

use tracing::warn;

use crate::domain::SampleSeries;
use crate::error::AppError;

/// Horizon multiplier applied to the last measured non-growth cycle.
pub const HORIZON_FACTOR: f64 = 1.5;

/// Largest simulated table accepted. The rate kernel is cubic in the row count,
/// so horizons past this are rejected rather than simulated.
pub const MAX_HORIZON: usize = 100_000;

/// Estimate the constant growth rate (thickness per cycle).
pub fn growth_rate(growth: &SampleSeries) -> Result<f64, AppError> {
    let pts = growth.points();
    if pts.len() < 2 {
        return Err(AppError::insufficient_data(format!(
            "Growth data must have at least 2 points (got {}).",
            pts.len()
        )));
    }

    let mut sum = 0.0;
    for (i, w) in pts.windows(2).enumerate() {
        let dc = w[1].cycle - w[0].cycle;
        if dc == 0.0 {
            return Err(AppError::invalid_input(format!(
                "Growth samples {i} and {} share cycle {}; slope is undefined.",
                i + 1,
                w[0].cycle
            )));
        }
        sum += (w[1].thickness - w[0].thickness) / dc;
    }

    let gdot = sum / (pts.len() - 1) as f64;
    if !gdot.is_finite() {
        return Err(AppError::invalid_input("Growth rate is not finite."));
    }
    if gdot < 0.0 {
        warn!(gdot, "growth surface thins on average; clamping growth rate to 0");
        return Ok(0.0);
    }
    Ok(gdot)
}

/// Number of simulated cycles: `floor(last_cycle * 1.5) + 1`.
///
/// Uses the final entry of the series as-is (no re-sorting).
pub fn cycle_horizon(nongrowth: &SampleSeries) -> Result<usize, AppError> {
    let last = nongrowth
        .last_cycle()
        .ok_or_else(|| AppError::insufficient_data("Non-growth data must have at least 1 point."))?;
    table_rows((last * HORIZON_FACTOR).floor())
}

/// Rows needed for a table whose final row index is `last_row` (a whole number).
pub fn table_rows(last_row: f64) -> Result<usize, AppError> {
    if !(last_row.is_finite() && last_row >= 0.0 && last_row < MAX_HORIZON as f64) {
        return Err(AppError::invalid_input(format!(
            "Cycle horizon {last_row} exceeds the supported maximum of {MAX_HORIZON} cycles."
        )));
    }
    (last_row as usize)
        .checked_add(1)
        .ok_or_else(|| AppError::invalid_input(format!("Cycle horizon {last_row} overflows.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_steps_give_exact_slope() {
        let s = SampleSeries::from_pairs(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]).unwrap();
        assert_eq!(growth_rate(&s).unwrap(), 1.0);
    }

    #[test]
    fn uneven_spacing_averages_pairwise_slopes() {
        // Slopes: 2/1 = 2 and 2/4 = 0.5 -> mean 1.25 (end-to-end slope would be 0.8).
        let s = SampleSeries::from_pairs(&[(0.0, 0.0), (1.0, 2.0), (5.0, 4.0)]).unwrap();
        assert!((growth_rate(&s).unwrap() - 1.25).abs() < 1e-15);
    }

    #[test]
    fn too_few_points_is_insufficient_data() {
        let s = SampleSeries::from_pairs(&[(0.0, 0.0)]).unwrap();
        assert_eq!(growth_rate(&s).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn repeated_cycle_is_rejected() {
        let s = SampleSeries::from_pairs(&[(1.0, 0.0), (1.0, 1.0)]).unwrap();
        assert_eq!(growth_rate(&s).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn negative_trend_clamps_to_zero() {
        let s = SampleSeries::from_pairs(&[(0.0, 2.0), (1.0, 1.0)]).unwrap();
        assert_eq!(growth_rate(&s).unwrap(), 0.0);
    }

    #[test]
    fn horizon_uses_last_cycle() {
        let s = SampleSeries::from_pairs(&[(0.0, 0.0), (3.0, 0.3)]).unwrap();
        assert_eq!(cycle_horizon(&s).unwrap(), 5);
        let single = SampleSeries::from_pairs(&[(0.0, 0.0)]).unwrap();
        assert_eq!(cycle_horizon(&single).unwrap(), 1);
        assert!(cycle_horizon(&SampleSeries::default()).is_err());
    }

    #[test]
    fn oversized_horizon_is_rejected() {
        let s = SampleSeries::from_pairs(&[(0.0, 0.0), (1e30, 1.0)]).unwrap();
        let err = cycle_horizon(&s).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);

        let limit = (MAX_HORIZON as f64 - 1.0) / HORIZON_FACTOR;
        let near = SampleSeries::from_pairs(&[(limit, 0.0)]).unwrap();
        assert!(cycle_horizon(&near).unwrap() <= MAX_HORIZON);
        assert!(table_rows(f64::INFINITY).is_err());
        assert_eq!(table_rows(4.0).unwrap(), 5);
    }
}
