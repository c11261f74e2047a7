//! Residual scoring of a model table against measured non-growth thickness.

use crate::domain::{SampleSeries, StateTable};

/// Score assigned to unusable evaluations.
///
/// Large enough to lose against any real fit in the minimiser's comparisons.
pub const RMSE_SENTINEL: f64 = 1e6;

/// RMSE between measured points and the nearest model cycle.
///
/// Each measured point is matched to the table row with the closest cycle
/// (ties go to the lower index). Returns `RMSE_SENTINEL` when there is nothing
/// to score or any value involved is non-finite.
pub fn rmse(table: &StateTable, measured: &SampleSeries) -> f64 {
    if measured.is_empty() || table.is_empty() || !table.is_finite() {
        return RMSE_SENTINEL;
    }

    let mut sum = 0.0;
    for p in measured.points() {
        let Some(idx) = table.nearest_row(p.cycle) else {
            return RMSE_SENTINEL;
        };
        let r = p.thickness - table.nongrowth_thickness[idx];
        sum += r * r;
    }

    let rmse = (sum / measured.len() as f64).sqrt();
    if rmse.is_finite() { rmse } else { RMSE_SENTINEL }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelParameters;
    use crate::models::simulate;

    #[test]
    fn own_predictions_score_zero() {
        let p = ModelParameters { nhat: 0.02, ndot0: 0.01, td: 2 };
        let table = simulate(0.8, &p, 12);
        let pairs: Vec<(f64, f64)> = [0usize, 3, 4, 9, 11]
            .iter()
            .map(|&t| (t as f64, table.nongrowth_thickness[t]))
            .collect();
        let measured = SampleSeries::from_pairs(&pairs).unwrap();
        assert!(rmse(&table, &measured) < 1e-12);
    }

    #[test]
    fn nearest_cycle_matching_and_tie_break() {
        let table = StateTable {
            cycle: vec![0.0, 1.0, 2.0],
            nongrowth_thickness: vec![0.0, 1.0, 3.0],
            ..StateTable::default()
        };
        // 1.5 is equidistant from rows 1 and 2 -> row 1 (thickness 1.0).
        let measured = SampleSeries::from_pairs(&[(1.5, 2.0)]).unwrap();
        assert_eq!(rmse(&table, &measured), 1.0);
        // Beyond the table -> last row.
        let measured = SampleSeries::from_pairs(&[(9.0, 3.0)]).unwrap();
        assert_eq!(rmse(&table, &measured), 0.0);
    }

    #[test]
    fn rmse_averages_squared_errors() {
        let table = StateTable {
            cycle: vec![0.0, 1.0],
            nongrowth_thickness: vec![0.0, 0.0],
            ..StateTable::default()
        };
        let measured = SampleSeries::from_pairs(&[(0.0, 3.0), (1.0, 4.0)]).unwrap();
        assert!((rmse(&table, &measured) - (12.5f64).sqrt()).abs() < 1e-15);
    }

    #[test]
    fn sentinel_for_empty_or_non_finite() {
        let table = StateTable {
            cycle: vec![0.0, 1.0],
            nongrowth_thickness: vec![0.0, f64::INFINITY],
            ..StateTable::default()
        };
        let measured = SampleSeries::from_pairs(&[(0.0, 0.0)]).unwrap();
        assert_eq!(rmse(&table, &measured), RMSE_SENTINEL);
        assert_eq!(rmse(&StateTable::default(), &measured), RMSE_SENTINEL);

        let ok = StateTable { cycle: vec![0.0], nongrowth_thickness: vec![0.0], ..StateTable::default() };
        assert_eq!(rmse(&ok, &SampleSeries::default()), RMSE_SENTINEL);
    }
}
