//! The canonical nucleation hypotheses.
//!
//! Each scenario switches on a subset of `{nhat, ndot0, td}`:
//!
//! | scenario            | nhat | ndot0 | td |
//! |---------------------|------|-------|----|
//! | `nhat only`         | x    |       |    |
//! | `ndot0 only`        |      | x     |    |
//! | `ndot0 and td`      |      | x     | x  |
//! | `nhat and ndot0`    | x    | x     |    |
//! | `nhat + ndot0 + td` | x    | x     | x  |
//!
//! List order matters: exact RMSE ties resolve to the earlier entry.

use crate::domain::{ActiveParam, ParamKind, ScenarioSpec};
use crate::error::AppError;

/// Upper bound for both nucleation parameters.
pub const DENSITY_BOUND: f64 = 0.1;

/// Upper bound for `td`: half the simulated span, in whole cycles.
pub fn delay_bound(rmax: usize) -> f64 {
    (rmax.saturating_sub(1) / 2) as f64
}

fn bounded(kind: ParamKind, rmax: usize) -> ActiveParam {
    let high = match kind {
        ParamKind::Nhat | ParamKind::Ndot0 => DENSITY_BOUND,
        ParamKind::Td => delay_bound(rmax),
    };
    ActiveParam { kind, low: 0.0, high }
}

/// The five scenarios, in selection order.
pub fn canonical_scenarios(rmax: usize) -> Result<Vec<ScenarioSpec>, AppError> {
    use ParamKind::{Ndot0, Nhat, Td};

    let table: [(&str, &[ParamKind]); 5] = [
        ("nhat only", &[Nhat]),
        ("ndot0 only", &[Ndot0]),
        ("ndot0 and td", &[Ndot0, Td]),
        ("nhat and ndot0", &[Nhat, Ndot0]),
        ("nhat + ndot0 + td", &[Nhat, Ndot0, Td]),
    ];

    table
        .iter()
        .map(|(name, kinds)| {
            ScenarioSpec::new(*name, kinds.iter().map(|&k| bounded(k, rmax)).collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_scenarios_in_order() {
        let s = canonical_scenarios(21).unwrap();
        let names: Vec<&str> = s.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(
            names,
            ["nhat only", "ndot0 only", "ndot0 and td", "nhat and ndot0", "nhat + ndot0 + td"]
        );
        assert_eq!(s[4].kinds(), vec![ParamKind::Nhat, ParamKind::Ndot0, ParamKind::Td]);
    }

    #[test]
    fn delay_bound_is_half_span() {
        assert_eq!(delay_bound(21), 10.0);
        assert_eq!(delay_bound(5), 2.0);
        assert_eq!(delay_bound(1), 0.0);
        let s = canonical_scenarios(5).unwrap();
        assert_eq!(s[2].active[1].high, 2.0);
        assert_eq!(s[0].initial_guess(), vec![0.05]);
    }
}
