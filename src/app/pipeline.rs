//! Shared "fit pipeline" logic used by the `fit` and `plot` commands.
//!
//! growth series -> growth rate + horizon -> scenario fits -> selection -> output
//!
//! With fixed parameters the search is skipped and the model is evaluated once
//! under the scenario name `custom`.

use std::time::Instant;

use tracing::{info, warn};

use crate::domain::{AnOutput, FitConfig, FitResult, ModelParameters, ParamKind, SampleSeries, ScenarioSummary};
use crate::error::AppError;
use crate::fit::{RMSE_SENTINEL, canonical_scenarios, fit_and_select, rmse};
use crate::math::{cycle_horizon, growth_rate};
use crate::models::simulate;

/// Scenario name reported for fixed-parameter runs.
pub const CUSTOM_SCENARIO: &str = "custom";

/// Run the AN model against measured growth and non-growth series.
///
/// Returns an error for fewer than 2 growth points or no non-growth points.
/// Every numeric field of the output is finite.
pub fn run_an_model(
    growth: &SampleSeries,
    nongrowth: &SampleSeries,
    fixed: Option<ModelParameters>,
    config: &FitConfig,
) -> Result<AnOutput, AppError> {
    let started = Instant::now();

    if nongrowth.is_empty() {
        return Err(AppError::insufficient_data(
            "Non-growth data must have at least 1 point.",
        ));
    }
    let gdot = growth_rate(growth)?;
    let rmax = cycle_horizon(nongrowth)?;
    info!(gdot, rmax, points = nongrowth.len(), "growth rate estimated");

    let (mut best, fits, all_degenerate, skipped) = match fixed {
        Some(params) => {
            params.validate()?;
            let fit = evaluate_fixed(gdot, rmax, nongrowth, params);
            (fit.clone(), vec![fit], false, Vec::new())
        }
        None => {
            let scenarios = canonical_scenarios(rmax)?;
            let deadline = config.deadline.map(|d| started + d);
            let sel = fit_and_select(&scenarios, gdot, rmax, nongrowth, config, deadline)?;
            (sel.best, sel.fits, sel.all_degenerate, sel.skipped)
        }
    };

    let replaced = best.table.sanitize();
    if replaced > 0 {
        warn!(replaced, scenario = %best.scenario, "non-finite table values replaced with 0");
    }
    if !best.rmse.is_finite() {
        best.rmse = RMSE_SENTINEL;
    }

    let all_scenarios: Vec<ScenarioSummary> = fits
        .iter()
        .map(|f| {
            let mut summary = ScenarioSummary::from(f);
            if !summary.rmse.is_finite() {
                summary.rmse = RMSE_SENTINEL;
            }
            for col in [
                &mut summary.model_x,
                &mut summary.model_growth_y,
                &mut summary.model_nongrowth_y,
            ] {
                col.iter_mut().filter(|v| !v.is_finite()).for_each(|v| *v = 0.0);
            }
            summary
        })
        .collect();

    info!(
        scenario = %best.scenario,
        rmse = best.rmse,
        nhat = best.params.nhat,
        ndot0 = best.params.ndot0,
        td = best.params.td,
        "best scenario selected"
    );

    Ok(AnOutput {
        best_scenario: best.scenario.clone(),
        best_params: best.params,
        best_rmse: best.rmse,
        gdot,
        rmax,
        growth: growth.to_pairs(),
        nongrowth: nongrowth.to_pairs(),
        model_x: best.table.cycle.clone(),
        model_growth_y: best.table.growth_thickness.clone(),
        model_nongrowth_y: best.table.nongrowth_thickness.clone(),
        table: best.table,
        all_scenarios,
        all_degenerate,
        skipped,
        computation_time: started.elapsed().as_secs_f64(),
    })
}

fn evaluate_fixed(gdot: f64, rmax: usize, nongrowth: &SampleSeries, params: ModelParameters) -> FitResult {
    let table = simulate(gdot, &params, rmax);
    let score = rmse(&table, nongrowth);
    FitResult {
        scenario: CUSTOM_SCENARIO.to_string(),
        active: ParamKind::ALL.to_vec(),
        fitted: ParamKind::ALL.iter().map(|&k| params.get(k)).collect(),
        params,
        rmse: score,
        evaluations: 1,
        table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn series(pairs: &[(f64, f64)]) -> SampleSeries {
        SampleSeries::from_pairs(pairs).unwrap()
    }

    #[test]
    fn fixed_parameters_skip_search() {
        let growth = series(&[(0.0, 0.0), (10.0, 10.0)]);
        let nongrowth = series(&[(0.0, 0.0), (4.0, 0.2), (8.0, 1.1)]);
        let params = ModelParameters::new(0.01, 0.002, 1).unwrap();
        let out = run_an_model(&growth, &nongrowth, Some(params), &FitConfig::default()).unwrap();

        assert_eq!(out.best_scenario, CUSTOM_SCENARIO);
        assert_eq!(out.best_params, params);
        assert_eq!(out.all_scenarios.len(), 1);
        assert_eq!(out.scenario(CUSTOM_SCENARIO).unwrap().evaluations, 1);
        assert_eq!(out.rmax, 13);

        let table = simulate(1.0, &params, 13);
        assert_abs_diff_eq!(out.best_rmse, rmse(&table, &nongrowth), epsilon = 1e-15);
    }

    #[test]
    fn negative_fixed_parameters_rejected() {
        let growth = series(&[(0.0, 0.0), (1.0, 1.0)]);
        let nongrowth = series(&[(0.0, 0.0)]);
        let bad = ModelParameters { nhat: -0.1, ndot0: 0.0, td: 0 };
        let err = run_an_model(&growth, &nongrowth, Some(bad), &FitConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_data_is_insufficient() {
        let growth = series(&[(0.0, 0.0), (1.0, 1.0)]);
        let err = run_an_model(&growth, &SampleSeries::default(), None, &FitConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let err = run_an_model(&series(&[(0.0, 0.0)]), &series(&[(0.0, 0.0)]), None, &FitConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn comparison_list_covers_every_scenario_in_order() {
        let growth = series(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let nongrowth = series(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.1), (3.0, 0.3)]);
        let config = FitConfig { max_evals: 80, ..FitConfig::default() };
        let out = run_an_model(&growth, &nongrowth, None, &config).unwrap();

        let names: Vec<&str> = out.all_scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["nhat only", "ndot0 only", "ndot0 and td", "nhat and ndot0", "nhat + ndot0 + td"]
        );
        let best = out.scenario(&out.best_scenario).unwrap();
        assert_eq!(best.rmse, out.best_rmse);
        assert_eq!(out.model_x.len(), out.rmax);
        assert!(out.computation_time >= 0.0);
    }
}
