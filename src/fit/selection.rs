//! Scenario selection.
//!
//! Every scenario is fitted independently, then:
//!
//! 1. keep fits whose active parameters are all `|p| > zero_tol`
//! 2. choose the lowest RMSE among them (exact ties go to the earlier scenario)
//! 3. if nothing qualifies, take the lowest RMSE overall and flag the run as
//!    degenerate

use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{FitConfig, FitResult, SampleSeries, ScenarioSpec};
use crate::error::AppError;
use crate::fit::fitter::ScenarioOptimizer;

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct ScenarioSelection {
    pub best: FitResult,
    /// Completed fits, in scenario list order.
    pub fits: Vec<FitResult>,
    /// No fit had all-nonzero parameters; `best` is the plain RMSE minimum.
    pub all_degenerate: bool,
    /// Scenarios not started because the deadline had passed.
    pub skipped: Vec<String>,
}

/// Fit every scenario and select the best one.
///
/// Scenarios run as a rayon parallel map unless `config.parallel` is off.
/// Once `deadline` has passed, scenarios that have not started are skipped;
/// the first scenario always runs.
///
/// The deadline is only checked when a scenario starts, and a running fit is
/// never interrupted. In parallel mode rayon starts every scenario at once
/// when there are enough worker threads, so a deadline that passes mid-run
/// skips nothing. It bounds wall time in sequential mode, or in parallel mode
/// when the pool has fewer threads than scenarios.
pub fn fit_and_select(
    scenarios: &[ScenarioSpec],
    gdot: f64,
    rmax: usize,
    measured: &SampleSeries,
    config: &FitConfig,
    deadline: Option<Instant>,
) -> Result<ScenarioSelection, AppError> {
    if scenarios.is_empty() {
        return Err(AppError::invalid_input("No scenarios to fit."));
    }
    let mut names = HashSet::new();
    for s in scenarios {
        if !names.insert(s.name.as_str()) {
            return Err(AppError::invalid_input(format!(
                "Duplicate scenario name '{}'.",
                s.name
            )));
        }
    }

    let run = |(idx, spec): (usize, &ScenarioSpec)| -> Option<FitResult> {
        if idx > 0 && deadline.is_some_and(|d| Instant::now() >= d) {
            return None;
        }
        info!(scenario = %spec.name, params = spec.active.len(), "fitting scenario");
        let fit = ScenarioOptimizer::new(spec, gdot, rmax, measured, config).fit();
        info!(
            scenario = %fit.scenario,
            rmse = fit.rmse,
            evaluations = fit.evaluations,
            "scenario fitted"
        );
        Some(fit)
    };

    let outcomes: Vec<Option<FitResult>> = if config.parallel {
        scenarios.par_iter().enumerate().map(run).collect()
    } else {
        scenarios.iter().enumerate().map(run).collect()
    };

    let mut fits = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for (spec, outcome) in scenarios.iter().zip(outcomes) {
        match outcome {
            Some(fit) => fits.push(fit),
            None => {
                warn!(scenario = %spec.name, "deadline passed, scenario skipped");
                skipped.push(spec.name.clone());
            }
        }
    }

    let Some((idx, all_degenerate)) = select_best(&fits, config.zero_tol) else {
        return Err(AppError::fit("No scenario produced a result."));
    };

    Ok(ScenarioSelection {
        best: fits[idx].clone(),
        fits,
        all_degenerate,
        skipped,
    })
}

/// Index of the chosen fit and whether the degenerate fallback was used.
///
/// `None` only for an empty slice.
pub fn select_best(fits: &[FitResult], zero_tol: f64) -> Option<(usize, bool)> {
    if let Some(i) = lowest_rmse(fits, |f| f.is_informative(zero_tol)) {
        return Some((i, false));
    }

    let i = lowest_rmse(fits, |_| true)?;
    warn!(
        scenario = %fits[i].scenario,
        rmse = fits[i].rmse,
        "every scenario has a zero parameter; falling back to lowest RMSE"
    );
    Some((i, true))
}

/// First index with the minimum RMSE among fits passing `keep`.
fn lowest_rmse(fits: &[FitResult], keep: impl Fn(&FitResult) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, f) in fits.iter().enumerate() {
        if !keep(f) {
            continue;
        }
        match best {
            Some(b) if fits[b].rmse <= f.rmse => {}
            _ => best = Some(i),
        }
    }
    best
}
