//! Fitting routine for a single scenario.
//!
//! Given:
//! - the growth rate `gdot` and horizon `rmax`
//! - the measured non-growth series
//! - a scenario (active parameters + bounds)
//!
//! we minimise RMSE over the active parameters with a bounded Nelder–Mead
//! search started at the midpoint of the bounds. Inactive parameters stay at
//! exactly 0.
//!
//! The full search is followed by face searches: for each active parameter,
//! the same search runs over the remaining ones with that parameter pinned at
//! its lower bound. Pinning `ndot0` also pins `td`, which has no effect without
//! a rate term. A face search starts from the same midpoint with the same
//! settings as the smaller scenario it corresponds to, so a scenario never
//! scores worse than the scenarios nested inside it. Half of `max_evals` goes
//! to the full search and half is split across the faces.
//!
//! The minimiser's final vertex is not trusted as the answer. Every evaluation
//! is offered to a `BestSeen` accumulator owned by the run, and the result is
//! built from whatever evaluation scored lowest.

use nalgebra::DVector;
use tracing::debug;

use crate::domain::{
    FitConfig, FitResult, ModelParameters, ParamKind, SampleSeries, ScenarioSpec, StateTable,
};
use crate::fit::scorer::{RMSE_SENTINEL, rmse};
use crate::math::{Minimum, NelderMead};
use crate::models::simulate;

/// Lowest-RMSE evaluation seen during one scenario run.
#[derive(Debug, Clone)]
pub struct BestSeen {
    rmse: f64,
    fitted: Vec<f64>,
    params: ModelParameters,
    table: Option<StateTable>,
    evaluations: usize,
}

impl BestSeen {
    pub fn new() -> Self {
        Self {
            rmse: f64::INFINITY,
            fitted: Vec::new(),
            params: ModelParameters::default(),
            table: None,
            evaluations: 0,
        }
    }

    /// Record an evaluation; keeps it only if strictly better than the current best.
    pub fn offer(&mut self, rmse: f64, fitted: &[f64], params: ModelParameters, table: StateTable) {
        self.evaluations += 1;
        if self.table.is_none() || rmse < self.rmse {
            self.rmse = rmse;
            self.fitted = fitted.to_vec();
            self.params = params;
            self.table = Some(table);
        }
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

impl Default for BestSeen {
    fn default() -> Self {
        Self::new()
    }
}

/// Active-vector indices left free, plus the values of the pinned ones.
#[derive(Debug, Clone, PartialEq)]
struct Face {
    free: Vec<usize>,
    base: Vec<f64>,
}

/// Bounded minimiser for one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioOptimizer<'a> {
    spec: &'a ScenarioSpec,
    gdot: f64,
    rmax: usize,
    measured: &'a SampleSeries,
    search: NelderMead,
}

impl<'a> ScenarioOptimizer<'a> {
    pub fn new(
        spec: &'a ScenarioSpec,
        gdot: f64,
        rmax: usize,
        measured: &'a SampleSeries,
        config: &FitConfig,
    ) -> Self {
        Self {
            spec,
            gdot,
            rmax,
            measured,
            search: NelderMead {
                max_evals: config.max_evals,
                f_tol: config.f_tol,
                x_tol: config.x_tol,
                ..NelderMead::default()
            },
        }
    }

    /// Evaluate one trial vector: snap into bounds, build parameters, simulate, score.
    fn evaluate(&self, x: &[f64], best: &mut BestSeen) -> f64 {
        let clamped: Vec<f64> = self
            .spec
            .active
            .iter()
            .zip(x.iter())
            .map(|(p, &v)| p.snap(v))
            .collect();
        let params = ModelParameters::from_active(&self.spec.kinds(), &clamped);
        let table = simulate(self.gdot, &params, self.rmax);
        let score = if table.is_finite() {
            rmse(&table, self.measured)
        } else {
            RMSE_SENTINEL
        };

        // Report what the model actually used (td rounded).
        let used: Vec<f64> = self.spec.kinds().iter().map(|&k| params.get(k)).collect();
        best.offer(score, &used, params, table);
        score
    }

    /// Sub-searches with one parameter (and anything it makes inert) pinned low.
    fn faces(&self) -> Vec<Face> {
        let kinds = self.spec.kinds();
        let mut faces: Vec<Face> = Vec::new();
        for (i, kind) in kinds.iter().enumerate() {
            let pinned = |j: usize| {
                j == i || (*kind == ParamKind::Ndot0 && kinds[j] == ParamKind::Td)
            };
            let free: Vec<usize> = (0..kinds.len()).filter(|&j| !pinned(j)).collect();
            if faces.iter().any(|f| f.free == free) {
                continue;
            }
            let base = self
                .spec
                .active
                .iter()
                .enumerate()
                .map(|(j, p)| if pinned(j) { p.low } else { p.midpoint() })
                .collect();
            faces.push(Face { free, base });
        }
        faces
    }

    /// Nelder–Mead over the `free` coordinates; the rest keep their `base` value.
    fn search_face(
        &self,
        free: &[usize],
        base: &[f64],
        max_evals: usize,
        best: &mut BestSeen,
    ) -> Minimum {
        let pick = |values: Vec<f64>| DVector::from_iterator(free.len(), free.iter().map(|&i| values[i]));
        let x0 = pick(self.spec.initial_guess());
        let lower = pick(self.spec.lower());
        let upper = pick(self.spec.upper());

        let search = NelderMead { max_evals, ..self.search };
        search.minimize(
            |x: &DVector<f64>| {
                let mut full = base.to_vec();
                for (j, &i) in free.iter().enumerate() {
                    full[i] = x[j];
                }
                self.evaluate(&full, best)
            },
            &x0,
            &lower,
            &upper,
        )
    }

    /// Run the search and return the best evaluation.
    pub fn fit(&self) -> FitResult {
        let faces = self.faces();
        let searched = faces.iter().filter(|f| !f.free.is_empty()).count();
        let face_budget = if searched == 0 {
            1
        } else {
            (self.search.max_evals / 2 / searched).max(1)
        };
        let reserved: usize = faces
            .iter()
            .map(|f| if f.free.is_empty() { 1 } else { face_budget })
            .sum();
        let full_budget = self.search.max_evals.saturating_sub(reserved).max(1);

        let mut best = BestSeen::new();
        let all: Vec<usize> = (0..self.spec.active.len()).collect();
        let minimum = self.search_face(&all, &self.spec.initial_guess(), full_budget, &mut best);
        for face in &faces {
            let m = self.search_face(&face.free, &face.base, face_budget, &mut best);
            debug!(
                scenario = %self.spec.name,
                free = face.free.len(),
                evaluations = m.evaluations,
                rmse = m.fun,
                "face search finished"
            );
        }
        debug!(
            scenario = %self.spec.name,
            evaluations = best.evaluations(),
            converged = minimum.converged,
            final_vertex_rmse = minimum.fun,
            best_rmse = best.rmse(),
            "scenario search finished"
        );

        // The minimiser always evaluates at least once, so a table exists.
        let table = match best.table.take() {
            Some(table) => table,
            None => {
                let params = ModelParameters::from_active(&self.spec.kinds(), &self.spec.initial_guess());
                simulate(self.gdot, &params, self.rmax)
            }
        };

        FitResult {
            scenario: self.spec.name.clone(),
            active: self.spec.kinds(),
            fitted: best.fitted,
            params: best.params,
            rmse: if best.rmse.is_finite() { best.rmse } else { RMSE_SENTINEL },
            evaluations: best.evaluations,
            table,
        }
    }
}
