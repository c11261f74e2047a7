//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One measured `(cycle, thickness)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub cycle: f64,
    pub thickness: f64,
}

/// Ordered thickness measurements for one surface.
///
/// Insertion order is cycle order. Cycles need not be contiguous.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleSeries {
    points: Vec<SamplePoint>,
}

impl SampleSeries {
    /// Validate and wrap a list of samples.
    ///
    /// Rejects non-finite values, negative cycles and descending cycles.
    /// An empty series is allowed here; callers decide how many points they need.
    pub fn new(points: Vec<SamplePoint>) -> Result<Self, AppError> {
        for (i, p) in points.iter().enumerate() {
            if !(p.cycle.is_finite() && p.thickness.is_finite()) {
                return Err(AppError::invalid_input(format!(
                    "Sample {i} has a non-finite value (cycle={}, thickness={}).",
                    p.cycle, p.thickness
                )));
            }
            if p.cycle < 0.0 {
                return Err(AppError::invalid_input(format!(
                    "Sample {i} has a negative cycle ({}).",
                    p.cycle
                )));
            }
        }
        if let Some(i) = points.windows(2).position(|w| w[1].cycle < w[0].cycle) {
            return Err(AppError::invalid_input(format!(
                "Samples must be sorted by cycle (sample {} at cycle {} follows cycle {}).",
                i + 1,
                points[i + 1].cycle,
                points[i].cycle
            )));
        }
        Ok(Self { points })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, AppError> {
        Self::new(
            pairs
                .iter()
                .map(|&(cycle, thickness)| SamplePoint { cycle, thickness })
                .collect(),
        )
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cycle of the final entry (the series is assumed sorted).
    pub fn last_cycle(&self) -> Option<f64> {
        self.points.last().map(|p| p.cycle)
    }

    pub fn to_pairs(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.cycle, p.thickness)).collect()
    }
}

/// One of the three physical parameters of the AN model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Areal density of nucleation sites present from the start.
    Nhat,
    /// Rate at which new nucleation sites appear.
    Ndot0,
    /// Nucleation delay time in cycles (integer).
    Td,
}

impl ParamKind {
    pub const ALL: [ParamKind; 3] = [ParamKind::Nhat, ParamKind::Ndot0, ParamKind::Td];

    pub fn name(self) -> &'static str {
        match self {
            ParamKind::Nhat => "nhat",
            ParamKind::Ndot0 => "ndot0",
            ParamKind::Td => "td",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, ParamKind::Td)
    }
}

/// Full parameter set for a forward-model evaluation.
///
/// Inactive parameters are exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelParameters {
    pub nhat: f64,
    pub ndot0: f64,
    pub td: u32,
}

impl ModelParameters {
    pub fn new(nhat: f64, ndot0: f64, td: u32) -> Result<Self, AppError> {
        let params = Self { nhat, ndot0, td };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.nhat.is_finite() && self.nhat >= 0.0) {
            return Err(AppError::invalid_input(format!(
                "nhat must be finite and >= 0 (got {}).",
                self.nhat
            )));
        }
        if !(self.ndot0.is_finite() && self.ndot0 >= 0.0) {
            return Err(AppError::invalid_input(format!(
                "ndot0 must be finite and >= 0 (got {}).",
                self.ndot0
            )));
        }
        Ok(())
    }

    pub fn get(&self, kind: ParamKind) -> f64 {
        match kind {
            ParamKind::Nhat => self.nhat,
            ParamKind::Ndot0 => self.ndot0,
            ParamKind::Td => f64::from(self.td),
        }
    }

    /// Build parameters from a trial vector over `active`; everything else is 0.
    ///
    /// Negative trial values are clamped to 0 and `td` is rounded to the
    /// nearest integer.
    pub fn from_active(active: &[ParamKind], values: &[f64]) -> Self {
        let mut out = Self::default();
        for (&kind, &v) in active.iter().zip(values.iter()) {
            let v = if v.is_finite() { v.max(0.0) } else { 0.0 };
            match kind {
                ParamKind::Nhat => out.nhat = v,
                ParamKind::Ndot0 => out.ndot0 = v,
                ParamKind::Td => out.td = v.round().min(f64::from(u32::MAX)) as u32,
            }
        }
        out
    }
}

/// Search interval for one active parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveParam {
    pub kind: ParamKind,
    pub low: f64,
    pub high: f64,
}

impl ActiveParam {
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.max(self.low).min(self.high)
    }

    /// Clamp into the interval; integer parameters are also rounded, staying
    /// inside the interval when it contains an integer.
    pub fn snap(&self, v: f64) -> f64 {
        let v = self.clamp(v);
        if !self.kind.is_integer() {
            return v;
        }
        let r = v.round();
        if r > self.high && r - 1.0 >= self.low {
            r - 1.0
        } else if r < self.low && r + 1.0 <= self.high {
            r + 1.0
        } else {
            r
        }
    }
}

/// A named hypothesis about which nucleation mechanisms are active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    pub active: Vec<ActiveParam>,
}

impl ScenarioSpec {
    pub fn new(name: impl Into<String>, active: Vec<ActiveParam>) -> Result<Self, AppError> {
        let name = name.into();
        if active.is_empty() {
            return Err(AppError::invalid_input(format!(
                "Scenario '{name}' has no active parameters."
            )));
        }
        for (i, p) in active.iter().enumerate() {
            if !(p.low.is_finite() && p.high.is_finite() && p.low >= 0.0 && p.high >= p.low) {
                return Err(AppError::invalid_input(format!(
                    "Scenario '{name}': invalid bounds for {} ({}, {}).",
                    p.kind.name(),
                    p.low,
                    p.high
                )));
            }
            if active[..i].iter().any(|q| q.kind == p.kind) {
                return Err(AppError::invalid_input(format!(
                    "Scenario '{name}' lists {} twice.",
                    p.kind.name()
                )));
            }
        }
        Ok(Self { name, active })
    }

    pub fn kinds(&self) -> Vec<ParamKind> {
        self.active.iter().map(|p| p.kind).collect()
    }

    pub fn initial_guess(&self) -> Vec<f64> {
        self.active.iter().map(ActiveParam::midpoint).collect()
    }

    pub fn lower(&self) -> Vec<f64> {
        self.active.iter().map(|p| p.low).collect()
    }

    pub fn upper(&self) -> Vec<f64> {
        self.active.iter().map(|p| p.high).collect()
    }
}

/// Per-cycle model state for one parameter set.
///
/// Stored column-wise; every column has the same length (`rmax`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateTable {
    pub cycle: Vec<f64>,
    pub growth_thickness: Vec<f64>,
    pub nongrowth_thickness: Vec<f64>,
    /// `(hg - hn) / (hg + hn)`.
    pub selectivity: Vec<f64>,
    /// Fractional coverage of the non-growth surface.
    pub coverage: Vec<f64>,
    /// `(1 - coverage) / (1 + coverage)`.
    pub coverage_selectivity: Vec<f64>,
    pub nucleation_density: Vec<f64>,
    pub thickness_delta: Vec<f64>,
    pub particle_radius: Vec<f64>,
}

impl StateTable {
    pub fn len(&self) -> usize {
        self.cycle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycle.is_empty()
    }

    fn columns(&self) -> [&Vec<f64>; 9] {
        [
            &self.cycle,
            &self.growth_thickness,
            &self.nongrowth_thickness,
            &self.selectivity,
            &self.coverage,
            &self.coverage_selectivity,
            &self.nucleation_density,
            &self.thickness_delta,
            &self.particle_radius,
        ]
    }

    fn columns_mut(&mut self) -> [&mut Vec<f64>; 9] {
        [
            &mut self.cycle,
            &mut self.growth_thickness,
            &mut self.nongrowth_thickness,
            &mut self.selectivity,
            &mut self.coverage,
            &mut self.coverage_selectivity,
            &mut self.nucleation_density,
            &mut self.thickness_delta,
            &mut self.particle_radius,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.columns().iter().all(|c| c.iter().all(|v| v.is_finite()))
    }

    /// Replace non-finite entries with 0; returns how many were replaced.
    pub fn sanitize(&mut self) -> usize {
        let mut replaced = 0;
        for col in self.columns_mut() {
            for v in col.iter_mut() {
                if !v.is_finite() {
                    *v = 0.0;
                    replaced += 1;
                }
            }
        }
        replaced
    }

    /// Index of the row whose cycle is closest to `cycle`.
    ///
    /// Ties resolve to the lowest index. Returns `None` for an empty table.
    pub fn nearest_row(&self, cycle: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &c) in self.cycle.iter().enumerate() {
            let d = (c - cycle).abs();
            match best {
                Some((_, bd)) if d >= bd => {}
                _ => best = Some((i, d)),
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Best fit for a single scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub scenario: String,
    pub active: Vec<ParamKind>,
    /// Fitted values of the active parameters, in `active` order.
    pub fitted: Vec<f64>,
    pub params: ModelParameters,
    pub rmse: f64,
    pub evaluations: usize,
    pub table: StateTable,
}

impl FitResult {
    /// True when every active parameter is meaningfully non-zero.
    pub fn is_informative(&self, zero_tol: f64) -> bool {
        !self.fitted.is_empty() && self.fitted.iter().all(|p| p.abs() > zero_tol)
    }
}

/// Compact per-scenario view used in the comparison list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub rmse: f64,
    pub params: Vec<f64>,
    pub nhat: f64,
    pub ndot0: f64,
    pub td: u32,
    pub evaluations: usize,
    pub model_x: Vec<f64>,
    pub model_growth_y: Vec<f64>,
    pub model_nongrowth_y: Vec<f64>,
}

impl From<&FitResult> for ScenarioSummary {
    fn from(fit: &FitResult) -> Self {
        Self {
            name: fit.scenario.clone(),
            rmse: fit.rmse,
            params: fit.fitted.clone(),
            nhat: fit.params.nhat,
            ndot0: fit.params.ndot0,
            td: fit.params.td,
            evaluations: fit.evaluations,
            model_x: fit.table.cycle.clone(),
            model_growth_y: fit.table.growth_thickness.clone(),
            model_nongrowth_y: fit.table.nongrowth_thickness.clone(),
        }
    }
}

/// Tunables for a fitting run.
///
/// Derived from CLI flags / environment (plus defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    /// Objective evaluations allowed per scenario.
    pub max_evals: usize,
    /// Stop when the simplex value spread falls below this.
    pub f_tol: f64,
    /// Stop when the simplex diameter falls below this.
    pub x_tol: f64,
    /// Active parameters at or below this magnitude count as collapsed.
    pub zero_tol: f64,
    /// Run scenarios concurrently.
    pub parallel: bool,
    /// Wall-clock budget for the scenario loop.
    pub deadline: Option<Duration>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_evals: 300,
            f_tol: 1e-8,
            x_tol: 1e-8,
            zero_tol: 1e-8,
            parallel: true,
            deadline: None,
        }
    }
}

/// Full output of one `run_an_model` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnOutput {
    pub best_scenario: String,
    pub best_params: ModelParameters,
    pub best_rmse: f64,
    pub gdot: f64,
    pub rmax: usize,
    pub growth: Vec<(f64, f64)>,
    pub nongrowth: Vec<(f64, f64)>,
    pub model_x: Vec<f64>,
    pub model_growth_y: Vec<f64>,
    pub model_nongrowth_y: Vec<f64>,
    pub table: StateTable,
    /// One entry per fitted scenario, in scenario list order.
    pub all_scenarios: Vec<ScenarioSummary>,
    /// Set when every scenario collapsed to ~0 and selection fell back to raw RMSE.
    pub all_degenerate: bool,
    /// Scenarios not started because the deadline passed.
    pub skipped: Vec<String>,
    pub computation_time: f64,
}

impl AnOutput {
    /// Summary for the named scenario, if it was fitted.
    pub fn scenario(&self, name: &str) -> Option<&ScenarioSummary> {
        self.all_scenarios.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_rejects_descending_cycles() {
        let err = SampleSeries::from_pairs(&[(0.0, 0.0), (2.0, 1.0), (1.0, 2.0)]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn series_rejects_negative_and_nan() {
        assert!(SampleSeries::from_pairs(&[(-1.0, 0.0)]).is_err());
        assert!(SampleSeries::from_pairs(&[(0.0, f64::NAN)]).is_err());
        assert!(SampleSeries::from_pairs(&[]).unwrap().is_empty());
    }

    #[test]
    fn from_active_zeroes_inactive_and_rounds_td() {
        let p = ModelParameters::from_active(&[ParamKind::Ndot0, ParamKind::Td], &[0.02, 3.6]);
        assert_eq!(p.nhat, 0.0);
        assert_eq!(p.ndot0, 0.02);
        assert_eq!(p.td, 4);

        let p = ModelParameters::from_active(&[ParamKind::Nhat], &[-0.5]);
        assert_eq!(p.nhat, 0.0);
    }

    #[test]
    fn snap_rounds_integer_parameters_inside_bounds() {
        let td = ActiveParam { kind: ParamKind::Td, low: 0.0, high: 2.5 };
        assert_eq!(td.snap(2.4), 2.0);
        assert_eq!(td.snap(2.5), 2.0);
        assert_eq!(td.snap(9.0), 2.0);
        let nhat = ActiveParam { kind: ParamKind::Nhat, low: 0.0, high: 0.1 };
        assert_eq!(nhat.snap(0.05), 0.05);
        assert_eq!(nhat.snap(-1.0), 0.0);
    }

    #[test]
    fn scenario_rejects_bad_bounds() {
        let bad = ActiveParam { kind: ParamKind::Nhat, low: 1.0, high: 0.0 };
        assert!(ScenarioSpec::new("x", vec![bad]).is_err());
        assert!(ScenarioSpec::new("empty", vec![]).is_err());
    }

    #[test]
    fn nearest_row_breaks_ties_low() {
        let table = StateTable {
            cycle: vec![0.0, 1.0, 2.0, 3.0],
            ..StateTable::default()
        };
        assert_eq!(table.nearest_row(1.5), Some(1));
        assert_eq!(table.nearest_row(1.6), Some(2));
        assert_eq!(table.nearest_row(10.0), Some(3));
        assert_eq!(StateTable::default().nearest_row(1.0), None);
    }
}
