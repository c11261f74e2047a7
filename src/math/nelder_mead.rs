//! Box-constrained Nelder–Mead minimiser.
//!
//! The AN-model objective is cheap to state but awkward to differentiate: `td`
//! is integer-valued and non-finite trials are replaced by a flat sentinel. A
//! derivative-free simplex search handles both.
//!
//! Bounds are enforced by projecting every trial vertex onto the box before it
//! is evaluated, so the objective never sees an out-of-bounds point.
//!
//! The search is budget-capped rather than convergence-gated: reaching
//! `max_evals` is a normal exit and the best vertex found so far is returned.
//! The final iteration may overshoot the budget by at most `n + 1` evaluations
//! (a full shrink step, or the initial simplex of a restart).

use nalgebra::DVector;

const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Simplex search settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMead {
    pub max_evals: usize,
    /// Convergence threshold on the spread of simplex values.
    pub f_tol: f64,
    /// Convergence threshold on the simplex diameter (max-norm).
    pub x_tol: f64,
    /// Initial edge length as a fraction of each bound interval.
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_evals: 300,
            f_tol: 1e-8,
            x_tol: 1e-8,
            initial_step: 0.25,
        }
    }
}

/// Outcome of a minimisation.
#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: DVector<f64>,
    pub fun: f64,
    pub evaluations: usize,
    /// False when the evaluation budget ran out first.
    pub converged: bool,
}

struct Counted<F> {
    f: F,
    evals: usize,
}

impl<F: FnMut(&DVector<f64>) -> f64> Counted<F> {
    fn call(&mut self, x: &DVector<f64>) -> f64 {
        self.evals += 1;
        let v = (self.f)(x);
        if v.is_nan() { f64::INFINITY } else { v }
    }
}

fn project(x: &DVector<f64>, lower: &DVector<f64>, upper: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(
        x.len(),
        x.iter().enumerate().map(|(i, &v)| {
            if v.is_nan() {
                lower[i]
            } else {
                v.max(lower[i]).min(upper[i])
            }
        }),
    )
}

struct Descent {
    x: DVector<f64>,
    fun: f64,
    converged: bool,
}

impl NelderMead {
    /// Minimise `f` over the box `[lower, upper]` starting from `x0`.
    ///
    /// `x0` is projected into the box first. Callers must supply `lower <= upper`.
    ///
    /// A converged simplex is restarted from its best vertex with a fresh
    /// initial simplex. Restarts continue while each one improves the best
    /// value by more than `f_tol` and budget remains. The budget is shared by
    /// all restarts.
    pub fn minimize<F>(
        &self,
        f: F,
        x0: &DVector<f64>,
        lower: &DVector<f64>,
        upper: &DVector<f64>,
    ) -> Minimum
    where
        F: FnMut(&DVector<f64>) -> f64,
    {
        let mut obj = Counted { f, evals: 0 };
        let x0 = project(x0, lower, upper);

        if x0.is_empty() {
            let fun = obj.call(&x0);
            return Minimum {
                x: x0,
                fun,
                evaluations: obj.evals,
                converged: true,
            };
        }

        let mut best = self.descend(&mut obj, x0, lower, upper);
        while best.converged && obj.evals < self.max_evals {
            let next = self.descend(&mut obj, best.x.clone(), lower, upper);
            let improved = next.fun < best.fun - self.f_tol;
            if next.fun < best.fun {
                best = next;
            } else {
                best.converged = next.converged;
            }
            if !improved {
                break;
            }
        }

        Minimum {
            x: best.x,
            fun: best.fun,
            evaluations: obj.evals,
            converged: best.converged,
        }
    }

    /// One simplex pass from `x0` until convergence or the shared budget runs out.
    fn descend<F>(
        &self,
        obj: &mut Counted<F>,
        x0: DVector<f64>,
        lower: &DVector<f64>,
        upper: &DVector<f64>,
    ) -> Descent
    where
        F: FnMut(&DVector<f64>) -> f64,
    {
        let n = x0.len();
        let mut simplex: Vec<(DVector<f64>, f64)> = Vec::with_capacity(n + 1);
        let f0 = obj.call(&x0);
        simplex.push((x0.clone(), f0));
        for i in 0..n {
            let step = self.initial_step * (upper[i] - lower[i]);
            let mut xi = x0.clone();
            // Step toward whichever side of the box has room.
            if x0[i] + step <= upper[i] {
                xi[i] += step;
            } else {
                xi[i] -= step;
            }
            let xi = project(&xi, lower, upper);
            let fi = obj.call(&xi);
            simplex.push((xi, fi));
        }

        let mut converged = false;
        loop {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let best_f = simplex[0].1;
            let worst_f = simplex[n].1;
            let spread = if best_f == worst_f { 0.0 } else { (worst_f - best_f).abs() };
            let diameter = simplex[1..]
                .iter()
                .map(|(x, _)| (x - &simplex[0].0).amax())
                .fold(0.0_f64, f64::max);
            if spread <= self.f_tol && diameter <= self.x_tol {
                converged = true;
                break;
            }
            if obj.evals >= self.max_evals {
                break;
            }

            let mut centroid = DVector::<f64>::zeros(n);
            for (x, _) in &simplex[..n] {
                centroid += x;
            }
            centroid /= n as f64;

            let worst = simplex[n].0.clone();
            let xr = project(&(&centroid + (&centroid - &worst) * ALPHA), lower, upper);
            let fr = obj.call(&xr);

            if fr < best_f {
                let xe = project(&(&centroid + (&xr - &centroid) * GAMMA), lower, upper);
                let fe = obj.call(&xe);
                simplex[n] = if fe < fr { (xe, fe) } else { (xr, fr) };
            } else if fr < simplex[n - 1].1 {
                simplex[n] = (xr, fr);
            } else {
                let target = if fr < worst_f { &xr } else { &worst };
                let xc = project(&(&centroid + (target - &centroid) * RHO), lower, upper);
                let fc = obj.call(&xc);
                if fc < fr.min(worst_f) {
                    simplex[n] = (xc, fc);
                } else {
                    let best = simplex[0].0.clone();
                    for vertex in simplex.iter_mut().skip(1) {
                        let xs = project(&(&best + (&vertex.0 - &best) * SIGMA), lower, upper);
                        let fs = obj.call(&xs);
                        *vertex = (xs, fs);
                    }
                }
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (x, fun) = simplex.swap_remove(0);
        Descent { x, fun, converged }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(xs: &[f64]) -> DVector<f64> {
        DVector::from_row_slice(xs)
    }

    #[test]
    fn finds_interior_minimum_of_quadratic() {
        let nm = NelderMead { max_evals: 2000, ..NelderMead::default() };
        let f = |x: &DVector<f64>| (x[0] - 0.3).powi(2) + 2.0 * (x[1] + 0.2).powi(2);
        let m = nm.minimize(f, &v(&[0.0, 0.0]), &v(&[-1.0, -1.0]), &v(&[1.0, 1.0]));
        assert!((m.x[0] - 0.3).abs() < 1e-3, "x0={}", m.x[0]);
        assert!((m.x[1] + 0.2).abs() < 1e-3, "x1={}", m.x[1]);
    }

    #[test]
    fn respects_bounds_when_minimum_is_outside() {
        let nm = NelderMead::default();
        let mut seen_outside = false;
        let f = |x: &DVector<f64>| {
            if x[0] < 0.0 || x[0] > 1.0 {
                seen_outside = true;
            }
            (x[0] - 5.0).powi(2)
        };
        let m = nm.minimize(f, &v(&[0.5]), &v(&[0.0]), &v(&[1.0]));
        assert!(!seen_outside);
        assert!(m.x[0] <= 1.0 && m.x[0] > 0.99);
    }

    #[test]
    fn stops_at_budget() {
        let nm = NelderMead { max_evals: 10, f_tol: 0.0, x_tol: 0.0, ..NelderMead::default() };
        let m = nm.minimize(|x: &DVector<f64>| x[0].sin(), &v(&[0.5]), &v(&[0.0]), &v(&[100.0]));
        assert!(m.evaluations <= 10 + 2);
        assert!(m.x[0] >= 0.0 && m.x[0] <= 100.0);
    }

    #[test]
    fn zero_width_box_converges_immediately() {
        let nm = NelderMead::default();
        let m = nm.minimize(|x: &DVector<f64>| x[0] + 1.0, &v(&[3.0]), &v(&[0.0]), &v(&[0.0]));
        assert!(m.converged);
        assert_eq!(m.x[0], 0.0);
        assert_eq!(m.fun, 1.0);
    }

    #[test]
    fn nan_objective_is_treated_as_worst() {
        let nm = NelderMead::default();
        let f = |x: &DVector<f64>| if x[0] > 0.5 { f64::NAN } else { (x[0] - 0.25).powi(2) };
        let m = nm.minimize(f, &v(&[0.5]), &v(&[0.0]), &v(&[1.0]));
        assert!(m.fun.is_finite());
        assert!(m.x[0] <= 0.5);
    }

    #[test]
    fn restart_reaches_minimum_on_a_bound_face() {
        let nm = NelderMead { max_evals: 3000, ..NelderMead::default() };
        let f = |x: &DVector<f64>| (x[0] - 0.3).powi(2) + x[1] + 0.5 * (x[2] - 0.6).powi(2);
        let m = nm.minimize(
            f,
            &v(&[0.5, 0.5, 0.5]),
            &v(&[0.0, 0.0, 0.0]),
            &v(&[1.0, 1.0, 1.0]),
        );
        assert!(m.x[1] < 1e-6, "x1={}", m.x[1]);
        assert!((m.x[0] - 0.3).abs() < 1e-3, "x0={}", m.x[0]);
        assert!((m.x[2] - 0.6).abs() < 1e-3, "x2={}", m.x[2]);
        assert!(m.evaluations <= nm.max_evals + 4);
    }

    #[test]
    fn restarts_share_the_budget() {
        let nm = NelderMead { max_evals: 40, ..NelderMead::default() };
        let mut calls = 0;
        let f = |x: &DVector<f64>| {
            calls += 1;
            (x[0] - 0.1).abs() + (x[1] - 0.9).abs()
        };
        let m = nm.minimize(f, &v(&[0.5, 0.5]), &v(&[0.0, 0.0]), &v(&[1.0, 1.0]));
        assert_eq!(m.evaluations, calls);
        assert!(calls <= 40 + 3);
    }
}
