//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{AnOutput, ModelParameters, StateTable};

/// Format the full run summary (inputs + per-scenario diagnostics + chosen scenario).
pub fn format_run_summary(output: &AnOutput) -> String {
    let mut out = String::new();

    out.push_str("=== an - AN-model fit ===\n");
    out.push_str(&format!(
        "Growth: n={} | gdot={:.6} per cycle\n",
        output.growth.len(),
        output.gdot
    ));
    out.push_str(&format!(
        "Non-growth: n={} | simulated cycles=0..{}\n",
        output.nongrowth.len(),
        output.rmax.saturating_sub(1)
    ));

    out.push_str("\nScenario diagnostics:\n");
    out.push_str(&scenario_table(output));
    for name in &output.skipped {
        out.push_str(&format!("  (skipped {name}) deadline passed\n"));
    }

    out.push_str("\nChosen scenario:\n");
    out.push_str(&format!("- {}\n", output.best_scenario));
    out.push_str(&format!("- {}\n", fmt_params(&output.best_params)));
    out.push_str(&format!("- RMSE: {:.6}\n", output.best_rmse));
    if output.all_degenerate {
        out.push_str(
            "WARNING: every scenario fitted a parameter to ~0; chosen by RMSE alone.\n",
        );
    }
    out.push_str(&format!("Elapsed: {:.3}s\n", output.computation_time));

    out
}

/// One-screen summary of a forward simulation.
pub fn format_table_summary(gdot: f64, params: &ModelParameters, table: &StateTable) -> String {
    let mut out = String::new();
    out.push_str("=== an - forward model ===\n");
    out.push_str(&format!("gdot={gdot:.6} | {}\n", fmt_params(params)));
    out.push_str(&format!("cycles: {}\n", table.len()));

    let Some(last) = table.len().checked_sub(1) else {
        return out;
    };
    out.push_str(
        format!(
            "{:>8} {:>12} {:>12} {:>10} {:>10} {:>12}\n",
            "cycle", "h_growth", "h_nongrowth", "sel", "coverage", "density"
        )
        .trim_end(),
    );
    out.push('\n');

    let step = (table.len() / 10).max(1);
    let mut rows: Vec<usize> = (0..table.len()).step_by(step).collect();
    if rows.last() != Some(&last) {
        rows.push(last);
    }
    for t in rows {
        out.push_str(&format!(
            "{:>8.0} {:>12.4} {:>12.4} {:>10.4} {:>10.4} {:>12.6}\n",
            table.cycle[t],
            table.growth_thickness[t],
            table.nongrowth_thickness[t],
            table.selectivity[t],
            table.coverage[t],
            table.nucleation_density[t],
        ));
    }
    out
}

fn scenario_table(output: &AnOutput) -> String {
    let mut out = String::new();
    for s in &output.all_scenarios {
        let chosen = if s.name == output.best_scenario { "*" } else { " " };
        out.push_str(
            format!(
                "{chosen} {:<18} RMSE={:<12.6} nhat={:<10.3e} ndot0={:<10.3e} td={:<4} evals={}\n",
                s.name, s.rmse, s.nhat, s.ndot0, s.td, s.evaluations
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn fmt_params(p: &ModelParameters) -> String {
    format!("nhat={:.6e} ndot0={:.6e} td={}", p.nhat, p.ndot0, p.td)
}
