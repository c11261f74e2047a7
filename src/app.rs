//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - reads measured series
//! - runs scenario fitting + selection
//! - prints reports/plots
//! - writes optional exports

use std::io::Write;
use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, FitArgs, ParamArgs, PlotArgs, SampleArgs, SimulateArgs};
use crate::domain::{FitConfig, ModelParameters};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `an` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    crate::logging::init();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Sample(args) => handle_sample(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let growth = crate::io::read_series_csv(&args.growth)?;
    let nongrowth = crate::io::read_series_csv(&args.nongrowth)?;
    let fixed = if args.params.any() {
        Some(params_from_args(&args.params)?)
    } else {
        None
    };

    let output = pipeline::run_an_model(&growth, &nongrowth, fixed, &config)?;
    println!("{}", crate::report::format_run_summary(&output));

    if args.plot {
        println!(
            "{}",
            crate::plot::render_ascii_plot(&output, args.size.width, args.size.height)
        );
    }

    if let Some(path) = &args.export {
        crate::io::write_result_json(path, &output)?;
    }
    if let Some(path) = &args.export_table {
        crate::io::write_table_csv(path, &output.table)?;
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    check_growth_rate(args.gdot)?;
    let params = params_from_args(&args.params)?;
    if args.cycles > crate::math::MAX_HORIZON {
        return Err(AppError::invalid_input(format!(
            "--cycles must be at most {} (got {}).",
            crate::math::MAX_HORIZON,
            args.cycles
        )));
    }
    let table = crate::models::simulate(args.gdot, &params, args.cycles);

    println!("{}", crate::report::format_table_summary(args.gdot, &params, &table));
    if let Some(path) = &args.export_table {
        crate::io::write_table_csv(path, &table)?;
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let request = crate::data::SampleRequest {
        gdot: args.gdot,
        params: params_from_args(&args.params)?,
        cycles: args.cycles.clone(),
        noise: args.noise,
        seed: args.seed,
    };
    let series = crate::data::generate_sample(&request)?;

    match &args.output {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| {
                AppError::io(format!("Failed to create sample CSV '{}': {e}", path.display()))
            })?;
            crate::io::write_series_csv(file, &series)
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            crate::io::write_series_csv(&mut lock, &series)?;
            lock.flush()
                .map_err(|e| AppError::io(format!("Failed to write sample CSV: {e}")))
        }
    }
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let result = crate::io::read_result_json(&args.result)?;
    println!(
        "{}",
        crate::plot::render_ascii_plot(&result.output, args.size.width, args.size.height)
    );
    Ok(())
}

/// Build the fit configuration from CLI flags / environment.
pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    if args.max_evals == 0 {
        return Err(AppError::invalid_input("--max-evals must be at least 1."));
    }
    for (name, v) in [("--f-tol", args.f_tol), ("--x-tol", args.x_tol), ("--zero-tol", args.zero_tol)] {
        if !(v.is_finite() && v >= 0.0) {
            return Err(AppError::invalid_input(format!("{name} must be finite and >= 0 (got {v}).")));
        }
    }
    let deadline = args
        .deadline_secs
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| {
                AppError::invalid_input(format!("--deadline-secs must be finite and >= 0 (got {secs})."))
            })
        })
        .transpose()?;

    Ok(FitConfig {
        max_evals: args.max_evals,
        f_tol: args.f_tol,
        x_tol: args.x_tol,
        zero_tol: args.zero_tol,
        parallel: !args.sequential,
        deadline,
    })
}

/// Parameters from flags; omitted ones are 0.
pub fn params_from_args(args: &ParamArgs) -> Result<ModelParameters, AppError> {
    ModelParameters::new(
        args.nhat.unwrap_or(0.0),
        args.ndot0.unwrap_or(0.0),
        args.td.unwrap_or(0),
    )
}

fn check_growth_rate(gdot: f64) -> Result<(), AppError> {
    if gdot.is_finite() && gdot >= 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "Growth rate must be finite and >= 0 (got {gdot})."
        )))
    }
}
