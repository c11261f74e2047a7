//! Integration tests: full `run_an_model` runs through the public API.

use asd_an_model::data::{SampleRequest, generate_sample};
use asd_an_model::domain::{FitConfig, ModelParameters, SampleSeries};
use asd_an_model::error::ErrorKind;
use asd_an_model::run_an_model;

fn series(pairs: &[(f64, f64)]) -> SampleSeries {
    SampleSeries::from_pairs(pairs).unwrap()
}

fn linear_growth() -> SampleSeries {
    series(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)])
}

#[test]
fn small_dataset_fits_end_to_end() {
    let nongrowth = series(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.1), (3.0, 0.3)]);
    let out = run_an_model(&linear_growth(), &nongrowth, None, &FitConfig::default()).unwrap();

    assert_eq!(out.gdot, 1.0);
    assert_eq!(out.rmax, 5);
    assert_eq!(out.table.len(), 5);
    assert_eq!(out.model_x, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(out.model_growth_y, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    assert!(out.best_rmse.is_finite() && out.best_rmse >= 0.0);
    assert!(out.table.is_finite());
    assert_eq!(out.all_scenarios.len(), 5);
    assert!(out.skipped.is_empty());
}

#[test]
fn single_nongrowth_point_does_not_fail() {
    let nongrowth = series(&[(0.0, 0.0)]);
    let out = run_an_model(&linear_growth(), &nongrowth, None, &FitConfig::default()).unwrap();

    assert_eq!(out.rmax, 1);
    let modeled = out.table.nongrowth_thickness[0];
    assert_eq!(out.best_rmse, (0.0 - modeled).abs());
}

#[test]
fn custom_parameters_bypass_search() {
    let nongrowth = series(&[(0.0, 0.0), (2.0, 0.1), (4.0, 0.5)]);
    let params = ModelParameters::new(0.03, 0.01, 1).unwrap();
    let out = run_an_model(&linear_growth(), &nongrowth, Some(params), &FitConfig::default()).unwrap();

    assert_eq!(out.best_scenario, "custom");
    assert_eq!(out.best_params, params);
    assert_eq!(out.all_scenarios.len(), 1);
    assert!(out.scenario("custom").is_some());
    assert!(!out.all_degenerate);
}

#[test]
fn synthetic_areal_data_is_recovered() {
    let truth = ModelParameters::new(0.005, 0.0, 0).unwrap();
    let nongrowth = generate_sample(&SampleRequest {
        gdot: 1.0,
        params: truth,
        cycles: (0..=6u32).map(|i| f64::from(i) * 5.0).collect(),
        noise: 0.0,
        seed: 1,
    })
    .unwrap();
    let growth = series(&[(0.0, 0.0), (30.0, 30.0)]);

    let out = run_an_model(&growth, &nongrowth, None, &FitConfig::default()).unwrap();

    let areal = out.scenario("nhat only").unwrap();
    assert!(areal.rmse < 1e-2, "nhat only rmse={}", areal.rmse);
    assert!((areal.nhat - 0.005).abs() < 5e-4, "nhat={}", areal.nhat);
    if !out.all_degenerate {
        assert!(out.best_rmse <= areal.rmse);
    }
}

#[test]
fn nested_scenarios_never_score_worse() {
    let nongrowth = series(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.1), (3.0, 0.3)]);
    let config = FitConfig { max_evals: 2000, ..FitConfig::default() };
    let out = run_an_model(&linear_growth(), &nongrowth, None, &config).unwrap();
    let rmse = |name: &str| out.scenario(name).unwrap().rmse;

    assert!(rmse("nhat + ndot0 + td") <= rmse("nhat only") + 1e-9);
    assert!(rmse("ndot0 and td") <= rmse("ndot0 only") + 1e-9);
    assert!(rmse("nhat and ndot0") <= rmse("nhat only") + 1e-9);
}

#[test]
fn overflowing_growth_rate_gives_finite_output() {
    let growth = series(&[(0.0, 0.0), (1.0, 1e200)]);
    let nongrowth = series(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.1), (3.0, 0.3)]);
    let out = run_an_model(&growth, &nongrowth, None, &FitConfig::default()).unwrap();

    assert!(out.best_rmse.is_finite());
    assert!(out.table.is_finite());
    assert_eq!(out.all_scenarios.len(), 5);
    for s in &out.all_scenarios {
        assert!(s.rmse.is_finite(), "{} rmse={}", s.name, s.rmse);
        assert!(s.model_nongrowth_y.iter().all(|v| v.is_finite()));
        assert!(s.model_growth_y.iter().all(|v| v.is_finite()));
    }
    assert!(out.model_nongrowth_y.iter().all(|v| v.is_finite()));
}

#[test]
fn huge_cycle_number_is_rejected() {
    let nongrowth = series(&[(0.0, 0.0), (1e30, 1.0)]);
    let err = run_an_model(&linear_growth(), &nongrowth, None, &FitConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn insufficient_data_is_an_error() {
    let nongrowth = series(&[(0.0, 0.0)]);

    let err = run_an_model(&series(&[(0.0, 0.0)]), &nongrowth, None, &FitConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);

    let err = run_an_model(&linear_growth(), &SampleSeries::default(), None, &FitConfig::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
    assert_eq!(err.exit_code(), 3);
}
