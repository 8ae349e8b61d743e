//! Focused unit tests covering the estimate command.

use super::helpers::Workspace;
use super::*;
use crate::engine::EngineOptions;
use crate::estimate::{EstimateConfig, execute_estimate};
use courier_core::test_support::{coordinate, depot, time};
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::json;

fn config_for(points: camino::Utf8PathBuf) -> EstimateConfig {
    EstimateConfig {
        points,
        engine: EngineOptions::default(),
    }
}

#[rstest]
fn converting_without_points_errors() {
    let err = EstimateConfig::try_from(EstimateArgs::default())
        .expect_err("missing points should error");

    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_POINTS);
            assert_eq!(env, ENV_ESTIMATE_POINTS);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn route_through_two_points_suggests_a_slot() {
    let workspace = Workspace::new();
    let north = coordinate(Decimal::new(558_558, 4), Decimal::new(376_173, 4));
    let path = workspace.write_json(
        "points.json",
        &json!({ "points": [depot(), north], "start": "09:00:00" }),
    );

    let estimate = execute_estimate(&config_for(path)).expect("estimate runs");

    assert!(estimate.distance_km > Decimal::from(11));
    assert!(estimate.distance_km < Decimal::from(12));
    let slot = estimate.suggested.expect("slot suggested");
    assert_eq!(slot.start, time(9, 0));
    assert_eq!(slot.end, time(9, 0) + chrono::TimeDelta::minutes(estimate.duration_minutes));
}

#[rstest]
fn single_point_has_no_estimate() {
    let workspace = Workspace::new();
    let path = workspace.write_json("points.json", &json!({ "points": [depot()] }));

    let estimate = execute_estimate(&config_for(path)).expect("estimate runs");

    assert_eq!(estimate.distance_km, Decimal::ZERO);
    assert_eq!(estimate.duration_minutes, 0);
    assert!(estimate.suggested.is_none());
}
