//! `estimate` command: distance, duration and a suggested slot for a route.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::{NaiveTime, Utc};
use clap::Parser;
use courier_core::{Coordinate, EngineConfig, RouteEstimate, estimate_route};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;
use crate::json::{load_json, require_existing, write_json};
use crate::{ARG_OSRM_BASE_URL, ARG_POINTS, CliError, ENV_ESTIMATE_POINTS};

/// CLI arguments for the `estimate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Estimate the length and duration of a route through the \
                 points in a JSON file and suggest a delivery slot.",
    about = "Estimate a route"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct EstimateArgs {
    /// Path to a JSON file listing route points.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) points: Option<Utf8PathBuf>,
    /// Base URL for an OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
}

/// Contents of a route points file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EstimateInput {
    /// Points in travel order.
    pub(crate) points: Vec<Coordinate>,
    /// Start of the suggested slot; the current UTC time when absent.
    #[serde(default)]
    pub(crate) start: Option<NaiveTime>,
    /// Engine settings.
    #[serde(default)]
    pub(crate) config: EngineConfig,
}

/// Resolved `estimate` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EstimateConfig {
    pub(crate) points: Utf8PathBuf,
    pub(crate) engine: EngineOptions,
}

impl EstimateArgs {
    fn into_config(self) -> Result<EstimateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        EstimateConfig::try_from(merged)
    }
}

impl TryFrom<EstimateArgs> for EstimateConfig {
    type Error = CliError;

    fn try_from(args: EstimateArgs) -> Result<Self, Self::Error> {
        let points = args.points.ok_or(CliError::MissingArgument {
            field: ARG_POINTS,
            env: ENV_ESTIMATE_POINTS,
        })?;
        Ok(Self {
            points,
            engine: EngineOptions {
                osrm_base_url: args.osrm_base_url,
                today: None,
            },
        })
    }
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_estimate_with(args, &mut stdout)
}

pub(crate) fn run_estimate_with(
    args: EstimateArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let estimate = execute_estimate(&config)?;
    write_json(writer, &estimate)
}

pub(crate) fn execute_estimate(config: &EstimateConfig) -> Result<RouteEstimate, CliError> {
    require_existing(&config.points, ARG_POINTS)?;
    let input: EstimateInput = load_json(&config.points)?;
    input.config.validate()?;
    let oracle = config.engine.oracle(&input.config)?;
    let start = input.start.unwrap_or_else(|| Utc::now().time());
    Ok(estimate_route(&input.points, oracle, &input.config, start))
}
