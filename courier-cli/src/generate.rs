//! `generate` command: bulk-create deliveries from a route plan.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::Parser;
use courier_core::{
    DeliveryScheduler, EngineConfig, GenerationReport, GenerationRequest, StoreSnapshot, UserId,
    generate_deliveries,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;
use crate::json::{load_json, require_existing, save_json, write_json};
use crate::{
    ARG_OSRM_BASE_URL, ARG_PLAN, ARG_SNAPSHOT_OUT, ARG_TODAY, CliError, ENV_GENERATE_PLAN,
};

/// CLI arguments for the `generate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Create deliveries for every route in a JSON plan, assigning \
                 couriers and vehicles round-robin and reporting routes that \
                 could not be scheduled.",
    about = "Generate deliveries from a route plan"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct GenerateArgs {
    /// Path to a JSON generation plan.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) plan: Option<Utf8PathBuf>,
    /// Write the resulting store snapshot to this path.
    #[arg(long = ARG_SNAPSHOT_OUT, value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot_out: Option<Utf8PathBuf>,
    /// Base URL for an OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Date to treat as today (YYYY-MM-DD).
    #[arg(long = ARG_TODAY, value_name = "date")]
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

/// Contents of a generation plan file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerationPlan {
    /// Existing users, vehicles, products and deliveries.
    #[serde(default)]
    pub(crate) snapshot: StoreSnapshot,
    /// User recorded as the creator of generated deliveries.
    pub(crate) created_by: UserId,
    /// Engine settings.
    #[serde(default)]
    pub(crate) config: EngineConfig,
    /// Routes keyed by date.
    #[serde(flatten)]
    pub(crate) request: GenerationRequest,
}

/// Resolved `generate` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GenerateConfig {
    pub(crate) plan: Utf8PathBuf,
    pub(crate) snapshot_out: Option<Utf8PathBuf>,
    pub(crate) engine: EngineOptions,
}

impl GenerateArgs {
    fn into_config(self) -> Result<GenerateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GenerateConfig::try_from(merged)
    }
}

impl TryFrom<GenerateArgs> for GenerateConfig {
    type Error = CliError;

    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        let plan = args.plan.ok_or(CliError::MissingArgument {
            field: ARG_PLAN,
            env: ENV_GENERATE_PLAN,
        })?;
        Ok(Self {
            plan,
            snapshot_out: args.snapshot_out,
            engine: EngineOptions {
                osrm_base_url: args.osrm_base_url,
                today: args.today,
            },
        })
    }
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_generate_with(args, &mut stdout)
}

pub(crate) fn run_generate_with(
    args: GenerateArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let report = execute_generate(&config)?;
    write_json(writer, &report)
}

pub(crate) fn execute_generate(config: &GenerateConfig) -> Result<GenerationReport, CliError> {
    require_existing(&config.plan, ARG_PLAN)?;
    let plan: GenerationPlan = load_json(&config.plan)?;
    let validator = config.engine.validator(plan.snapshot, plan.config)?;
    let scheduler = DeliveryScheduler::new(validator);
    let report = generate_deliveries(&scheduler, plan.created_by, &plan.request)?;
    if let Some(path) = &config.snapshot_out {
        let snapshot = scheduler.validator().store().snapshot()?;
        save_json(path, &snapshot)?;
    }
    Ok(report)
}
