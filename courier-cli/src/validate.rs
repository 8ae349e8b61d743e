//! `validate` command: check one candidate against a store snapshot.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::Parser;
use courier_core::{CandidateDelivery, DeliveryId, EngineConfig, StoreSnapshot, ValidationResult};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;
use crate::json::{load_json, require_existing, write_json};
use crate::{ARG_OSRM_BASE_URL, ARG_SCENARIO, ARG_TODAY, CliError, ENV_VALIDATE_SCENARIO};

/// CLI arguments for the `validate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Validate a proposed delivery against a JSON scenario holding \
                 a store snapshot, the candidate and, for edits, the id of \
                 the delivery being replaced.",
    about = "Check whether a delivery can be scheduled"
)]
#[ortho_config(prefix = "COURIER")]
pub(crate) struct ValidateArgs {
    /// Path to a JSON validation scenario.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) scenario: Option<Utf8PathBuf>,
    /// Base URL for an OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Date to treat as today (YYYY-MM-DD).
    #[arg(long = ARG_TODAY, value_name = "date")]
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

/// Contents of a validation scenario file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ValidationScenario {
    /// Existing users, vehicles, products and deliveries.
    #[serde(default)]
    pub(crate) snapshot: StoreSnapshot,
    /// Delivery to check.
    pub(crate) candidate: CandidateDelivery,
    /// Delivery being edited, if this is an update.
    #[serde(default)]
    pub(crate) update_of: Option<DeliveryId>,
    /// Engine settings.
    #[serde(default)]
    pub(crate) config: EngineConfig,
}

/// Resolved `validate` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidateConfig {
    pub(crate) scenario: Utf8PathBuf,
    pub(crate) engine: EngineOptions,
}

impl ValidateArgs {
    fn into_config(self) -> Result<ValidateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ValidateConfig::try_from(merged)
    }
}

impl TryFrom<ValidateArgs> for ValidateConfig {
    type Error = CliError;

    fn try_from(args: ValidateArgs) -> Result<Self, Self::Error> {
        let scenario = args.scenario.ok_or(CliError::MissingArgument {
            field: ARG_SCENARIO,
            env: ENV_VALIDATE_SCENARIO,
        })?;
        Ok(Self {
            scenario,
            engine: EngineOptions {
                osrm_base_url: args.osrm_base_url,
                today: args.today,
            },
        })
    }
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_validate_with(args, &mut stdout)
}

pub(crate) fn run_validate_with(
    args: ValidateArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let result = execute_validate(&config)?;
    write_json(writer, &result)
}

pub(crate) fn execute_validate(config: &ValidateConfig) -> Result<ValidationResult, CliError> {
    require_existing(&config.scenario, ARG_SCENARIO)?;
    let scenario: ValidationScenario = load_json(&config.scenario)?;
    let validator = config
        .engine
        .validator(scenario.snapshot, scenario.config)?;
    let result = match scenario.update_of {
        Some(id) => validator.validate_update(id, &scenario.candidate)?,
        None => validator.validate_create(&scenario.candidate)?,
    };
    Ok(result)
}
