//! Command-line interface for the courier feasibility engine.
//!
//! Every command reads a JSON document, runs the engine over an in-memory
//! store seeded from it and prints pretty JSON to standard output.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod engine;
mod error;
mod estimate;
mod fs;
mod generate;
mod json;
mod validate;

pub use error::CliError;

use estimate::{EstimateArgs, run_estimate};
use generate::{GenerateArgs, run_generate};
use validate::{ValidateArgs, run_validate};

const ARG_SCENARIO: &str = "scenario";
const ARG_PLAN: &str = "plan";
const ARG_POINTS: &str = "points";
const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_TODAY: &str = "today";
const ARG_SNAPSHOT_OUT: &str = "snapshot-out";
const ENV_VALIDATE_SCENARIO: &str = "COURIER_CMDS_VALIDATE_SCENARIO";
const ENV_GENERATE_PLAN: &str = "COURIER_CMDS_GENERATE_PLAN";
const ENV_ESTIMATE_POINTS: &str = "COURIER_CMDS_ESTIMATE_POINTS";

/// Run the courier CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments, configuration or inputs are invalid,
/// or when the engine's store fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Generate(args) => run_generate(args),
        Command::Estimate(args) => run_estimate(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "courier",
    about = "Delivery feasibility checks and bulk scheduling",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether a delivery can be scheduled.
    Validate(ValidateArgs),
    /// Generate deliveries from a route plan.
    Generate(GenerateArgs),
    /// Estimate a route's distance and duration.
    Estimate(EstimateArgs),
}

#[cfg(test)]
mod tests;
