//! Shared test harness modules for the courier CLI.

use super::*;

mod estimate_unit;
mod helpers;
