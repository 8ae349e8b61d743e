//! HTTP-based distance oracles for routing services.
//!
//! This module provides [`HttpDistanceOracle`], an implementation of
//! [`courier_core::DistanceOracle`] that reads road distances from an OSRM
//! routing service.
//!
//! Wrap it in [`courier_core::WithFallback`] so that an unreachable service
//! degrades to great-circle distance instead of failing validation.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use courier_core::{Haversine, WithFallback};
//! use courier_data::routing::{HttpDistanceOracle, HttpDistanceOracleConfig};
//!
//! let config = HttpDistanceOracleConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("dispatch/1.0");
//! let oracle = WithFallback::new(
//!     HttpDistanceOracle::with_config(config)?,
//!     Haversine::default(),
//! );
//! # Ok::<(), courier_data::routing::OracleBuildError>(())
//! ```

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_PROFILE, DEFAULT_USER_AGENT, HttpDistanceOracle, HttpDistanceOracleConfig,
    OracleBuildError,
};
