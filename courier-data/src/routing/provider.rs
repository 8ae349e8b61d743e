//! HTTP-based `DistanceOracle` using OSRM's Route API.
//!
//! The [`DistanceOracle`] trait is synchronous so that the validator can be
//! embedded anywhere. This oracle bridges the async HTTP call to the sync
//! interface by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use courier_core::{Coordinate, DistanceOracle};
//! use courier_data::routing::HttpDistanceOracle;
//! use rust_decimal::Decimal;
//!
//! let oracle = HttpDistanceOracle::new("http://localhost:5000")?;
//! let moscow = Coordinate::new(Decimal::new(557_558, 4), Decimal::new(376_173, 4))?;
//! let tver = Coordinate::new(Decimal::new(568_587, 4), Decimal::new(359_176, 4))?;
//!
//! let km = oracle.distance_km(&moscow, &tver)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use courier_core::{Coordinate, DISTANCE_SCALE, DistanceError, DistanceOracle};
use reqwest::Client;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::osrm::RouteResponse;

/// Error type for [`HttpDistanceOracle`] construction failures.
#[derive(Debug, Error)]
pub enum OracleBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "courier-routing/0.1";

/// Default OSRM routing profile.
pub const DEFAULT_PROFILE: &str = "driving";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const METRES_PER_KM: Decimal = Decimal::ONE_THOUSAND;

/// Configuration for [`HttpDistanceOracle`].
#[derive(Debug, Clone)]
pub struct HttpDistanceOracleConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// OSRM profile segment of the request path.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpDistanceOracleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpDistanceOracleConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Road distance from an OSRM routing service.
///
/// The oracle owns a Tokio runtime that is reused across calls.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the stored runtime is used. Inside a
/// multi-threaded runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]) the caller's handle is used with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime the
/// oracle falls back to its own runtime, which may deadlock if the caller's
/// runtime drives IO this request depends on.
pub struct HttpDistanceOracle {
    client: Client,
    config: HttpDistanceOracleConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpDistanceOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDistanceOracle")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpDistanceOracle {
    /// Create an oracle with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, OracleBuildError> {
        Self::with_config(HttpDistanceOracleConfig::new(base_url))
    }

    /// Create an oracle with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpDistanceOracleConfig) -> Result<Self, OracleBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(OracleBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(OracleBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpDistanceOracleConfig {
        &self.config
    }

    /// Build the OSRM Route API URL between two coordinates.
    ///
    /// The URL format is
    /// `{base_url}/route/v1/{profile}/{lon},{lat};{lon},{lat}?overview=false`.
    fn build_route_url(&self, from: &Coordinate, to: &Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=false",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            from.longitude(),
            from.latitude(),
            to.longitude(),
            to.latitude(),
        )
    }

    async fn fetch_distance_async(
        &self,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Result<Decimal, DistanceError> {
        let url = self.build_route_url(from, to);
        log::debug!("requesting route distance from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let route: RouteResponse =
            response
                .json()
                .await
                .map_err(|err| DistanceError::ParseError {
                    message: err.to_string(),
                })?;

        convert_response(route)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> DistanceError {
        if error.is_timeout() {
            return DistanceError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return DistanceError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        DistanceError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Convert an OSRM response to a distance in kilometres.
fn convert_response(response: RouteResponse) -> Result<Decimal, DistanceError> {
    if response.code == "NoRoute" {
        return Err(DistanceError::NoRoute);
    }
    if !response.is_ok() {
        return Err(DistanceError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let metres = response
        .best_distance_metres()
        .ok_or(DistanceError::NoRoute)?;
    metres_to_km(metres)
}

fn metres_to_km(metres: f64) -> Result<Decimal, DistanceError> {
    Decimal::from_f64_retain(metres)
        .filter(|value| !value.is_sign_negative())
        .and_then(|value| value.checked_div(METRES_PER_KM))
        .map(|km| km.round_dp(DISTANCE_SCALE))
        .ok_or_else(|| DistanceError::ParseError {
            message: format!("invalid route distance {metres}"),
        })
}

impl DistanceOracle for HttpDistanceOracle {
    /// Fetch the driving distance between two coordinates.
    ///
    /// # Runtime requirements
    ///
    /// Inside an existing Tokio runtime, the runtime must be multi-threaded.
    /// Inside a `current_thread` runtime the call blocks that runtime.
    fn distance_km(&self, a: &Coordinate, b: &Coordinate) -> Result<Decimal, DistanceError> {
        let future = self.fetch_distance_async(a, b);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
