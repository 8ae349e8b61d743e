//! OSRM API response types for the Route service.
//!
//! Only the fields needed to read the driving distance are modelled.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"NoRoute"` - No route between the coordinates
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Alternative routes, best first.
    pub routes: Option<Vec<RouteLeg>>,
}

/// One route returned by OSRM.
#[derive(Debug, Deserialize)]
pub struct RouteLeg {
    /// Driving distance in metres.
    pub distance: f64,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Distance of the best route in metres, if any route was returned.
    #[must_use]
    pub fn best_distance_metres(&self) -> Option<f64> {
        self.routes
            .as_deref()
            .and_then(<[RouteLeg]>::first)
            .map(|route| route.distance)
    }
}
