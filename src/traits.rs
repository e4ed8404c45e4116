//! Collaborator seams for trip planning.
//!
//! The HOS engine itself never calls these; they describe the shape of the
//! data that the planning pipeline feeds into it. Concrete apps can plug in
//! their own geocoder or directions service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A resolved trip location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPoint {
    pub lat: f64,
    pub lng: f64,
    pub label: String,
}

impl TripPoint {
    pub fn new(lat: f64, lng: f64, label: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            label: label.into(),
        }
    }

    /// (lat, lng) pair.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// One human-readable routing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInstruction {
    pub instruction: String,
    pub distance_miles: f64,
    pub duration_minutes: f64,
}

/// A single start -> end leg from a directions provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_miles: f64,
    pub duration_hours: f64,
    /// Route geometry as (lat, lng) points.
    pub coordinates: Vec<(f64, f64)>,
    pub instructions: Vec<RouteInstruction>,
    pub start_name: String,
    pub end_name: String,
}

/// Broad failure categories callers map to user-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    Timeout,
    /// Provider answered with a 4xx.
    ProviderRejected,
    /// Provider answered with a 5xx.
    ProviderUnavailable,
    Transport,
    /// Inputs were valid but no compliant plan exists.
    Infeasible,
}

/// Failure talking to a geocoding or directions provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} API key is missing")]
    MissingApiKey(&'static str),
    #[error("request timed out while contacting the provider")]
    Timeout,
    #[error("provider request failed with status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    #[error("no drivable route found between the selected locations{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    NoRoute(Option<String>),
    #[error("provider returned no route results")]
    EmptyResponse,
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("provider request failed: {0}")]
    Transport(reqwest::Error),
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::InvalidLocation(_) | ProviderError::NoRoute(_) => {
                FailureKind::InvalidInput
            }
            ProviderError::Timeout => FailureKind::Timeout,
            ProviderError::Status { status, .. } if *status >= 500 => {
                FailureKind::ProviderUnavailable
            }
            ProviderError::Status { .. } => FailureKind::ProviderRejected,
            ProviderError::MissingApiKey(_) | ProviderError::EmptyResponse => {
                FailureKind::ProviderUnavailable
            }
            ProviderError::Transport(_) => FailureKind::Transport,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if let Some(status) = err.status() {
            ProviderError::Status {
                status: status.as_u16(),
                message: None,
            }
        } else {
            ProviderError::Transport(err)
        }
    }
}

/// Resolves free-text locations to coordinates.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> Result<TripPoint, ProviderError>;
}

/// Supplies a drivable route between two (lat, lng) points.
pub trait RouteProvider {
    fn route_between(&self, from: (f64, f64), to: (f64, f64)) -> Result<RouteLeg, ProviderError>;
}
