//! HTTP adapter for OSRM-compatible directions endpoints.
//!
//! Works against LocationIQ's hosted directions API or a self-hosted OSRM
//! backend; both answer the same `route/v1` response shape.

use std::env;
use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::report::round_to;
use crate::traits::{ProviderError, RouteInstruction, RouteLeg, RouteProvider};

const METERS_TO_MILES: f64 = 0.000621371;

const CLIENT_USER_AGENT: &str = concat!("hos-planner/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionsProvider {
    LocationIq,
    Osrm,
}

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub provider: DirectionsProvider,
    pub base_url: String,
    /// Path between the base URL and the coordinate list.
    pub path: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self::location_iq("us", None)
    }
}

impl DirectionsConfig {
    pub fn location_iq(region: &str, api_key: Option<String>) -> Self {
        Self {
            provider: DirectionsProvider::LocationIq,
            base_url: format!("https://{region}1.locationiq.com"),
            path: "v1/directions/driving".to_string(),
            api_key,
            timeout_secs: 12,
        }
    }

    pub fn osrm(base_url: impl Into<String>, profile: &str) -> Self {
        Self {
            provider: DirectionsProvider::Osrm,
            base_url: base_url.into(),
            path: format!("route/v1/{profile}"),
            api_key: None,
            timeout_secs: 10,
        }
    }

    /// `OSRM_URL` (and optional `OSRM_PROFILE`) selects a self-hosted OSRM;
    /// otherwise LocationIQ with `LOCATIONIQ_REGION` / `LOCATIONIQ_API_KEY`.
    pub fn from_env() -> Self {
        if let Ok(base_url) = env::var("OSRM_URL") {
            let profile = env::var("OSRM_PROFILE").unwrap_or_else(|_| "driving".to_string());
            return Self::osrm(base_url, &profile);
        }

        let region = env::var("LOCATIONIQ_REGION").unwrap_or_else(|_| "us".to_string());
        let api_key = env::var("LOCATIONIQ_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self::location_iq(&region, api_key)
    }
}

#[derive(Debug, Clone)]
pub struct DirectionsClient {
    config: DirectionsConfig,
    client: reqwest::blocking::Client,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &DirectionsConfig {
        &self.config
    }

    fn route_url(&self, from: (f64, f64), to: (f64, f64)) -> String {
        format!(
            "{}/{}/{:.6},{:.6};{:.6},{:.6}",
            self.config.base_url.trim_end_matches('/'),
            self.config.path,
            from.1,
            from.0,
            to.1,
            to.0
        )
    }
}

impl RouteProvider for DirectionsClient {
    fn route_between(&self, from: (f64, f64), to: (f64, f64)) -> Result<RouteLeg, ProviderError> {
        let mut params = vec![
            ("steps", "true"),
            ("overview", "full"),
            ("geometries", "geojson"),
            ("alternatives", "false"),
        ];
        if self.config.provider == DirectionsProvider::LocationIq {
            let key = self
                .config
                .api_key
                .as_deref()
                .ok_or(ProviderError::MissingApiKey("LocationIQ"))?;
            params.push(("key", key));
        }

        let url = self.route_url(from, to);
        debug!(%url, "requesting route");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let message = response
                .json::<ProviderMessage>()
                .ok()
                .and_then(|body| body.error.or(body.message));
            warn!(status = status.as_u16(), ?message, "directions request failed");
            if status.as_u16() == 400 {
                return Err(ProviderError::NoRoute(message));
            }
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<DirectionsResponse>()?;
        leg_from_response(body)
    }
}

#[derive(Debug, Deserialize)]
struct ProviderMessage {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<RouteBody>,
    #[serde(default)]
    waypoints: Vec<Waypoint>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    geometry: Geometry,
    #[serde(default)]
    legs: Vec<LegBody>,
    #[serde(default)]
    waypoints: Vec<Waypoint>,
}

/// GeoJSON line; coordinates are [lng, lat].
#[derive(Debug, Default, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct LegBody {
    #[serde(default)]
    steps: Vec<StepBody>,
}

#[derive(Debug, Deserialize)]
struct StepBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    maneuver: Maneuver,
}

#[derive(Debug, Default, Deserialize)]
struct Maneuver {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    modifier: String,
}

#[derive(Debug, Deserialize)]
struct Waypoint {
    #[serde(default)]
    name: Option<String>,
}

fn leg_from_response(body: DirectionsResponse) -> Result<RouteLeg, ProviderError> {
    let DirectionsResponse { routes, waypoints } = body;
    let route = routes.into_iter().next().ok_or(ProviderError::EmptyResponse)?;

    let instructions = route
        .legs
        .iter()
        .flat_map(|leg| leg.steps.iter())
        .map(describe_step)
        .collect();

    let waypoints = if waypoints.is_empty() {
        &route.waypoints
    } else {
        &waypoints
    };
    let (start_name, end_name) = match waypoints.as_slice() {
        [first, .., last] => (waypoint_name(first), waypoint_name(last)),
        _ => (String::new(), String::new()),
    };

    Ok(RouteLeg {
        distance_miles: route.distance * METERS_TO_MILES,
        duration_hours: route.duration / 3600.0,
        coordinates: route
            .geometry
            .coordinates
            .iter()
            .map(|[lng, lat]| (*lat, *lng))
            .collect(),
        instructions,
        start_name,
        end_name,
    })
}

fn waypoint_name(waypoint: &Waypoint) -> String {
    waypoint.name.as_deref().unwrap_or_default().trim().to_string()
}

fn describe_step(step: &StepBody) -> RouteInstruction {
    let kind = step.maneuver.kind.replace('_', " ");
    let action = [kind.trim(), step.maneuver.modifier.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let action = if action.is_empty() {
        "Continue".to_string()
    } else {
        title_case(&action)
    };

    let instruction = if step.name.is_empty() {
        action
    } else {
        format!("{action} on {}", step.name)
    };

    RouteInstruction {
        instruction,
        distance_miles: round_to(step.distance * METERS_TO_MILES, 2),
        duration_minutes: round_to(step.duration / 60.0, 1),
    }
}

/// Uppercase the first letter of each word, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}
