//! End-to-end trip planning: resolve locations, fetch both route legs, run
//! the HOS simulation and shape the result into one serializable payload.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::HosConfig;
use crate::polyline::Polyline;
use crate::report::{DayLogReport, StopReport, round_to};
use crate::simulation::{PlanError, TripInput, simulate};
use crate::traits::{
    FailureKind, Geocoder, ProviderError, RouteInstruction, RouteLeg, RouteProvider, TripPoint,
};

/// Trips are planned to start at 08:00 on day 0.
pub const PLANNED_START_HOUR: f64 = 8.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(default)]
    pub current_cycle_used: f64,
    #[serde(flatten)]
    pub config: HosConfig,
}

impl TripRequest {
    pub fn new(
        current_location: impl Into<String>,
        pickup_location: impl Into<String>,
        dropoff_location: impl Into<String>,
    ) -> Self {
        Self {
            current_location: current_location.into(),
            pickup_location: pickup_location.into(),
            dropoff_location: dropoff_location.into(),
            current_cycle_used: 0.0,
            config: HosConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), PlanTripError> {
        let locations = [
            &self.current_location,
            &self.pickup_location,
            &self.dropoff_location,
        ];
        if locations.iter().any(|location| location.trim().is_empty()) {
            return Err(PlanTripError::InvalidRequest(
                "current_location, pickup_location, and dropoff_location are all required"
                    .to_string(),
            ));
        }

        let cap = self.config.cycle_rule.cap_hours();
        if !(0.0..=cap).contains(&self.current_cycle_used) {
            return Err(PlanTripError::InvalidRequest(format!(
                "current_cycle_used must be between 0 and {cap} hours for cycle_rule={}",
                self.config.cycle_rule
            )));
        }

        self.config.resolve().map_err(PlanError::from)?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PlanTripError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("geocoding failed: {0}")]
    Geocode(#[source] ProviderError),
    #[error("routing failed: {0}")]
    Route(#[source] ProviderError),
    #[error("HOS calculation failed: {0}")]
    Hos(#[from] PlanError),
}

impl PlanTripError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PlanTripError::InvalidRequest(_) => FailureKind::InvalidInput,
            PlanTripError::Geocode(err) | PlanTripError::Route(err) => err.kind(),
            PlanTripError::Hos(PlanError::Config(_)) => FailureKind::InvalidInput,
            PlanTripError::Hos(PlanError::CycleExhausted { .. }) => FailureKind::Infeasible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub current_location: TripPoint,
    pub pickup_location: TripPoint,
    pub dropoff_location: TripPoint,
    pub current_cycle_used: f64,
    pub planned_start_hour: f64,
    pub total_distance_miles: f64,
    pub total_drive_hours: f64,
    pub num_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HosRulesApplied {
    #[serde(flatten)]
    pub config: HosConfig,
    pub cycle_limit_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegmentReport {
    pub coordinates: Vec<(f64, f64)>,
    pub distance_miles: f64,
    pub duration_hours: f64,
    pub instructions: Vec<RouteInstruction>,
}

impl From<&RouteLeg> for RouteSegmentReport {
    fn from(leg: &RouteLeg) -> Self {
        Self {
            coordinates: leg.coordinates.clone(),
            distance_miles: round_to(leg.distance_miles, 1),
            duration_hours: round_to(leg.duration_hours, 2),
            instructions: leg.instructions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    pub segment1: RouteSegmentReport,
    pub segment2: RouteSegmentReport,
    pub all_coordinates: Vec<(f64, f64)>,
    pub instructions: Vec<RouteInstruction>,
}

/// Complete planning result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlanReport {
    pub trip: TripSummary,
    pub hos_rules_applied: HosRulesApplied,
    pub route: RouteReport,
    pub stops: Vec<StopReport>,
    pub eld_logs: Vec<DayLogReport>,
}

/// Plan a trip from free-text locations.
///
/// Routes current -> pickup and pickup -> dropoff, then simulates the
/// combined route with the first leg's distance as the pickup odometer.
pub fn plan_trip<G, R>(
    request: &TripRequest,
    geocoder: &G,
    router: &R,
) -> Result<TripPlanReport, PlanTripError>
where
    G: Geocoder + ?Sized,
    R: RouteProvider + ?Sized,
{
    request.validate()?;

    let geocode = |query: &str| {
        geocoder.geocode(query.trim()).map_err(|err| {
            warn!(query, error = %err, "geocoding failed");
            PlanTripError::Geocode(err)
        })
    };
    let current = geocode(&request.current_location)?;
    let pickup = geocode(&request.pickup_location)?;
    let dropoff = geocode(&request.dropoff_location)?;

    let route = |from: &TripPoint, to: &TripPoint| {
        router
            .route_between(from.coordinates(), to.coordinates())
            .map_err(|err| {
                warn!(error = %err, "routing failed");
                PlanTripError::Route(err)
            })
    };
    let to_pickup = route(&current, &pickup)?;
    let to_dropoff = route(&pickup, &dropoff)?;

    let total_distance = to_pickup.distance_miles + to_dropoff.distance_miles;
    let total_drive_hours = to_pickup.duration_hours + to_dropoff.duration_hours;
    let all_coordinates: Vec<(f64, f64)> = to_pickup
        .coordinates
        .iter()
        .chain(&to_dropoff.coordinates)
        .copied()
        .collect();

    let input = TripInput::new(
        total_distance,
        total_drive_hours,
        pickup.coordinates(),
        dropoff.coordinates(),
        Polyline::new(all_coordinates.clone()),
    )
    .current_to_pickup(to_pickup.distance_miles)
    .cycle_used(request.current_cycle_used)
    .start_hour(PLANNED_START_HOUR);

    let plan = simulate(&input, &request.config)?;
    info!(
        total_distance_miles = total_distance,
        days = plan.day_logs.len(),
        "trip planned"
    );

    let instructions = to_pickup
        .instructions
        .iter()
        .chain(&to_dropoff.instructions)
        .cloned()
        .collect();

    Ok(TripPlanReport {
        trip: TripSummary {
            current_location: current,
            pickup_location: pickup,
            dropoff_location: dropoff,
            current_cycle_used: round_to(request.current_cycle_used, 2),
            planned_start_hour: PLANNED_START_HOUR,
            total_distance_miles: round_to(total_distance, 1),
            total_drive_hours: round_to(total_drive_hours, 2),
            num_days: plan.day_logs.len(),
        },
        hos_rules_applied: HosRulesApplied {
            config: request.config.clone(),
            cycle_limit_hours: request.config.cycle_rule.cap_hours(),
        },
        route: RouteReport {
            segment1: RouteSegmentReport::from(&to_pickup),
            segment2: RouteSegmentReport::from(&to_dropoff),
            all_coordinates,
            instructions,
        },
        stops: plan.stop_reports(),
        eld_logs: plan.day_log_reports(),
    })
}
