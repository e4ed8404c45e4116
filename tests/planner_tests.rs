//! End-to-end planning tests with mock collaborators.

mod fixtures;

use std::cell::RefCell;
use std::collections::HashMap;

use hos_planner::geocode::CoordinateGeocoder;
use hos_planner::haversine::HaversineRouter;
use hos_planner::stop::StopKind;
use hos_planner::traits::{
    FailureKind, Geocoder, ProviderError, RouteInstruction, RouteLeg, RouteProvider, TripPoint,
};
use hos_planner::{CycleRule, PlanTripError, ShortHaulMode, TripRequest, plan_trip};

use fixtures::{CHICAGO, DENVER, JOLIET, Location, ROCKFORD, ST_LOUIS};

// ============================================================================
// Mock Collaborators
// ============================================================================

/// Looks locations up by name.
struct MockGeocoder {
    known: HashMap<&'static str, Location>,
}

impl MockGeocoder {
    fn new(locations: &[Location]) -> Self {
        Self {
            known: locations
                .iter()
                .map(|location| (location.name, location.clone()))
                .collect(),
        }
    }
}

impl Geocoder for MockGeocoder {
    fn geocode(&self, query: &str) -> Result<TripPoint, ProviderError> {
        self.known
            .get(query)
            .map(|location| TripPoint::new(location.lat, location.lng, location.name))
            .ok_or_else(|| ProviderError::InvalidLocation(format!("unknown place {query:?}")))
    }
}

/// Returns straight two-point legs with a fixed distance per leg, in call
/// order, and records the requested endpoints.
struct MockRouter {
    leg_miles: Vec<f64>,
    calls: RefCell<Vec<((f64, f64), (f64, f64))>>,
}

impl MockRouter {
    fn new(leg_miles: &[f64]) -> Self {
        Self {
            leg_miles: leg_miles.to_vec(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl RouteProvider for MockRouter {
    fn route_between(&self, from: (f64, f64), to: (f64, f64)) -> Result<RouteLeg, ProviderError> {
        let index = self.calls.borrow().len();
        self.calls.borrow_mut().push((from, to));
        let distance_miles = self.leg_miles[index];
        Ok(RouteLeg {
            distance_miles,
            duration_hours: distance_miles / 50.0,
            coordinates: vec![from, to],
            instructions: vec![RouteInstruction {
                instruction: format!("Depart leg {}", index + 1),
                distance_miles,
                duration_minutes: distance_miles / 50.0 * 60.0,
            }],
            start_name: String::new(),
            end_name: String::new(),
        })
    }
}

/// Always fails with the given HTTP outcome.
struct FailingRouter {
    status: Option<u16>,
}

impl RouteProvider for FailingRouter {
    fn route_between(&self, _from: (f64, f64), _to: (f64, f64)) -> Result<RouteLeg, ProviderError> {
        match self.status {
            None => Err(ProviderError::Timeout),
            Some(status) => Err(ProviderError::Status {
                status,
                message: Some("provider says no".to_string()),
            }),
        }
    }
}

fn request(current: &Location, pickup: &Location, dropoff: &Location) -> TripRequest {
    TripRequest::new(current.name, pickup.name, dropoff.name)
}

// ============================================================================
// Happy Path
// ============================================================================

#[test]
fn plans_trip_over_both_legs() {
    let geocoder = MockGeocoder::new(&[CHICAGO, ST_LOUIS, DENVER]);
    let router = MockRouter::new(&[300.0, 850.0]);

    let report = plan_trip(&request(&CHICAGO, &ST_LOUIS, &DENVER), &geocoder, &router).unwrap();

    let calls = router.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], (CHICAGO.coords(), ST_LOUIS.coords()));
    assert_eq!(calls[1], (ST_LOUIS.coords(), DENVER.coords()));

    assert_eq!(report.trip.total_distance_miles, 1150.0);
    assert_eq!(report.trip.total_drive_hours, 23.0);
    assert_eq!(report.trip.planned_start_hour, 8.0);
    assert_eq!(report.trip.num_days, report.eld_logs.len());
    assert_eq!(report.trip.pickup_location.label, "St. Louis, MO");

    let pickup = report
        .stops
        .iter()
        .find(|stop| stop.stop_type == StopKind::Pickup)
        .expect("pickup stop");
    assert_eq!(pickup.odometer, 300.0);
    assert_eq!(pickup.lat, Some(ST_LOUIS.lat));

    let dropoff = report.stops.last().unwrap();
    assert_eq!(dropoff.stop_type, StopKind::Dropoff);
    assert_eq!(dropoff.odometer, 1150.0);

    assert_eq!(report.route.all_coordinates.len(), 4);
    assert_eq!(report.route.instructions.len(), 2);
    assert_eq!(report.route.segment2.distance_miles, 850.0);
}

#[test]
fn payload_serializes_with_flat_rules() {
    let geocoder = MockGeocoder::new(&[CHICAGO, ST_LOUIS, DENVER]);
    let router = MockRouter::new(&[300.0, 850.0]);
    let mut trip = request(&CHICAGO, &ST_LOUIS, &DENVER);
    trip.config.cycle_rule = CycleRule::Sixty7;
    trip.current_cycle_used = 10.123;

    let report = plan_trip(&trip, &geocoder, &router).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["hos_rules_applied"]["cycle_rule"], "60_7");
    assert_eq!(json["hos_rules_applied"]["cycle_limit_hours"], 60.0);
    assert_eq!(json["hos_rules_applied"]["enable_34h_restart"], true);
    assert_eq!(json["trip"]["current_cycle_used"], 10.12);
    assert_eq!(json["stops"][0]["stop_type"], "start");
    assert!(json["eld_logs"].as_array().is_some_and(|logs| !logs.is_empty()));
}

#[test]
fn coordinate_text_and_haversine_fallback() {
    let trip = TripRequest::new("41.8781,-87.6298", "41.5250,-88.0817", "42.2711,-89.0940");
    let report = plan_trip(&trip, &CoordinateGeocoder, &HaversineRouter::default()).unwrap();

    assert!(report.trip.current_location.label.is_empty());
    assert!(report.trip.total_distance_miles > 100.0);
    assert_eq!(report.stops.first().map(|stop| stop.stop_type), Some(StopKind::Start));
    assert_eq!(report.eld_logs.len(), 1);
}

#[test]
fn short_haul_within_radius_plans_without_breaks() {
    let geocoder = MockGeocoder::new(&[CHICAGO, JOLIET, ROCKFORD]);
    let router = MockRouter::new(&[40.0, 500.0]);
    let mut trip = request(&CHICAGO, &JOLIET, &ROCKFORD);
    trip.config.short_haul_mode = ShortHaulMode::Cdl150;

    let report = plan_trip(&trip, &geocoder, &router).unwrap();
    assert!(report.stops.iter().all(|stop| stop.stop_type != StopKind::Break30));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn invalid_request_never_calls_collaborators() {
    let geocoder = MockGeocoder::new(&[]);
    let router = MockRouter::new(&[]);
    let mut trip = request(&CHICAGO, &ST_LOUIS, &DENVER);
    trip.current_cycle_used = 75.0;

    let err = plan_trip(&trip, &geocoder, &router).unwrap_err();
    assert!(matches!(err, PlanTripError::InvalidRequest(_)));
    assert_eq!(err.kind(), FailureKind::InvalidInput);
    assert!(router.calls.borrow().is_empty());
}

#[test]
fn unknown_location_is_a_geocode_failure() {
    let geocoder = MockGeocoder::new(&[CHICAGO, ST_LOUIS]);
    let router = MockRouter::new(&[300.0, 850.0]);

    let err = plan_trip(&request(&CHICAGO, &ST_LOUIS, &DENVER), &geocoder, &router).unwrap_err();
    assert!(matches!(err, PlanTripError::Geocode(_)));
    assert_eq!(err.kind(), FailureKind::InvalidInput);
}

#[test]
fn routing_failures_keep_their_category() {
    let geocoder = MockGeocoder::new(&[CHICAGO, ST_LOUIS, DENVER]);
    let trip = request(&CHICAGO, &ST_LOUIS, &DENVER);

    let cases = [
        (None, FailureKind::Timeout),
        (Some(403), FailureKind::ProviderRejected),
        (Some(502), FailureKind::ProviderUnavailable),
    ];
    for (status, expected) in cases {
        let err = plan_trip(&trip, &geocoder, &FailingRouter { status }).unwrap_err();
        assert!(matches!(err, PlanTripError::Route(_)));
        assert_eq!(err.kind(), expected, "status {:?}", status);
    }
}

#[test]
fn exhausted_cycle_without_restart_is_infeasible() {
    let geocoder = MockGeocoder::new(&[CHICAGO, ST_LOUIS, DENVER]);
    let router = MockRouter::new(&[300.0, 850.0]);
    let mut trip = request(&CHICAGO, &ST_LOUIS, &DENVER);
    trip.current_cycle_used = 68.0;
    trip.config.enable_34_hour_restart = false;

    let err = plan_trip(&trip, &geocoder, &router).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Infeasible);
    assert!(err.to_string().starts_with("HOS calculation failed"));
}

#[test]
fn short_haul_outside_radius_is_invalid_input() {
    let geocoder = MockGeocoder::new(&[CHICAGO, ST_LOUIS, DENVER]);
    let router = MockRouter::new(&[300.0, 850.0]);
    let mut trip = request(&CHICAGO, &ST_LOUIS, &DENVER);
    trip.config.short_haul_mode = ShortHaulMode::Cdl150;

    let err = plan_trip(&trip, &geocoder, &router).unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidInput);
    assert!(err.to_string().contains("150 air-mile radius"));
}
