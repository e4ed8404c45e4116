//! Freight corridors for HOS scenarios.
//!
//! Coordinates are approximate city centres. The Midwest corridor is a
//! straight synthetic line so interpolation stays predictable.

#![allow(dead_code)]

use hos_planner::ledger::{DayLog, DutyPeriod, DutyStatus};
use hos_planner::polyline::Polyline;
use hos_planner::{HosConfig, TripInput, TripPlan, simulate};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub const CHICAGO: Location = Location::new("Chicago, IL", 41.8781, -87.6298);
pub const JOLIET: Location = Location::new("Joliet, IL", 41.5250, -88.0817);
pub const ROCKFORD: Location = Location::new("Rockford, IL", 42.2711, -89.0940);
pub const ST_LOUIS: Location = Location::new("St. Louis, MO", 38.6270, -90.1994);
pub const DENVER: Location = Location::new("Denver, CO", 39.7392, -104.9903);

/// Straight line from (41, -87) to (38, -90).
pub const MIDWEST_CORRIDOR: &[(f64, f64)] = &[(41.0, -87.0), (40.0, -88.0), (39.0, -89.0), (38.0, -90.0)];

/// Stays within ~40 air miles of (41, -87).
pub const COMPACT_LOOP: &[(f64, f64)] = &[(41.0, -87.0), (41.5, -87.0), (41.0, -87.5), (41.2, -86.9)];

/// Trip along the Midwest corridor, pickup at its start.
pub fn corridor_trip(distance_miles: f64) -> TripInput {
    TripInput::new(
        distance_miles,
        distance_miles / 55.0,
        (41.0, -87.0),
        (38.0, -90.0),
        Polyline::new(MIDWEST_CORRIDOR.to_vec()),
    )
}

pub fn compact_trip(distance_miles: f64) -> TripInput {
    TripInput::new(
        distance_miles,
        distance_miles / 55.0,
        (41.0, -87.0),
        (41.2, -86.9),
        Polyline::new(COMPACT_LOOP.to_vec()),
    )
}

pub fn plan(input: &TripInput, config: &HosConfig) -> TripPlan {
    simulate(input, config).expect("trip should plan")
}

/// All periods across all days, in chronological order.
pub fn all_periods(days: &[DayLog]) -> Vec<&DutyPeriod> {
    days.iter().flat_map(|day| day.periods.iter()).collect()
}

/// Driving hours and duty window used by one shift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftUsage {
    pub driving: f64,
    /// Shift start to the end of its last driving period.
    pub window: f64,
}

/// Split the log into shifts at every off-duty/sleeper run of 10h or more.
pub fn shifts(days: &[DayLog]) -> Vec<ShiftUsage> {
    let periods = all_periods(days);
    let Some(first) = periods.first() else {
        return Vec::new();
    };

    let mut shifts = Vec::new();
    let mut shift_start = first.start_hour;
    let mut current = ShiftUsage {
        driving: 0.0,
        window: 0.0,
    };
    let mut rest_run = 0.0;

    for period in periods {
        if !period.status.is_on_duty() {
            rest_run += period.duration();
            if rest_run >= 10.0 {
                if current.driving > 0.0 {
                    shifts.push(current);
                }
                current = ShiftUsage {
                    driving: 0.0,
                    window: 0.0,
                };
                shift_start = period.end_hour;
            }
            continue;
        }

        rest_run = 0.0;
        if period.status == DutyStatus::Driving {
            current.driving += period.duration();
            current.window = period.end_hour - shift_start;
        }
    }
    if current.driving > 0.0 {
        shifts.push(current);
    }
    shifts
}

pub fn total_driving(days: &[DayLog]) -> f64 {
    all_periods(days)
        .iter()
        .filter(|period| period.status == DutyStatus::Driving)
        .map(|period| period.duration())
        .sum()
}
