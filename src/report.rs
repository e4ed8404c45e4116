//! Serializable, rounded views of a simulated trip.

use serde::Serialize;

use crate::ledger::{DayLog, DutyPeriod, DutyStatus, HOURS_PER_DAY};
use crate::stop::{Stop, StopKind};

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopReport {
    pub stop_type: StopKind,
    pub label: String,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub arrive_hour: f64,
    pub depart_hour: f64,
    pub duration_hours: f64,
    pub odometer: f64,
    pub notes: String,
}

impl From<&Stop> for StopReport {
    fn from(stop: &Stop) -> Self {
        Self {
            stop_type: stop.kind,
            label: stop.label.clone(),
            location: stop.location.clone(),
            lat: stop.lat,
            lng: stop.lng,
            arrive_hour: round_to(stop.arrive_hour, 2),
            depart_hour: round_to(stop.depart_hour, 2),
            duration_hours: round_to(stop.duration_hours(), 2),
            odometer: round_to(stop.odometer, 1),
            notes: stop.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub status: DutyStatus,
    pub start_hour: f64,
    pub end_hour: f64,
    /// Clock hour modulo 24; a period ending at midnight reports 0.0.
    pub start_hour_of_day: f64,
    pub end_hour_of_day: f64,
    pub duration: f64,
    pub notes: String,
}

impl From<&DutyPeriod> for PeriodReport {
    fn from(period: &DutyPeriod) -> Self {
        Self {
            status: period.status,
            start_hour: round_to(period.start_hour, 4),
            end_hour: round_to(period.end_hour, 4),
            start_hour_of_day: round_to(period.start_hour.rem_euclid(HOURS_PER_DAY), 4),
            end_hour_of_day: round_to(period.end_hour.rem_euclid(HOURS_PER_DAY), 4),
            duration: round_to(period.duration(), 4),
            notes: period.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayLogReport {
    pub day: u32,
    pub date_label: String,
    pub periods: Vec<PeriodReport>,
    pub total_driving: f64,
    pub total_on_duty: f64,
    pub total_off_duty: f64,
    pub odometer_start: f64,
    pub odometer_end: f64,
    /// Always empty; kept so the log payload has a stable shape.
    pub remarks: Vec<String>,
}

impl From<&DayLog> for DayLogReport {
    fn from(day: &DayLog) -> Self {
        Self {
            day: day.day,
            date_label: day.date_label.clone(),
            periods: day.periods.iter().map(PeriodReport::from).collect(),
            total_driving: round_to(day.total_driving, 2),
            total_on_duty: round_to(day.total_on_duty, 2),
            total_off_duty: round_to(day.total_off_duty, 2),
            odometer_start: round_to(day.odometer_start, 1),
            odometer_end: round_to(day.odometer_end, 1),
            remarks: Vec::new(),
        }
    }
}

pub fn stop_reports(stops: &[Stop]) -> Vec<StopReport> {
    stops.iter().map(StopReport::from).collect()
}

pub fn day_log_reports(days: &[DayLog]) -> Vec<DayLogReport> {
    days.iter().map(DayLogReport::from).collect()
}
