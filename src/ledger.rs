//! Duty-period ledger: timestamped duty segments grouped by calendar day.
//!
//! Clock values are absolute hours since midnight of day 0. A period never
//! spans midnight; anything that would is split at the boundary.

use serde::{Deserialize, Serialize};

use crate::report::round_to;

pub const HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    OffDuty,
    Sleeper,
    Driving,
    OnDutyNotDriving,
}

impl DutyStatus {
    /// Driving and on-duty-not-driving.
    pub fn is_on_duty(self) -> bool {
        matches!(self, DutyStatus::Driving | DutyStatus::OnDutyNotDriving)
    }
}

/// Half-open interval `[start_hour, end_hour)` in a single duty status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyPeriod {
    pub status: DutyStatus,
    pub start_hour: f64,
    pub end_hour: f64,
    pub day: u32,
    pub notes: String,
}

impl DutyPeriod {
    pub fn duration(&self) -> f64 {
        self.end_hour - self.start_hour
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLog {
    pub day: u32,
    pub date_label: String,
    pub periods: Vec<DutyPeriod>,
    pub total_driving: f64,
    /// Driving plus on-duty-not-driving.
    pub total_on_duty: f64,
    /// Off-duty plus sleeper.
    pub total_off_duty: f64,
    pub odometer_start: f64,
    pub odometer_end: f64,
}

impl DayLog {
    fn new(day: u32, odometer: f64) -> Self {
        Self {
            day,
            date_label: format!("Day {}", day + 1),
            periods: Vec::new(),
            total_driving: 0.0,
            total_on_duty: 0.0,
            total_off_duty: 0.0,
            odometer_start: odometer,
            odometer_end: odometer,
        }
    }

    fn hours_where(&self, pred: impl Fn(DutyStatus) -> bool) -> f64 {
        self.periods
            .iter()
            .filter(|period| pred(period.status))
            .map(DutyPeriod::duration)
            .sum()
    }

    /// Recompute totals as exact sums of the periods.
    fn recompute_totals(&mut self) {
        self.total_driving = round_to(self.hours_where(|s| s == DutyStatus::Driving), 2);
        self.total_on_duty = round_to(self.hours_where(DutyStatus::is_on_duty), 2);
        self.total_off_duty = round_to(self.hours_where(|s| !s.is_on_duty()), 2);
    }
}

pub fn day_index(hour: f64) -> u32 {
    (hour / HOURS_PER_DAY).floor() as u32
}

/// Accumulates duty periods into day logs in chronological order.
#[derive(Debug, Clone)]
pub struct DutyLedger {
    days: Vec<DayLog>,
}

impl DutyLedger {
    /// Opens the first day log at `start_hour`.
    pub fn new(start_hour: f64, odometer: f64) -> Self {
        Self {
            days: vec![DayLog::new(day_index(start_hour), odometer)],
        }
    }

    pub fn days(&self) -> &[DayLog] {
        &self.days
    }

    /// Day log containing `hour`, opening a new one when the clock has moved
    /// into a later day. The previous day's end odometer is fixed here.
    pub fn enter_day(&mut self, hour: f64, odometer: f64) -> &mut DayLog {
        let day = day_index(hour);
        let current = self.days.len() - 1;
        if day != self.days[current].day {
            self.days[current].odometer_end = odometer;
            self.days.push(DayLog::new(day, odometer));
        }
        let last = self.days.len() - 1;
        &mut self.days[last]
    }

    /// Record `[start, end)`, splitting at each midnight it crosses.
    /// Empty or inverted intervals are ignored.
    pub fn add_period(
        &mut self,
        status: DutyStatus,
        start: f64,
        end: f64,
        odometer: f64,
        notes: &str,
    ) {
        let mut start = start;
        while end > start {
            let day = day_index(start);
            let midnight = f64::from(day + 1) * HOURS_PER_DAY;
            let slice_end = end.min(midnight);

            self.enter_day(start, odometer).periods.push(DutyPeriod {
                status,
                start_hour: start,
                end_hour: slice_end,
                day,
                notes: notes.to_string(),
            });
            start = slice_end;
        }
    }

    /// Close the last day and recompute every day's totals.
    pub fn finish(mut self, odometer: f64) -> Vec<DayLog> {
        if let Some(last) = self.days.last_mut() {
            last.odometer_end = odometer;
        }
        for day in &mut self.days {
            day.recompute_totals();
        }
        self.days
    }
}
