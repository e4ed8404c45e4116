//! HOS simulation driver.
//!
//! Advances a virtual clock and odometer through a trip, inserting the
//! regulatory stops the limits demand. Each loop iteration classifies the
//! current accumulators into a [`Step`] (first match wins, in priority
//! order: break, restart, rest, fuel, drive) and applies it.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{
    AVERAGE_SPEED_MPH, BREAK_DURATION_HOURS, BREAK_THRESHOLD_HOURS, ConfigError,
    DROPOFF_DURATION_HOURS, FUEL_DURATION_HOURS, FUEL_INTERVAL_MILES, HosConfig, HosLimits,
    MIN_REST_HOURS, PICKUP_DURATION_HOURS, RESTART_HOURS,
};
use crate::haversine::check_short_haul_radius;
use crate::ledger::{DayLog, DutyLedger, DutyStatus};
use crate::polyline::Polyline;
use crate::report::{DayLogReport, StopReport, day_log_reports, stop_reports};
use crate::stop::{Stop, StopKind};

/// A phase is complete once the odometer is this close to its target.
pub const ODOMETER_TOLERANCE_MILES: f64 = 0.01;

/// Budgets below this many hours count as exhausted, so every drive step
/// is strictly positive.
pub const MIN_SEGMENT_HOURS: f64 = 1e-9;

const MIN_SEGMENT_MILES: f64 = MIN_SEGMENT_HOURS * AVERAGE_SPEED_MPH;

const DEFAULT_START_HOUR: f64 = 8.0;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(
        "no remaining cycle hours ({cycle_cap:.0}-hour cap reached); enable the 34-hour restart or reduce current cycle hours"
    )]
    CycleExhausted { cycle_cap: f64 },
}

/// Pre-computed trip inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripInput {
    pub total_distance_miles: f64,
    /// Provider's drive-time estimate; informational only.
    pub total_drive_hours: f64,
    pub pickup: (f64, f64),
    pub dropoff: (f64, f64),
    pub route: Polyline,
    pub current_to_pickup_miles: f64,
    pub current_cycle_used_hours: f64,
    /// Clock hour (since midnight of day 0) the trip begins.
    pub start_hour: f64,
}

impl TripInput {
    pub fn new(
        total_distance_miles: f64,
        total_drive_hours: f64,
        pickup: (f64, f64),
        dropoff: (f64, f64),
        route: Polyline,
    ) -> Self {
        Self {
            total_distance_miles,
            total_drive_hours,
            pickup,
            dropoff,
            route,
            current_to_pickup_miles: 0.0,
            current_cycle_used_hours: 0.0,
            start_hour: DEFAULT_START_HOUR,
        }
    }

    pub fn current_to_pickup(mut self, miles: f64) -> Self {
        self.current_to_pickup_miles = miles;
        self
    }

    pub fn cycle_used(mut self, hours: f64) -> Self {
        self.current_cycle_used_hours = hours;
        self
    }

    pub fn start_hour(mut self, hour: f64) -> Self {
        self.start_hour = hour;
        self
    }
}

/// Stops in chronological order plus per-day duty logs.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub stops: Vec<Stop>,
    pub day_logs: Vec<DayLog>,
}

impl TripPlan {
    pub fn stop_reports(&self) -> Vec<StopReport> {
        stop_reports(&self.stops)
    }

    pub fn day_log_reports(&self) -> Vec<DayLogReport> {
        day_log_reports(&self.day_logs)
    }

    pub fn count(&self, kind: StopKind) -> usize {
        self.stops.iter().filter(|stop| stop.kind == kind).count()
    }
}

/// What the driver does next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    AwaitingBreak,
    AwaitingRestart,
    AwaitingRest,
    AwaitingFuel,
    Driving { miles: f64 },
    Done,
}

/// Accumulators for one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    clock: f64,
    odometer: f64,
    shift_start: f64,
    shift_drive_hours: f64,
    drive_since_break: f64,
    window_limit: f64,
    cycle_used: f64,
    miles_since_fuel: f64,
}

impl SimulationState {
    pub fn new(start_hour: f64, cycle_used: f64, limits: &HosLimits) -> Self {
        Self {
            clock: start_hour,
            odometer: 0.0,
            shift_start: start_hour,
            shift_drive_hours: 0.0,
            drive_since_break: 0.0,
            window_limit: limits.first_shift_window_limit,
            cycle_used,
            miles_since_fuel: 0.0,
        }
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn odometer(&self) -> f64 {
        self.odometer
    }

    pub fn cycle_used(&self) -> f64 {
        self.cycle_used
    }

    fn drive_remaining(&self, limits: &HosLimits) -> f64 {
        limits.drive_limit - self.shift_drive_hours
    }

    fn window_remaining(&self) -> f64 {
        self.window_limit - (self.clock - self.shift_start)
    }

    fn break_remaining(&self, limits: &HosLimits) -> f64 {
        if limits.break_required {
            BREAK_THRESHOLD_HOURS - self.drive_since_break
        } else {
            f64::INFINITY
        }
    }

    fn cycle_headroom(&self, limits: &HosLimits) -> f64 {
        limits.cycle_cap - self.cycle_used
    }

    fn miles_to_fuel(&self) -> f64 {
        FUEL_INTERVAL_MILES - self.miles_since_fuel
    }

    fn fuel_due(&self) -> bool {
        self.miles_to_fuel() <= MIN_SEGMENT_MILES
    }

    /// Classify the state against the limits, in fixed priority order.
    pub fn next_step(&self, limits: &HosLimits, target_odometer: f64) -> Step {
        if self.odometer + ODOMETER_TOLERANCE_MILES >= target_odometer {
            return Step::Done;
        }

        let break_remaining = self.break_remaining(limits);
        if break_remaining <= MIN_SEGMENT_HOURS {
            return Step::AwaitingBreak;
        }

        let cycle_headroom = self.cycle_headroom(limits);
        if cycle_headroom <= MIN_SEGMENT_HOURS {
            return Step::AwaitingRestart;
        }

        let drive_remaining = self.drive_remaining(limits);
        let window_remaining = self.window_remaining();
        if drive_remaining <= MIN_SEGMENT_HOURS || window_remaining <= MIN_SEGMENT_HOURS {
            return Step::AwaitingRest;
        }

        if self.fuel_due() {
            return Step::AwaitingFuel;
        }

        let hours = drive_remaining
            .min(window_remaining)
            .min(break_remaining)
            .min(cycle_headroom);
        let miles = (hours * AVERAGE_SPEED_MPH)
            .min(self.miles_to_fuel())
            .min(target_odometer - self.odometer);

        Step::Driving { miles }
    }
}

/// A fixed-length non-driving stop.
struct NonDriving {
    status: DutyStatus,
    hours: f64,
    kind: StopKind,
    label: &'static str,
    period_notes: &'static str,
    stop_notes: &'static str,
}

const MANDATORY_BREAK: NonDriving = NonDriving {
    status: DutyStatus::OffDuty,
    hours: BREAK_DURATION_HOURS,
    kind: StopKind::Break30,
    label: "Mandatory 30-Min Break",
    period_notes: "30-min mandatory break",
    stop_notes: "Required break after 8 hours driving",
};

const CYCLE_RESTART: NonDriving = NonDriving {
    status: DutyStatus::OffDuty,
    hours: RESTART_HOURS,
    kind: StopKind::Rest,
    label: "34-Hour Restart (Cycle Reset)",
    period_notes: "34-hr restart (cycle reset)",
    stop_notes: "Cycle limit reached. 34-hr restart required.",
};

const SHIFT_REST: NonDriving = NonDriving {
    status: DutyStatus::Sleeper,
    hours: MIN_REST_HOURS,
    kind: StopKind::Rest,
    label: "Required 10-Hour Rest",
    period_notes: "10-hr off-duty rest",
    stop_notes: "10-hour rest period (resets driving limits)",
};

const FUEL: NonDriving = NonDriving {
    status: DutyStatus::OnDutyNotDriving,
    hours: FUEL_DURATION_HOURS,
    kind: StopKind::Fuel,
    label: "Fuel Stop",
    period_notes: "Fueling stop",
    stop_notes: "Refueling stop",
};

const PICKUP: NonDriving = NonDriving {
    status: DutyStatus::OnDutyNotDriving,
    hours: PICKUP_DURATION_HOURS,
    kind: StopKind::Pickup,
    label: "Pickup Location",
    period_notes: "Pickup stop",
    stop_notes: "1 hour pickup time",
};

const DROPOFF: NonDriving = NonDriving {
    status: DutyStatus::OnDutyNotDriving,
    hours: DROPOFF_DURATION_HOURS,
    kind: StopKind::Dropoff,
    label: "Dropoff Location",
    period_notes: "Dropoff stop",
    stop_notes: "1 hour dropoff time",
};

/// Single owner of the state, ledger and stop list for one run.
struct Simulator<'a> {
    input: &'a TripInput,
    limits: HosLimits,
    state: SimulationState,
    ledger: DutyLedger,
    stops: Vec<Stop>,
}

impl<'a> Simulator<'a> {
    fn new(input: &'a TripInput, limits: HosLimits) -> Self {
        let state = SimulationState::new(input.start_hour, input.current_cycle_used_hours, &limits);
        let ledger = DutyLedger::new(input.start_hour, 0.0);
        Self {
            input,
            limits,
            state,
            ledger,
            stops: Vec::new(),
        }
    }

    fn mark_start(&mut self) {
        let origin = self.input.route.first();
        self.stops.push(Stop {
            kind: StopKind::Start,
            label: "Trip Start / Current Location".to_string(),
            location: None,
            lat: origin.map(|(lat, _)| lat),
            lng: origin.map(|(_, lng)| lng),
            arrive_hour: self.state.clock,
            depart_hour: self.state.clock,
            odometer: 0.0,
            notes: String::new(),
        });
    }

    /// Drive toward `target_odometer`, inserting stops as limits require.
    fn run_phase(&mut self, target_odometer: f64) -> Result<(), PlanError> {
        let target = target_odometer.max(self.state.odometer);

        loop {
            let step = self.state.next_step(&self.limits, target);
            if step != Step::Done {
                self.ledger.enter_day(self.state.clock, self.state.odometer);
            }

            match step {
                Step::Done => return Ok(()),
                Step::AwaitingBreak => self.insert(&MANDATORY_BREAK, None),
                Step::AwaitingRestart => self.restart()?,
                Step::AwaitingRest => {
                    self.insert(&SHIFT_REST, None);
                    self.reset_shift();
                }
                Step::AwaitingFuel => self.refuel(),
                Step::Driving { miles } => self.drive(miles, target),
            }
        }
    }

    fn restart(&mut self) -> Result<(), PlanError> {
        if !self.limits.restart_enabled {
            return Err(PlanError::CycleExhausted {
                cycle_cap: self.limits.cycle_cap,
            });
        }
        info!(
            clock = self.state.clock,
            odometer = self.state.odometer,
            "cycle exhausted, inserting 34-hour restart"
        );
        self.insert(&CYCLE_RESTART, None);
        self.state.cycle_used = 0.0;
        self.reset_shift();
        Ok(())
    }

    fn reset_shift(&mut self) {
        self.state.shift_start = self.state.clock;
        self.state.shift_drive_hours = 0.0;
        self.state.drive_since_break = 0.0;
        self.state.window_limit = self.limits.window_limit;
    }

    fn refuel(&mut self) {
        let location = self
            .input
            .route
            .interpolate(self.state.odometer)
            .unwrap_or(self.input.pickup);
        self.insert(&FUEL, Some(location));
        self.state.miles_since_fuel = 0.0;
    }

    fn drive(&mut self, miles: f64, target: f64) {
        let hours = miles / AVERAGE_SPEED_MPH;
        let start = self.state.clock;
        let end = start + hours;
        self.ledger
            .add_period(DutyStatus::Driving, start, end, self.state.odometer, "");

        let state = &mut self.state;
        state.odometer += miles;
        state.miles_since_fuel += miles;
        state.shift_drive_hours += hours;
        state.drive_since_break += hours;
        state.cycle_used += hours;
        state.clock = end;

        // A segment that lands exactly on the fuel interval refuels before
        // anything else is considered.
        if self.state.fuel_due() && self.state.odometer + ODOMETER_TOLERANCE_MILES < target {
            self.refuel();
        }
    }

    /// Record a non-driving period and its stop, then advance the clock.
    fn insert(&mut self, stop: &NonDriving, location: Option<(f64, f64)>) {
        let start = self.state.clock;
        let end = start + stop.hours;
        self.ledger
            .add_period(stop.status, start, end, self.state.odometer, stop.period_notes);

        debug!(
            kind = stop.kind.as_str(),
            clock = start,
            odometer = self.state.odometer,
            "inserting stop"
        );
        self.stops.push(Stop {
            kind: stop.kind,
            label: stop.label.to_string(),
            location: None,
            lat: location.map(|(lat, _)| lat),
            lng: location.map(|(_, lng)| lng),
            arrive_hour: start,
            depart_hour: end,
            odometer: self.state.odometer,
            notes: stop.stop_notes.to_string(),
        });

        if stop.status == DutyStatus::OnDutyNotDriving {
            self.state.cycle_used += stop.hours;
        }
        // Any non-driving period of 30 minutes qualifies as the break.
        if stop.hours >= BREAK_DURATION_HOURS {
            self.state.drive_since_break = 0.0;
        }
        self.state.clock = end;
    }

    fn finish(self) -> TripPlan {
        TripPlan {
            stops: self.stops,
            day_logs: self.ledger.finish(self.state.odometer),
        }
    }
}

/// Plan a trip under the given HOS configuration.
///
/// Fails before simulating on configuration errors, or mid-run when the
/// cycle is exhausted and the 34-hour restart is disabled. No partial plan
/// is returned.
pub fn simulate(input: &TripInput, config: &HosConfig) -> Result<TripPlan, PlanError> {
    let limits = config.resolve()?;
    if !input.start_hour.is_finite() || input.start_hour < 0.0 {
        return Err(ConfigError::InvalidStartHour(input.start_hour).into());
    }
    check_short_haul_radius(config.short_haul_mode, input.pickup, input.route.points())?;

    let total = input.total_distance_miles;
    let pickup_target = input.current_to_pickup_miles.min(total).max(0.0);
    let dropoff_target = pickup_target.max(total);

    debug!(
        total_distance_miles = total,
        estimated_drive_hours = input.total_drive_hours,
        pickup_target,
        "starting HOS simulation"
    );

    let mut sim = Simulator::new(input, limits);
    sim.mark_start();

    sim.run_phase(pickup_target)?;
    sim.insert(&PICKUP, Some(input.pickup));

    sim.run_phase(dropoff_target)?;
    sim.insert(&DROPOFF, Some(input.dropoff));

    let plan = sim.finish();
    info!(
        stops = plan.stops.len(),
        days = plan.day_logs.len(),
        "trip simulation complete"
    );
    Ok(plan)
}

/// Plan independent trips in parallel. Results keep input order.
pub fn simulate_many(trips: &[(TripInput, HosConfig)]) -> Vec<Result<TripPlan, PlanError>> {
    trips
        .par_iter()
        .map(|(input, config)| simulate(input, config))
        .collect()
}
