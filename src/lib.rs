//! hos-planner: Hours-of-Service trip planning.
//!
//! Turns a pre-computed route into a day-by-day duty log and a list of
//! regulatory and logistics stops under U.S. property-carrier HOS rules.

pub mod config;
pub mod directions;
pub mod geocode;
pub mod haversine;
pub mod ledger;
pub mod planner;
pub mod polyline;
pub mod report;
pub mod simulation;
pub mod stop;
pub mod traits;

pub use config::{ConfigError, CycleRule, HosConfig, HosLimits, ShortHaulMode};
pub use planner::{PlanTripError, TripPlanReport, TripRequest, plan_trip};
pub use simulation::{PlanError, TripInput, TripPlan, simulate, simulate_many};
