//! Point-in-time trip events.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Start,
    Pickup,
    Dropoff,
    Fuel,
    /// 10-hour reset or 34-hour restart.
    Rest,
    #[serde(rename = "break_30")]
    Break30,
    Sleeper,
}

impl StopKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StopKind::Start => "start",
            StopKind::Pickup => "pickup",
            StopKind::Dropoff => "dropoff",
            StopKind::Fuel => "fuel",
            StopKind::Rest => "rest",
            StopKind::Break30 => "break_30",
            StopKind::Sleeper => "sleeper",
        }
    }
}

/// A logistics or regulatory stop. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub kind: StopKind,
    pub label: String,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Clock hours since midnight of day 0.
    pub arrive_hour: f64,
    pub depart_hour: f64,
    /// Miles from trip origin.
    pub odometer: f64,
    pub notes: String,
}

impl Stop {
    pub fn duration_hours(&self) -> f64 {
        self.depart_hour - self.arrive_hour
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }
}
