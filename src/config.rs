//! Hours-of-Service configuration and the limits derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base per-shift driving limit in hours.
pub const BASE_DRIVE_LIMIT_HOURS: f64 = 11.0;
/// Base duty window in hours, measured from shift start.
pub const BASE_WINDOW_LIMIT_HOURS: f64 = 14.0;
/// Extension applied to both driving and window limits under adverse conditions.
pub const ADVERSE_EXTENSION_HOURS: f64 = 2.0;
/// Extension applied to the first shift's window by the 16-hour exception.
pub const SIXTEEN_HOUR_EXTENSION_HOURS: f64 = 2.0;
/// Off-duty time that resets the shift clocks.
pub const MIN_REST_HOURS: f64 = 10.0;
/// Off-duty time that resets the rolling cycle.
pub const RESTART_HOURS: f64 = 34.0;
/// Cumulative driving allowed before a 30-minute break.
pub const BREAK_THRESHOLD_HOURS: f64 = 8.0;
/// Length of the mandatory break; any non-driving period this long qualifies.
pub const BREAK_DURATION_HOURS: f64 = 0.5;
pub const FUEL_INTERVAL_MILES: f64 = 1000.0;
pub const FUEL_DURATION_HOURS: f64 = 0.5;
pub const PICKUP_DURATION_HOURS: f64 = 1.0;
pub const DROPOFF_DURATION_HOURS: f64 = 1.0;
/// Planning speed used to turn hours into miles.
pub const AVERAGE_SPEED_MPH: f64 = 55.0;
/// Air-mile radius short-haul operation must stay within.
pub const SHORT_HAUL_RADIUS_MILES: f64 = 150.0;

/// Rolling on-duty cycle rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CycleRule {
    /// 60 hours in 7 days.
    #[serde(rename = "60_7")]
    Sixty7,
    /// 70 hours in 8 days.
    #[default]
    #[serde(rename = "70_8")]
    Seventy8,
}

impl CycleRule {
    pub fn cap_hours(self) -> f64 {
        match self {
            CycleRule::Sixty7 => 60.0,
            CycleRule::Seventy8 => 70.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CycleRule::Sixty7 => "60_7",
            CycleRule::Seventy8 => "70_8",
        }
    }
}

impl FromStr for CycleRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "60_7" => Ok(CycleRule::Sixty7),
            "70_8" => Ok(CycleRule::Seventy8),
            other => Err(ConfigError::UnknownCycleRule(other.to_string())),
        }
    }
}

impl fmt::Display for CycleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short-haul operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShortHaulMode {
    #[default]
    #[serde(rename = "none")]
    None,
    /// CDL drivers within 150 air miles.
    #[serde(rename = "cdl_150")]
    Cdl150,
    /// Non-CDL drivers within 150 air miles.
    #[serde(rename = "non_cdl_150")]
    NonCdl150,
}

impl ShortHaulMode {
    pub fn is_active(self) -> bool {
        !matches!(self, ShortHaulMode::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShortHaulMode::None => "none",
            ShortHaulMode::Cdl150 => "cdl_150",
            ShortHaulMode::NonCdl150 => "non_cdl_150",
        }
    }
}

impl FromStr for ShortHaulMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(ShortHaulMode::None),
            "cdl_150" => Ok(ShortHaulMode::Cdl150),
            "non_cdl_150" => Ok(ShortHaulMode::NonCdl150),
            other => Err(ConfigError::UnknownShortHaulMode(other.to_string())),
        }
    }
}

impl fmt::Display for ShortHaulMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised before simulation starts.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("cycle_rule must be one of: 70_8, 60_7 (got {0:?})")]
    UnknownCycleRule(String),
    #[error("short_haul_mode must be one of: none, cdl_150, non_cdl_150 (got {0:?})")]
    UnknownShortHaulMode(String),
    #[error("16-hour exception cannot be combined with non_cdl_150 short-haul mode")]
    SixteenHourWithNonCdl,
    #[error("start_hour must be a finite, non-negative clock hour (got {0})")]
    InvalidStartHour(f64),
    #[error(
        "short-haul mode {mode} selected but route exceeds {limit_miles:.0} air-mile radius ({radius_miles:.1} miles)"
    )]
    ShortHaulRadiusExceeded {
        mode: ShortHaulMode,
        radius_miles: f64,
        limit_miles: f64,
    },
}

/// Regulatory toggles for a single trip plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HosConfig {
    pub cycle_rule: CycleRule,
    pub adverse_driving_conditions: bool,
    pub short_haul_mode: ShortHaulMode,
    pub use_16_hour_exception: bool,
    pub used_16_hour_in_last_7_days: bool,
    pub return_to_reporting_location: bool,
    #[serde(rename = "enable_34h_restart")]
    pub enable_34_hour_restart: bool,
}

impl Default for HosConfig {
    fn default() -> Self {
        Self {
            cycle_rule: CycleRule::Seventy8,
            adverse_driving_conditions: false,
            short_haul_mode: ShortHaulMode::None,
            use_16_hour_exception: false,
            used_16_hour_in_last_7_days: false,
            return_to_reporting_location: true,
            enable_34_hour_restart: true,
        }
    }
}

/// Concrete limits resolved from a [`HosConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HosLimits {
    pub drive_limit: f64,
    pub window_limit: f64,
    /// Window for the very first shift; wider than `window_limit` only
    /// when the 16-hour exception applies.
    pub first_shift_window_limit: f64,
    pub cycle_cap: f64,
    pub break_required: bool,
    pub restart_enabled: bool,
}

impl HosConfig {
    /// Whether the one-time 16-hour window extension applies.
    pub fn sixteen_hour_eligible(&self) -> bool {
        self.use_16_hour_exception
            && !self.used_16_hour_in_last_7_days
            && self.return_to_reporting_location
    }

    pub fn resolve(&self) -> Result<HosLimits, ConfigError> {
        if self.short_haul_mode == ShortHaulMode::NonCdl150 && self.use_16_hour_exception {
            return Err(ConfigError::SixteenHourWithNonCdl);
        }

        let mut drive_limit = BASE_DRIVE_LIMIT_HOURS;
        let mut window_limit = BASE_WINDOW_LIMIT_HOURS;
        if self.adverse_driving_conditions {
            drive_limit += ADVERSE_EXTENSION_HOURS;
            window_limit += ADVERSE_EXTENSION_HOURS;
        }

        let first_shift_window_limit = if self.sixteen_hour_eligible() {
            window_limit + SIXTEEN_HOUR_EXTENSION_HOURS
        } else {
            window_limit
        };

        Ok(HosLimits {
            drive_limit,
            window_limit,
            first_shift_window_limit,
            cycle_cap: self.cycle_rule.cap_hours(),
            break_required: !self.short_haul_mode.is_active(),
            restart_enabled: self.enable_34_hour_restart,
        })
    }
}
