//! Polyline representation for route geometries.
//!
//! Points are stored decoded as (latitude, longitude) pairs together with a
//! cumulative-distance table, so stop locations can be looked up by
//! odometer reading.

use serde::{Deserialize, Serialize};

/// Kilometres per degree of latitude.
const KM_PER_DEGREE: f64 = 111.0;

/// Fixed cos(latitude) correction for the longitude axis.
const LONGITUDE_SCALE: f64 = 0.7;

const MILES_PER_KM: f64 = 0.621371;

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct Polyline {
    points: Vec<(f64, f64)>,
    /// Miles from the first point to each point.
    cumulative: Vec<f64>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    ///
    /// Each point is a (latitude, longitude) tuple.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                total += segment_miles(points[i - 1], *point);
            }
            cumulative.push(total);
        }
        Self { points, cumulative }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        self.points.first().copied()
    }

    /// Approximate length of the polyline in miles.
    pub fn length_miles(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Point `miles` along the polyline, linearly interpolated and clamped
    /// to the route extent.
    ///
    /// Returns `None` when there are fewer than two points.
    pub fn interpolate(&self, miles: f64) -> Option<(f64, f64)> {
        if self.points.len() < 2 {
            return None;
        }

        let total = self.length_miles();
        if total == 0.0 {
            return self.first();
        }

        let last = self.points.len() - 1;
        let i = (self.cumulative[1..].partition_point(|&d| d < miles) + 1).min(last);

        let seg_start = self.cumulative[i - 1];
        let seg_len = self.cumulative[i] - seg_start;
        let t = if seg_len == 0.0 {
            0.0
        } else {
            ((miles - seg_start) / seg_len).clamp(0.0, 1.0)
        };

        let (lat1, lng1) = self.points[i - 1];
        let (lat2, lng2) = self.points[i];
        Some((lat1 + t * (lat2 - lat1), lng1 + t * (lng2 - lng1)))
    }
}

impl From<Vec<(f64, f64)>> for Polyline {
    fn from(points: Vec<(f64, f64)>) -> Self {
        Self::new(points)
    }
}

impl From<Polyline> for Vec<(f64, f64)> {
    fn from(polyline: Polyline) -> Self {
        polyline.into_points()
    }
}

/// Equirectangular segment length in miles.
fn segment_miles(from: (f64, f64), to: (f64, f64)) -> f64 {
    let dlat = (to.0 - from.0) * KM_PER_DEGREE;
    let dlng = (to.1 - from.1) * KM_PER_DEGREE * LONGITUDE_SCALE;
    (dlat * dlat + dlng * dlng).sqrt() * MILES_PER_KM
}
