//! Great-circle distance and the short-haul radius check.
//!
//! Also provides a straight-line route provider, useful as a fallback
//! when no directions service is reachable.

use crate::config::{ConfigError, SHORT_HAUL_RADIUS_MILES, ShortHaulMode};
use crate::traits::{ProviderError, RouteLeg, RouteProvider};

/// Earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Straight line to road distance.
const DEFAULT_ROAD_FACTOR: f64 = 1.3;

const DEFAULT_SPEED_MPH: f64 = 55.0;

/// Great-circle distance between two (lat, lng) points in miles.
pub fn haversine_miles(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1.0 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_MILES * c
}

/// Largest distance from `center` to any of `points`.
pub fn max_radius_miles(center: (f64, f64), points: &[(f64, f64)]) -> f64 {
    points
        .iter()
        .map(|point| haversine_miles(center, *point))
        .fold(0.0, f64::max)
}

/// Ensure a short-haul route stays inside the air-mile radius of the
/// reporting location. A no-op when short-haul mode is off.
pub fn check_short_haul_radius(
    mode: ShortHaulMode,
    reporting_location: (f64, f64),
    route: &[(f64, f64)],
) -> Result<(), ConfigError> {
    if !mode.is_active() {
        return Ok(());
    }

    let radius_miles = max_radius_miles(reporting_location, route);
    if radius_miles > SHORT_HAUL_RADIUS_MILES {
        return Err(ConfigError::ShortHaulRadiusExceeded {
            mode,
            radius_miles,
            limit_miles: SHORT_HAUL_RADIUS_MILES,
        });
    }
    Ok(())
}

/// Haversine-based route provider.
///
/// Estimates a leg as a straight segment scaled by a road factor.
#[derive(Debug, Clone)]
pub struct HaversineRouter {
    pub speed_mph: f64,
    pub road_factor: f64,
}

impl Default for HaversineRouter {
    fn default() -> Self {
        Self {
            speed_mph: DEFAULT_SPEED_MPH,
            road_factor: DEFAULT_ROAD_FACTOR,
        }
    }
}

impl HaversineRouter {
    pub fn new(speed_mph: f64, road_factor: f64) -> Self {
        Self {
            speed_mph,
            road_factor,
        }
    }
}

impl RouteProvider for HaversineRouter {
    fn route_between(&self, from: (f64, f64), to: (f64, f64)) -> Result<RouteLeg, ProviderError> {
        let distance_miles = haversine_miles(from, to) * self.road_factor;
        Ok(RouteLeg {
            distance_miles,
            duration_hours: distance_miles / self.speed_mph,
            coordinates: vec![from, to],
            instructions: Vec::new(),
            start_name: String::new(),
            end_name: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_miles((36.1, -115.1), (36.1, -115.1));
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Las Vegas (36.17, -115.14) to Los Angeles (34.05, -118.24), ~229 miles
        let dist = haversine_miles((36.17, -115.14), (34.05, -118.24));
        assert!(dist > 215.0 && dist < 245.0, "LV to LA should be ~229mi, got {}", dist);
    }

    #[test]
    fn test_haversine_antipodal_is_finite() {
        let dist = haversine_miles((0.0, 0.0), (0.0, 180.0));
        assert!(dist.is_finite());
        assert!((dist - std::f64::consts::PI * EARTH_RADIUS_MILES).abs() < 1.0);
    }

    #[test]
    fn test_radius_check_passes_inside() {
        let route = vec![(41.0, -87.0), (41.5, -87.0), (41.0, -87.5)];
        assert!(check_short_haul_radius(ShortHaulMode::Cdl150, (41.0, -87.0), &route).is_ok());
    }

    #[test]
    fn test_radius_check_fails_outside() {
        let route = vec![(41.0, -87.0), (38.0, -90.0)];
        let err = check_short_haul_radius(ShortHaulMode::NonCdl150, (41.0, -87.0), &route)
            .unwrap_err();
        match err {
            ConfigError::ShortHaulRadiusExceeded {
                mode,
                radius_miles,
                limit_miles,
            } => {
                assert_eq!(mode, ShortHaulMode::NonCdl150);
                assert!(radius_miles > 150.0);
                assert_eq!(limit_miles, 150.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_radius_check_ignored_without_short_haul() {
        let route = vec![(41.0, -87.0), (34.0, -118.0)];
        assert!(check_short_haul_radius(ShortHaulMode::None, (41.0, -87.0), &route).is_ok());
    }

    #[test]
    fn test_router_scales_straight_line() {
        let router = HaversineRouter::new(50.0, 1.0);
        let leg = router.route_between((36.17, -115.14), (34.05, -118.24)).unwrap();
        let straight = haversine_miles((36.17, -115.14), (34.05, -118.24));
        assert!((leg.distance_miles - straight).abs() < 1e-9);
        assert!((leg.duration_hours - straight / 50.0).abs() < 1e-9);
        assert_eq!(leg.coordinates.len(), 2);
    }
}
