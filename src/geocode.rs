//! Coordinate-text geocoder.
//!
//! Accepts locations already written as `"lat,lng"` (e.g. `41.8781,-87.6298`)
//! so trips can be planned without a geocoding service.

use crate::traits::{Geocoder, ProviderError, TripPoint};

#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateGeocoder;

/// Parse `"lat,lng"` into a [`TripPoint`] with an empty label.
pub fn parse_coordinate_pair(raw: &str) -> Result<TripPoint, ProviderError> {
    let parts: Vec<&str> = raw.trim().split(',').map(str::trim).collect();
    let [lat, lng] = parts.as_slice() else {
        return Err(ProviderError::InvalidLocation(format!(
            "{raw:?} must be in 'lat,lng' format (example: 41.8781,-87.6298)"
        )));
    };

    let (Ok(lat), Ok(lng)) = (lat.parse::<f64>(), lng.parse::<f64>()) else {
        return Err(ProviderError::InvalidLocation(format!(
            "{raw:?} has invalid coordinates; use numeric 'lat,lng'"
        )));
    };

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(ProviderError::InvalidLocation(format!(
            "{raw:?} coordinates out of range (lat -90..90, lng -180..180)"
        )));
    }

    Ok(TripPoint::new(lat, lng, ""))
}

impl Geocoder for CoordinateGeocoder {
    fn geocode(&self, query: &str) -> Result<TripPoint, ProviderError> {
        parse_coordinate_pair(query)
    }
}
