//! Geographic primitives
//!
//! Provides latitude/longitude points and bounding boxes used to describe
//! map viewports and offline region extents. All values are floating-point
//! degrees; bounds follow the west/south/east/north convention used by the
//! offline-storage wire format.

use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors produced when constructing geographic values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    /// Latitude outside the valid range.
    #[error("invalid latitude: {0} (valid range {MIN_LAT} to {MAX_LAT})")]
    InvalidLatitude(f64),

    /// Longitude outside the valid range.
    #[error("invalid longitude: {0} (valid range {MIN_LON} to {MAX_LON})")]
    InvalidLongitude(f64),

    /// West/east or south/north edges are crossed.
    #[error("invalid bounds: west {west} / east {east}, south {south} / north {north}")]
    InvalidBounds {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
    },
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLng {
    /// Create a new point, validating both coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoError> {
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(GeoError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }
}

/// A geographic bounding box in degrees.
///
/// Edges are stored as west/south/east/north. Boxes that cross the
/// antimeridian are not supported; `west` must not exceed `east`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl LatLngBounds {
    /// Create a new bounding box, validating edge ordering and ranges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, GeoError> {
        if !(MIN_LAT..=MAX_LAT).contains(&south) {
            return Err(GeoError::InvalidLatitude(south));
        }
        if !(MIN_LAT..=MAX_LAT).contains(&north) {
            return Err(GeoError::InvalidLatitude(north));
        }
        if !(MIN_LON..=MAX_LON).contains(&west) {
            return Err(GeoError::InvalidLongitude(west));
        }
        if !(MIN_LON..=MAX_LON).contains(&east) {
            return Err(GeoError::InvalidLongitude(east));
        }
        if west > east || south > north {
            return Err(GeoError::InvalidBounds {
                west,
                south,
                east,
                north,
            });
        }
        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Create a box spanning `span_deg` degrees in each direction around a center.
    ///
    /// Edges are clamped to the valid latitude/longitude ranges rather than
    /// wrapping, so a center near a pole or the antimeridian yields a
    /// truncated box.
    pub fn around(center: LatLng, span_deg: f64) -> Self {
        let half = span_deg / 2.0;
        Self {
            west: (center.lon - half).max(MIN_LON),
            south: (center.lat - half).max(MIN_LAT),
            east: (center.lon + half).min(MAX_LON),
            north: (center.lat + half).min(MAX_LAT),
        }
    }

    /// Western edge (minimum longitude).
    pub fn lon_west(&self) -> f64 {
        self.west
    }

    /// Southern edge (minimum latitude).
    pub fn lat_south(&self) -> f64 {
        self.south
    }

    /// Eastern edge (maximum longitude).
    pub fn lon_east(&self) -> f64 {
        self.east
    }

    /// Northern edge (maximum latitude).
    pub fn lat_north(&self) -> f64 {
        self.north
    }

    /// Center point of the box.
    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south + self.north) / 2.0,
            lon: (self.west + self.east) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latlng_valid() {
        let point = LatLng::new(39.38, -104.86).unwrap();
        assert_eq!(point.lat, 39.38);
        assert_eq!(point.lon, -104.86);
    }

    #[test]
    fn test_latlng_invalid_latitude() {
        let result = LatLng::new(91.0, 0.0);
        assert_eq!(result, Err(GeoError::InvalidLatitude(91.0)));
    }

    #[test]
    fn test_latlng_invalid_longitude() {
        let result = LatLng::new(0.0, -200.0);
        assert_eq!(result, Err(GeoError::InvalidLongitude(-200.0)));
    }

    #[test]
    fn test_bounds_accessors() {
        let bounds = LatLngBounds::new(-104.9, 39.3, -104.8, 39.45).unwrap();
        assert_eq!(bounds.lon_west(), -104.9);
        assert_eq!(bounds.lat_south(), 39.3);
        assert_eq!(bounds.lon_east(), -104.8);
        assert_eq!(bounds.lat_north(), 39.45);
    }

    #[test]
    fn test_bounds_crossed_edges_rejected() {
        let result = LatLngBounds::new(10.0, 0.0, -10.0, 5.0);
        assert!(matches!(result, Err(GeoError::InvalidBounds { .. })));

        let result = LatLngBounds::new(0.0, 10.0, 5.0, -10.0);
        assert!(matches!(result, Err(GeoError::InvalidBounds { .. })));
    }

    #[test]
    fn test_bounds_center() {
        let bounds = LatLngBounds::new(-104.9, 39.3, -104.8, 39.45).unwrap();
        let center = bounds.center();
        assert!((center.lon - -104.85).abs() < 1e-9);
        assert!((center.lat - 39.375).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_around_center() {
        let center = LatLng::new(39.38, -104.86).unwrap();
        let bounds = LatLngBounds::around(center, 0.1);
        assert!((bounds.lon_west() - -104.91).abs() < 1e-9);
        assert!((bounds.lon_east() - -104.81).abs() < 1e-9);
        assert!((bounds.lat_south() - 39.33).abs() < 1e-9);
        assert!((bounds.lat_north() - 39.43).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_around_clamps_at_pole() {
        let center = LatLng::new(89.99, 0.0).unwrap();
        let bounds = LatLngBounds::around(center, 1.0);
        assert_eq!(bounds.lat_north(), MAX_LAT);
    }
}
