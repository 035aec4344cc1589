//! Region metadata wire format.
//!
//! Metadata is an opaque byte blob attached to a region at creation time
//! and read back when listing regions. The wire format is a flat JSON
//! object with exactly the keys `name`, `minx`, `miny`, `maxx`, `maxy`;
//! there is no version field. Decoding is lenient: absent or mistyped
//! fields fall back to `"unknown"` for the name and `0.0` for the bounds,
//! so metadata written by older or foreign callers still lists.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::geo::LatLngBounds;

/// Name reported for metadata whose `name` key is absent or mistyped.
pub const UNKNOWN_NAME: &str = "unknown";

/// Errors produced when encoding or decoding region metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The metadata bytes are not valid JSON.
    #[error("metadata is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Human-readable record attached to a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionMetadata {
    /// Display name of the pack.
    pub name: String,
    /// Western edge of the pack's bounds, degrees.
    pub minx: f64,
    /// Southern edge of the pack's bounds, degrees.
    pub miny: f64,
    /// Eastern edge of the pack's bounds, degrees.
    pub maxx: f64,
    /// Northern edge of the pack's bounds, degrees.
    pub maxy: f64,
}

impl RegionMetadata {
    /// Build metadata for a named pack covering the given bounds.
    pub fn new(name: impl Into<String>, bounds: LatLngBounds) -> Self {
        Self {
            name: name.into(),
            minx: bounds.lon_west(),
            miny: bounds.lat_south(),
            maxx: bounds.lon_east(),
            maxy: bounds.lat_north(),
        }
    }

    /// Encode to the JSON byte format stored with the region.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MetadataError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode metadata bytes, tolerating absent or mistyped fields.
    ///
    /// Only malformed JSON is an error; individual fields fall back to
    /// their defaults.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetadataError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self {
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_NAME)
                .to_string(),
            minx: value.get("minx").and_then(Value::as_f64).unwrap_or(0.0),
            miny: value.get("miny").and_then(Value::as_f64).unwrap_or(0.0),
            maxx: value.get("maxx").and_then(Value::as_f64).unwrap_or(0.0),
            maxy: value.get("maxy").and_then(Value::as_f64).unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_exact_wire_format() {
        let bounds = LatLngBounds::new(-104.9, 39.3, -104.8, 39.45).unwrap();
        let metadata = RegionMetadata::new("Offline Pack 1", bounds);

        let bytes = metadata.to_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"name":"Offline Pack 1","minx":-104.9,"miny":39.3,"maxx":-104.8,"maxy":39.45}"#
        );
    }

    #[test]
    fn test_round_trip() {
        let bounds = LatLngBounds::new(-104.9, 39.3, -104.8, 39.45).unwrap();
        let metadata = RegionMetadata::new("Offline Pack 7", bounds);

        let decoded = RegionMetadata::from_bytes(&metadata.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, metadata);
    }

    #[test]
    fn test_decode_missing_fields_default() {
        let decoded = RegionMetadata::from_bytes(b"{}").unwrap();
        assert_eq!(decoded.name, UNKNOWN_NAME);
        assert_eq!(decoded.minx, 0.0);
        assert_eq!(decoded.miny, 0.0);
        assert_eq!(decoded.maxx, 0.0);
        assert_eq!(decoded.maxy, 0.0);
    }

    #[test]
    fn test_decode_mistyped_fields_default() {
        let decoded =
            RegionMetadata::from_bytes(br#"{"name":42,"minx":"west","maxy":1.5}"#).unwrap();
        assert_eq!(decoded.name, UNKNOWN_NAME);
        assert_eq!(decoded.minx, 0.0);
        assert_eq!(decoded.maxy, 1.5);
    }

    #[test]
    fn test_decode_malformed_json_is_error() {
        let result = RegionMetadata::from_bytes(b"not json");
        assert!(matches!(result, Err(MetadataError::InvalidJson(_))));
    }

    proptest! {
        #[test]
        fn prop_round_trip_preserves_name_and_bounds(
            name in "[a-zA-Z0-9 ]{0,32}",
            west in -180.0f64..0.0,
            south in -90.0f64..0.0,
            east in 0.0f64..180.0,
            north in 0.0f64..90.0,
        ) {
            let bounds = LatLngBounds::new(west, south, east, north).unwrap();
            let metadata = RegionMetadata::new(name, bounds);
            let decoded = RegionMetadata::from_bytes(&metadata.to_bytes().unwrap()).unwrap();
            prop_assert_eq!(decoded, metadata);
        }
    }
}
