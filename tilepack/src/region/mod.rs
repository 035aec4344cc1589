//! Offline region definitions, status, and metadata.
//!
//! A region is a named, bounded set of map tiles cached for offline use.
//! This module provides the types the caller hands to the offline store
//! when requesting a region ([`RegionDefinition`], [`RegionMetadata`]) and
//! the types the store reports back ([`RegionStatus`]).

mod metadata;
mod status;

pub use metadata::{MetadataError, RegionMetadata, UNKNOWN_NAME};
pub use status::{progress_percent, DownloadState, RegionStatus};

use crate::geo::LatLngBounds;
use crate::style::StyleReference;

/// Floor applied to a region's maximum zoom.
///
/// Tile count grows exponentially with the maximum zoom level, so the
/// ceiling is kept conservative: two levels above the current zoom, but
/// never below this floor.
pub const MAX_ZOOM_FLOOR: f64 = 14.0;

/// Compute the maximum zoom for a region captured at the given zoom.
///
/// Returns `max(14.0, zoom + 2.0)`.
#[inline]
pub fn max_zoom_for(zoom: f64) -> f64 {
    MAX_ZOOM_FLOOR.max(zoom + 2.0)
}

/// Describes a downloadable tile cache.
///
/// Constructed fresh for each download request and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDefinition {
    /// Style the tiles are downloaded for.
    pub style: StyleReference,
    /// Geographic extent of the region.
    pub bounds: LatLngBounds,
    /// Minimum zoom level to cache.
    pub min_zoom: f64,
    /// Maximum zoom level to cache.
    pub max_zoom: f64,
    /// Device pixel-density scalar.
    pub pixel_ratio: f32,
}

impl RegionDefinition {
    /// Build a definition covering the given viewport.
    ///
    /// The viewport's zoom becomes the minimum zoom; the maximum zoom is
    /// derived via [`max_zoom_for`] so the region stays usable when zoomed
    /// further in without an unbounded tile count.
    pub fn for_viewport(
        style: StyleReference,
        bounds: LatLngBounds,
        zoom: f64,
        pixel_ratio: f32,
    ) -> Self {
        Self {
            style,
            bounds,
            min_zoom: zoom,
            max_zoom: max_zoom_for(zoom),
            pixel_ratio,
        }
    }
}
