//! Map view collaborator.
//!
//! The controller never owns the map; it only queries the current camera
//! (visible bounds, zoom, pixel density) and forwards host lifecycle
//! transitions verbatim. [`StaticMapView`] is a fixed-camera implementation
//! for tests and the demo CLI.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::geo::{LatLng, LatLngBounds};

/// Host lifecycle stages forwarded to the map view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStage {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
}

/// Read-only camera access plus lifecycle forwarding targets.
///
/// All implementations must be `Send + Sync`; the controller holds the view
/// behind an `Arc` and queries it from async tasks.
pub trait MapView: Send + Sync {
    /// The currently visible bounding box.
    fn visible_bounds(&self) -> LatLngBounds;

    /// The current camera zoom.
    fn zoom(&self) -> f64;

    /// Device pixel-density scalar.
    fn pixel_ratio(&self) -> f32;

    /// Receive a host lifecycle transition. No additional logic is expected.
    fn lifecycle(&self, stage: LifecycleStage);
}

/// Map view with a fixed camera.
pub struct StaticMapView {
    bounds: LatLngBounds,
    zoom: f64,
    pixel_ratio: f32,
    lifecycle_calls: AtomicUsize,
}

impl StaticMapView {
    /// Create a view showing exactly the given bounds.
    pub fn new(bounds: LatLngBounds, zoom: f64, pixel_ratio: f32) -> Self {
        Self {
            bounds,
            zoom,
            pixel_ratio,
            lifecycle_calls: AtomicUsize::new(0),
        }
    }

    /// Create a view centered on a point, spanning `span_deg` degrees.
    pub fn centered(center: LatLng, span_deg: f64, zoom: f64, pixel_ratio: f32) -> Self {
        Self::new(LatLngBounds::around(center, span_deg), zoom, pixel_ratio)
    }

    /// Number of lifecycle transitions received.
    pub fn lifecycle_calls(&self) -> usize {
        self.lifecycle_calls.load(Ordering::Relaxed)
    }
}

impl MapView for StaticMapView {
    fn visible_bounds(&self) -> LatLngBounds {
        self.bounds
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn lifecycle(&self, stage: LifecycleStage) {
        self.lifecycle_calls.fetch_add(1, Ordering::Relaxed);
        debug!(?stage, "map lifecycle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_view_reports_camera() {
        let bounds = LatLngBounds::new(-104.9, 39.3, -104.8, 39.45).unwrap();
        let view = StaticMapView::new(bounds, 13.0, 2.0);

        assert_eq!(view.visible_bounds(), bounds);
        assert_eq!(view.zoom(), 13.0);
        assert_eq!(view.pixel_ratio(), 2.0);
    }

    #[test]
    fn test_static_view_counts_lifecycle() {
        let bounds = LatLngBounds::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let view = StaticMapView::new(bounds, 10.0, 1.0);

        view.lifecycle(LifecycleStage::Create);
        view.lifecycle(LifecycleStage::Start);
        view.lifecycle(LifecycleStage::Resume);

        assert_eq!(view.lifecycle_calls(), 3);
    }

    #[test]
    fn test_centered_view() {
        let center = LatLng::new(39.38, -104.86).unwrap();
        let view = StaticMapView::centered(center, 0.1, 13.0, 1.0);

        let bounds = view.visible_bounds();
        assert!((bounds.center().lat - 39.38).abs() < 1e-9);
        assert!((bounds.center().lon - -104.86).abs() < 1e-9);
    }
}
