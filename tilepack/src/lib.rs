//! Tilepack - Offline map region management
//!
//! This library provides the building blocks for creating, monitoring, and
//! deleting offline map tile caches against an asynchronous offline-storage
//! backend. The storage backend owns tile fetching, persistence, and retry
//! policy; this crate owns the region bookkeeping around it: geographic
//! bounds, style references, region definitions and metadata, and the
//! [`controller::OfflineRegionController`] state machine that drives the
//! download/cancel flow.

pub mod config;
pub mod controller;
pub mod geo;
pub mod logging;
pub mod map;
pub mod region;
pub mod store;
pub mod style;

pub use config::{ConfigError, ConfigFile, ConfigKey, OfflineConfig};
pub use controller::{
    ControlState, ControllerError, ControllerState, OfflineRegionController, PackSummary,
};
pub use geo::{GeoError, LatLng, LatLngBounds};
pub use map::{LifecycleStage, MapView, StaticMapView};
pub use region::{
    progress_percent, DownloadState, MetadataError, RegionDefinition, RegionMetadata, RegionStatus,
};
pub use store::{MemoryStore, OfflineRegion, OfflineStore, RegionEvent, SimulationConfig, StoreError};
pub use style::StyleReference;
