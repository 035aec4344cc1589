//! CLI command implementations.

pub mod config;
pub mod download;
pub mod list;

use std::sync::Arc;

use tilepack::geo::LatLng;
use tilepack::map::StaticMapView;
use tilepack::store::{MemoryStore, SimulationConfig};
use tilepack::{ConfigFile, OfflineConfig, OfflineRegionController};

use crate::error::CliError;

/// Default demo camera: Castle Rock CO.
pub fn demo_view(zoom: f64) -> Arc<StaticMapView> {
    let center = LatLng::new(39.38, -104.86).expect("demo camera is valid");
    Arc::new(StaticMapView::centered(center, 0.15, zoom, 1.0))
}

/// Resolve configuration and build a controller over the given store.
pub fn build_controller(
    store: Arc<MemoryStore>,
    view: Arc<StaticMapView>,
) -> Result<OfflineRegionController, CliError> {
    let file = ConfigFile::load().unwrap_or_default();
    let config = OfflineConfig::from_file(&file);
    Ok(OfflineRegionController::new(&config, store, view)?)
}

/// Simulation used by the demo commands.
pub fn demo_simulation() -> SimulationConfig {
    SimulationConfig {
        required_resources: 400,
        bytes_per_resource: 24 * 1024,
        tick_interval: std::time::Duration::from_millis(25),
        resources_per_tick: 4,
        resource_error_at: None,
    }
}
