//! List cached offline packs.

use std::sync::Arc;

use clap::Args;

use tilepack::controller::ControllerError;
use tilepack::geo::{LatLng, LatLngBounds};
use tilepack::region::{RegionDefinition, RegionMetadata};
use tilepack::store::{MemoryStore, OfflineStore};

use crate::commands::{build_controller, demo_view};
use crate::error::CliError;

/// Arguments for `tilepack list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Seed this many simulated cached packs before listing
    #[arg(long, default_value_t = 0)]
    pub seed: usize,
}

/// Run `tilepack list`.
pub async fn run(args: ListArgs) -> Result<(), CliError> {
    let store = Arc::new(MemoryStore::new());
    let controller = build_controller(store.clone(), demo_view(13.0))?;

    for n in 0..args.seed {
        let lon = -104.86 + ((n as f64 * 0.5) % 60.0);
        let center = LatLng::new(39.38, lon)
            .map_err(|e| CliError::Runtime(format!("seed camera out of range: {}", e)))?;
        let bounds = LatLngBounds::around(center, 0.15);
        let metadata = RegionMetadata::new(format!("Offline Pack {}", n + 1), bounds);
        let definition =
            RegionDefinition::for_viewport(controller.style().clone(), bounds, 12.0, 1.0);
        let bytes = metadata.to_bytes().map_err(ControllerError::from)?;
        store
            .create_region(definition, bytes)
            .await
            .map_err(ControllerError::from)?;
    }

    let packs = controller.list_packs().await?;
    if packs.is_empty() {
        println!("No offline packs cached");
        return Ok(());
    }

    println!("Offline packs ({}):", packs.len());
    for pack in packs {
        println!(
            "  {}  bounds [{}, {}] - [{}, {}]",
            pack.metadata.name,
            pack.metadata.minx,
            pack.metadata.miny,
            pack.metadata.maxx,
            pack.metadata.maxy
        );
    }
    Ok(())
}
