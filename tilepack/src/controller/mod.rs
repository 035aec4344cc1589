//! Offline region controller.
//!
//! `OfflineRegionController` mediates between a map view, a single toggle
//! control, a progress indicator, and the offline store. It owns no
//! persistent state: a pack-name counter, a progress percentage, and one
//! explicit [`ControllerState`] are all it carries.
//!
//! # State machine
//!
//! ```text
//!          toggle                    download complete /
//!   Idle ─────────► Downloading ───► limit exceeded ───► Idle
//!                        │
//!                        │ toggle
//!                        ▼
//!                    Canceling ────► Idle
//! ```
//!
//! Every transition goes through one serialized compare-and-set; a
//! transition whose source state no longer matches is rejected rather than
//! applied, so overlapping toggles and late download events cannot corrupt
//! the visible state. The toggle control's selected flag, label, and the
//! progress indicator's visibility are all derived from the current state
//! (see [`ControlState`]), never written independently.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, OfflineConfig};
use crate::map::{LifecycleStage, MapView};
use crate::region::{
    progress_percent, DownloadState, MetadataError, RegionDefinition, RegionMetadata, UNKNOWN_NAME,
};
use crate::store::{OfflineStore, RegionEvent, StoreError};
use crate::style::StyleReference;

/// Label shown on the toggle control while idle.
pub const LABEL_CREATE_CACHE: &str = "create cache";
/// Label shown on the toggle control while a download is in flight.
pub const LABEL_CANCEL: &str = "cancel";

/// The controller's explicit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No download in flight.
    Idle,
    /// A download was started and has not finished.
    Downloading,
    /// Active regions are being torn down.
    Canceling,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Downloading => write!(f, "downloading"),
            Self::Canceling => write!(f, "canceling"),
        }
    }
}

/// Errors reported by the controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Fatal configuration error; nothing was started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Pack metadata could not be encoded; the download was not requested.
    #[error("failed to encode pack metadata: {0}")]
    Metadata(#[from] MetadataError),

    /// The offline store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The requested operation is not valid in the current state.
    #[error("operation rejected while {state}")]
    InvalidTransition {
        /// State the controller was in when the operation was rejected.
        state: ControllerState,
    },
}

/// Snapshot of the UI control surface, derived from controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    /// Whether the toggle control is shown (the map has finished loading).
    pub button_visible: bool,
    /// Whether the toggle control is selected.
    pub selected: bool,
    /// Label on the toggle control.
    pub label: &'static str,
    /// Whether the progress indicator is shown.
    pub progress_visible: bool,
    /// Progress as an integer percent, 0-100.
    pub progress_percent: u8,
}

/// A listed pack: its style URI and decoded metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PackSummary {
    /// Style URI the pack was downloaded for.
    pub style: String,
    /// Decoded metadata (name and bounds).
    pub metadata: RegionMetadata,
}

/// Attempt the `from` → `to` transition; false if the state has moved on.
fn try_transition(state: &Mutex<ControllerState>, from: ControllerState, to: ControllerState) -> bool {
    let mut current = state.lock();
    if *current == from {
        *current = to;
        true
    } else {
        false
    }
}

/// Mediates between a map view, the toggle/progress controls, and the
/// offline store.
pub struct OfflineRegionController {
    store: Arc<dyn OfflineStore>,
    map: Arc<dyn MapView>,
    style: StyleReference,
    state: Arc<Mutex<ControllerState>>,
    progress: Arc<AtomicU8>,
    pack_counter: AtomicU64,
    map_ready: AtomicBool,
}

impl OfflineRegionController {
    /// Create a controller for the given store and map view.
    ///
    /// Validates the configuration and builds the composite style reference
    /// before touching the store or the map; a blank style URL, API key, or
    /// renderer token fails here. On success the store's tile-count limit
    /// is lifted: this style's tiles are not subject to the provider's own
    /// quota.
    pub fn new(
        config: &OfflineConfig,
        store: Arc<dyn OfflineStore>,
        map: Arc<dyn MapView>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let style = StyleReference::new(&config.style_url, &config.api_key)?;

        store.set_tile_count_limit(u64::MAX);
        info!(style = %style, "offline region controller ready");

        Ok(Self {
            store,
            map,
            style,
            state: Arc::new(Mutex::new(ControllerState::Idle)),
            progress: Arc::new(AtomicU8::new(0)),
            pack_counter: AtomicU64::new(0),
            map_ready: AtomicBool::new(false),
        })
    }

    /// The controller's current state.
    pub fn state(&self) -> ControllerState {
        *self.state.lock()
    }

    /// The style reference downloads are created for.
    pub fn style(&self) -> &StyleReference {
        &self.style
    }

    /// Current value of the pack-name counter.
    pub fn pack_counter(&self) -> u64 {
        self.pack_counter.load(Ordering::Relaxed)
    }

    /// Snapshot of the UI control surface.
    pub fn control_state(&self) -> ControlState {
        let state = self.state();
        let (selected, label, progress_visible) = match state {
            ControllerState::Idle => (false, LABEL_CREATE_CACHE, false),
            ControllerState::Downloading | ControllerState::Canceling => {
                (true, LABEL_CANCEL, true)
            }
        };
        ControlState {
            button_visible: self.map_ready.load(Ordering::Relaxed),
            selected,
            label,
            progress_visible,
            progress_percent: self.progress.load(Ordering::Relaxed),
        }
    }

    /// Called once the map style has loaded: reveals the toggle control and
    /// lists the packs already cached.
    pub async fn map_finished_loading(&self) -> Result<Vec<PackSummary>, ControllerError> {
        info!("map finished loading");
        self.map_ready.store(true, Ordering::Relaxed);
        self.list_packs().await
    }

    /// List cached packs and their decoded metadata.
    ///
    /// Seeds the pack-name counter with the number of listed regions so
    /// default names continue past packs created in earlier runs. Listing
    /// failures are logged and returned; nothing is retried and no region
    /// state is mutated.
    pub async fn list_packs(&self) -> Result<Vec<PackSummary>, ControllerError> {
        let regions = match self.store.list_regions().await {
            Ok(regions) => regions,
            Err(e) => {
                error!(error = %e, "could not load list of offline packs");
                return Err(e.into());
            }
        };
        self.pack_counter.store(regions.len() as u64, Ordering::Relaxed);

        let mut packs = Vec::with_capacity(regions.len());
        for region in regions {
            let metadata = match RegionMetadata::from_bytes(&region.metadata()) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(region = region.id(), error = %e, "pack metadata unreadable, skipping");
                    continue;
                }
            };
            let style = region.definition().style.uri().to_string();
            info!(
                name = %metadata.name,
                style = %style,
                minx = metadata.minx,
                miny = metadata.miny,
                maxx = metadata.maxx,
                maxy = metadata.maxy,
                "offline pack"
            );
            packs.push(PackSummary { style, metadata });
        }
        Ok(packs)
    }

    /// The single UI control's action: start a download when idle, cancel
    /// when downloading. Rejected while a cancel is already in progress.
    pub async fn toggle(&self) -> Result<ControllerState, ControllerError> {
        let current = self.state();
        match current {
            ControllerState::Idle => {
                self.start_download().await?;
                Ok(ControllerState::Downloading)
            }
            ControllerState::Downloading => {
                self.cancel_active().await?;
                Ok(ControllerState::Idle)
            }
            ControllerState::Canceling => Err(ControllerError::InvalidTransition { state: current }),
        }
    }

    /// Start caching the current viewport.
    ///
    /// Captures the visible bounds and zoom from the map view, derives the
    /// zoom range and a default pack name, creates the region, and activates
    /// its download. The event task spawned here drives progress and the
    /// eventual return to idle.
    pub async fn start_download(&self) -> Result<(), ControllerError> {
        self.transition(ControllerState::Idle, ControllerState::Downloading)?;
        self.progress.store(0, Ordering::Relaxed);

        let bounds = self.map.visible_bounds();
        let zoom = self.map.zoom();
        let definition =
            RegionDefinition::for_viewport(self.style.clone(), bounds, zoom, self.map.pixel_ratio());
        let max_zoom = definition.max_zoom;

        let number = self.pack_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let name = format!("Offline Pack {}", number);

        let metadata = RegionMetadata::new(name.clone(), bounds);
        let bytes = match metadata.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(name = %name, error = %e, "failed to encode pack metadata");
                self.abort_download();
                return Err(e.into());
            }
        };

        let region = match self.store.create_region(definition, bytes).await {
            Ok(region) => region,
            Err(e) => {
                error!(name = %name, error = %e, "could not create offline region");
                self.abort_download();
                return Err(e.into());
            }
        };

        // Subscribe before activating so the first status change is observed.
        self.spawn_event_task(name.clone(), region.subscribe());

        if let Err(e) = region.set_download_state(DownloadState::Active).await {
            error!(name = %name, error = %e, "could not start offline pack download");
            self.abort_download();
            return Err(e.into());
        }

        info!(name = %name, min_zoom = zoom, max_zoom, "offline pack download started");
        Ok(())
    }

    /// Tear down every region whose download is currently active.
    ///
    /// Regions that are already inactive (including completed packs) are
    /// left alone. Per-region failures are logged and do not roll back the
    /// deletions that already happened; the controller returns to idle
    /// exactly once at the end regardless.
    pub async fn cancel_active(&self) -> Result<(), ControllerError> {
        self.transition(ControllerState::Downloading, ControllerState::Canceling)?;

        let result = self.tear_down_active().await;

        try_transition(
            &self.state,
            ControllerState::Canceling,
            ControllerState::Idle,
        );
        self.progress.store(0, Ordering::Relaxed);
        result
    }

    async fn tear_down_active(&self) -> Result<(), ControllerError> {
        let regions = match self.store.list_regions().await {
            Ok(regions) => regions,
            Err(e) => {
                error!(error = %e, "could not load list of offline packs");
                return Err(e.into());
            }
        };

        for region in regions {
            let status = match region.status().await {
                Ok(status) => status,
                Err(e) => {
                    error!(region = region.id(), error = %e, "could not get status of offline pack");
                    continue;
                }
            };
            if status.download_state != DownloadState::Active {
                continue;
            }

            let name = RegionMetadata::from_bytes(&region.metadata())
                .map(|metadata| metadata.name)
                .unwrap_or_else(|_| UNKNOWN_NAME.to_string());

            if let Err(e) = region.set_download_state(DownloadState::Inactive).await {
                error!(name = %name, error = %e, "could not stop offline pack download");
                continue;
            }
            match region.delete().await {
                Ok(()) => info!(name = %name, "offline pack deleted"),
                Err(e) => error!(name = %name, error = %e, "could not delete offline pack"),
            }
        }
        Ok(())
    }

    /// Drive progress and termination from a region's event stream.
    fn spawn_event_task(&self, name: String, mut events: broadcast::Receiver<RegionEvent>) {
        let state = Arc::clone(&self.state);
        let progress = Arc::clone(&self.progress);

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(RegionEvent::StatusChanged(status)) => {
                        progress.store(progress_percent(&status), Ordering::Relaxed);
                        if status.complete {
                            info!(
                                name = %name,
                                bytes = status.completed_resource_size,
                                resources = status.completed_resource_count,
                                "offline pack completed"
                            );
                            if !try_transition(
                                &state,
                                ControllerState::Downloading,
                                ControllerState::Idle,
                            ) {
                                // A cancel got there first; nothing to undo.
                                debug!(name = %name, "completion after state already moved on");
                            }
                            break;
                        }
                    }
                    Ok(RegionEvent::TileCountLimitExceeded(limit)) => {
                        warn!(name = %name, limit, "offline pack reached tile count limit");
                        progress.store(0, Ordering::Relaxed);
                        try_transition(&state, ControllerState::Downloading, ControllerState::Idle);
                        break;
                    }
                    Ok(RegionEvent::ResourceError(reason)) => {
                        // The store retries failed resources itself; the
                        // download keeps going.
                        warn!(name = %name, reason = %reason, "offline pack resource error");
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(name = %name, missed, "event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    fn transition(&self, from: ControllerState, to: ControllerState) -> Result<(), ControllerError> {
        if try_transition(&self.state, from, to) {
            Ok(())
        } else {
            Err(ControllerError::InvalidTransition {
                state: self.state(),
            })
        }
    }

    fn abort_download(&self) {
        try_transition(
            &self.state,
            ControllerState::Downloading,
            ControllerState::Idle,
        );
        self.progress.store(0, Ordering::Relaxed);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Host lifecycle forwarding
    // ─────────────────────────────────────────────────────────────────────

    /// Forward host creation to the map view.
    pub fn on_create(&self) {
        self.map.lifecycle(LifecycleStage::Create);
    }

    /// Forward host start to the map view.
    pub fn on_start(&self) {
        self.map.lifecycle(LifecycleStage::Start);
    }

    /// Forward host resume to the map view.
    pub fn on_resume(&self) {
        self.map.lifecycle(LifecycleStage::Resume);
    }

    /// Forward host pause to the map view.
    pub fn on_pause(&self) {
        self.map.lifecycle(LifecycleStage::Pause);
    }

    /// Forward host stop to the map view.
    pub fn on_stop(&self) {
        self.map.lifecycle(LifecycleStage::Stop);
    }
}
