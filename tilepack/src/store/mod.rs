//! Offline-storage service abstraction.
//!
//! The [`OfflineStore`] trait is the boundary to the external service that
//! owns tile persistence, fetching, and retry policy. Callers create
//! regions from a [`RegionDefinition`] plus opaque metadata bytes and get
//! back [`OfflineRegion`] handles for status queries, state changes, and
//! deletion.
//!
//! # Design Principles
//!
//! - **Opaque metadata**: the store never interprets the metadata bytes it
//!   holds for a region
//! - **Events over callbacks**: progress is delivered through a broadcast
//!   channel per region instead of a single observer slot
//! - **Dyn-compatible**: uses `Pin<Box<dyn Future>>` so stores and regions
//!   can be held as trait objects (`Arc<dyn OfflineStore>`)
//! - **Retry stays inside**: per-resource fetch failures are reported as
//!   informational events; the store retries them itself and callers must
//!   not treat them as fatal
//!
//! # Example
//!
//! ```ignore
//! use tilepack::store::{MemoryStore, OfflineStore};
//!
//! let store = MemoryStore::new();
//! let region = store.create_region(definition, metadata_bytes).await?;
//! let mut events = region.subscribe();
//! region.set_download_state(DownloadState::Active).await?;
//! while let Ok(event) = events.recv().await {
//!     // drive UI from StatusChanged events
//! }
//! ```

mod memory;

pub use memory::{MemoryStore, SimulationConfig};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::region::{DownloadState, RegionDefinition, RegionStatus};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors reported by the offline store.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// The store could not list its regions.
    #[error("could not load list of offline regions: {0}")]
    ListFailed(String),

    /// The store rejected a region creation request.
    #[error("could not create offline region: {0}")]
    CreateFailed(String),

    /// The referenced region no longer exists.
    #[error("offline region {0} not found")]
    RegionNotFound(u64),

    /// A region must be inactive before it can be deleted.
    #[error("offline region {0} is still downloading")]
    RegionActive(u64),

    /// The store is shutting down.
    #[error("offline store is shutting down")]
    ShuttingDown,
}

/// Events emitted by a region while its download runs.
#[derive(Debug, Clone)]
pub enum RegionEvent {
    /// Progress or state changed; carries the full status snapshot.
    StatusChanged(RegionStatus),

    /// The store's global tile-count limit was reached.
    ///
    /// The download stops when this fires; the limit itself is configured
    /// through [`OfflineStore::set_tile_count_limit`].
    TileCountLimitExceeded(u64),

    /// A single resource failed to download.
    ///
    /// Informational only: the store retries failed resources internally,
    /// so this never terminates the download.
    ResourceError(String),
}

/// Handle to a region created by the offline store.
///
/// The store owns the region's persistence; holders of this handle only
/// query and steer it. Handles are cheap to clone via `Arc`.
pub trait OfflineRegion: Send + Sync {
    /// Store-issued identifier for this region.
    fn id(&self) -> u64;

    /// The definition this region was created from.
    fn definition(&self) -> &RegionDefinition;

    /// The opaque metadata bytes attached at creation time.
    fn metadata(&self) -> Vec<u8>;

    /// Query the region's current download status.
    fn status(&self) -> BoxFuture<'_, Result<RegionStatus, StoreError>>;

    /// Start or pause the region's download.
    ///
    /// Setting [`DownloadState::Active`] is what actually begins
    /// transferring data for a freshly created region.
    fn set_download_state(&self, state: DownloadState) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Delete the region and its cached tiles.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RegionActive`] if the region is still
    /// downloading; set it inactive first.
    fn delete(&self) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Subscribe to this region's event stream.
    ///
    /// Subscribe before activating the region to observe the download from
    /// its first status change.
    fn subscribe(&self) -> broadcast::Receiver<RegionEvent>;
}

/// Asynchronous offline-storage service.
///
/// All implementations must be `Send + Sync` for use across async tasks.
pub trait OfflineStore: Send + Sync {
    /// List every region the store currently holds.
    fn list_regions(&self) -> BoxFuture<'_, Result<Vec<Arc<dyn OfflineRegion>>, StoreError>>;

    /// Create a new region from a definition and opaque metadata bytes.
    ///
    /// The region is created inactive; activate it with
    /// [`OfflineRegion::set_download_state`].
    fn create_region(
        &self,
        definition: RegionDefinition,
        metadata: Vec<u8>,
    ) -> BoxFuture<'_, Result<Arc<dyn OfflineRegion>, StoreError>>;

    /// Set the global tile-count limit across all regions.
    ///
    /// Downloads that would exceed the limit stop with a
    /// [`RegionEvent::TileCountLimitExceeded`] event.
    fn set_tile_count_limit(&self, limit: u64);
}
