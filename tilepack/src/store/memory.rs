//! In-memory offline store.
//!
//! This store keeps regions in a `DashMap` and simulates their downloads:
//! activating a region spawns a tokio task that ticks the completed
//! resource count toward a configured total, emitting `StatusChanged`
//! events along the way. No tiles are fetched or persisted; the simulation
//! exists so the surrounding region-management flow can be exercised end to
//! end in tests and demos.
//!
//! # Why DashMap?
//!
//! Regions are created, listed, and deleted from concurrent async tasks.
//! `DashMap` gives shard-level locking without a global mutex around the
//! region table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::region::{DownloadState, RegionDefinition, RegionStatus};
use crate::store::{BoxFuture, OfflineRegion, OfflineStore, RegionEvent, StoreError};

/// Capacity of each region's event channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Parameters controlling the simulated download.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Total number of resources a region download requires.
    pub required_resources: u64,
    /// Size reported per downloaded resource, in bytes.
    pub bytes_per_resource: u64,
    /// Time between progress ticks.
    pub tick_interval: Duration,
    /// Resources completed per tick.
    pub resources_per_tick: u64,
    /// Emit a single informational resource error once this many resources
    /// have completed. The download continues regardless.
    pub resource_error_at: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            required_resources: 200,
            bytes_per_resource: 4096,
            tick_interval: Duration::from_millis(10),
            resources_per_tick: 25,
            resource_error_at: None,
        }
    }
}

/// In-memory [`OfflineStore`] implementation with simulated downloads.
pub struct MemoryStore {
    regions: Arc<DashMap<u64, Arc<MemoryRegion>>>,
    next_id: AtomicU64,
    tile_limit: Arc<AtomicU64>,
    simulation: SimulationConfig,
    shutdown: CancellationToken,
}

impl MemoryStore {
    /// Create a store with the default simulation parameters.
    pub fn new() -> Self {
        Self::with_simulation(SimulationConfig::default())
    }

    /// Create a store with explicit simulation parameters.
    pub fn with_simulation(simulation: SimulationConfig) -> Self {
        Self {
            regions: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
            tile_limit: Arc::new(AtomicU64::new(u64::MAX)),
            simulation,
            shutdown: CancellationToken::new(),
        }
    }

    /// Number of regions currently held.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// The currently configured tile-count limit.
    pub fn tile_count_limit(&self) -> u64 {
        self.tile_limit.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        // Stops any in-flight simulation tasks.
        self.shutdown.cancel();
    }
}

impl OfflineStore for MemoryStore {
    fn list_regions(&self) -> BoxFuture<'_, Result<Vec<Arc<dyn OfflineRegion>>, StoreError>> {
        Box::pin(async move {
            let mut regions: Vec<Arc<MemoryRegion>> =
                self.regions.iter().map(|entry| entry.value().clone()).collect();
            // DashMap iteration order is not stable; list in creation order.
            regions.sort_by_key(|region| region.id);
            Ok(regions
                .into_iter()
                .map(|region| region as Arc<dyn OfflineRegion>)
                .collect())
        })
    }

    fn create_region(
        &self,
        definition: RegionDefinition,
        metadata: Vec<u8>,
    ) -> BoxFuture<'_, Result<Arc<dyn OfflineRegion>, StoreError>> {
        Box::pin(async move {
            if self.shutdown.is_cancelled() {
                return Err(StoreError::ShuttingDown);
            }
            let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            let region = Arc::new(MemoryRegion {
                id,
                definition,
                metadata,
                status: Arc::new(Mutex::new(RegionStatus::inactive())),
                events: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
                tile_limit: Arc::clone(&self.tile_limit),
                simulation: self.simulation.clone(),
                regions: Arc::downgrade(&self.regions),
                shutdown: self.shutdown.child_token(),
            });
            self.regions.insert(id, Arc::clone(&region));
            debug!(region = id, "offline region created");
            Ok(region as Arc<dyn OfflineRegion>)
        })
    }

    fn set_tile_count_limit(&self, limit: u64) {
        self.tile_limit.store(limit, Ordering::Relaxed);
    }
}

/// A region held by [`MemoryStore`].
struct MemoryRegion {
    id: u64,
    definition: RegionDefinition,
    metadata: Vec<u8>,
    status: Arc<Mutex<RegionStatus>>,
    events: broadcast::Sender<RegionEvent>,
    tile_limit: Arc<AtomicU64>,
    simulation: SimulationConfig,
    /// Back-reference to the store's region table for deletion. Weak so a
    /// region handle kept alive by a caller does not keep the store alive.
    regions: Weak<DashMap<u64, Arc<MemoryRegion>>>,
    shutdown: CancellationToken,
}

impl MemoryRegion {
    /// Spawn the ticking task that simulates this region's download.
    ///
    /// Must be called from within a tokio runtime.
    fn spawn_download_task(&self) {
        let status = Arc::clone(&self.status);
        let events = self.events.clone();
        let tile_limit = Arc::clone(&self.tile_limit);
        let simulation = self.simulation.clone();
        let shutdown = self.shutdown.clone();
        let region_id = self.id;

        tokio::spawn(async move {
            let mut error_emitted = false;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!(region = region_id, "download simulation cancelled");
                        return;
                    }
                    _ = tokio::time::sleep(simulation.tick_interval) => {}
                }

                let snapshot = {
                    let mut status = status.lock();
                    if status.download_state != DownloadState::Active {
                        // Deactivated by the caller; stop ticking.
                        return;
                    }

                    let required = simulation.required_resources;
                    let step = simulation.resources_per_tick.max(1);
                    status.completed_resource_count =
                        (status.completed_resource_count + step).min(required);
                    status.completed_resource_size =
                        status.completed_resource_count * simulation.bytes_per_resource;

                    let limit = tile_limit.load(Ordering::Relaxed);
                    if status.completed_resource_count > limit {
                        status.download_state = DownloadState::Inactive;
                        let _ = events.send(RegionEvent::TileCountLimitExceeded(limit));
                        return;
                    }

                    if status.completed_resource_count >= required {
                        status.complete = true;
                        status.download_state = DownloadState::Inactive;
                    }
                    *status
                };

                if let Some(at) = simulation.resource_error_at {
                    if !error_emitted && snapshot.completed_resource_count >= at {
                        error_emitted = true;
                        let _ = events.send(RegionEvent::ResourceError(format!(
                            "resource {} failed, retrying",
                            at
                        )));
                    }
                }

                let _ = events.send(RegionEvent::StatusChanged(snapshot));
                if snapshot.complete {
                    debug!(
                        region = region_id,
                        resources = snapshot.completed_resource_count,
                        bytes = snapshot.completed_resource_size,
                        "download simulation complete"
                    );
                    return;
                }
            }
        });
    }
}

impl OfflineRegion for MemoryRegion {
    fn id(&self) -> u64 {
        self.id
    }

    fn definition(&self) -> &RegionDefinition {
        &self.definition
    }

    fn metadata(&self) -> Vec<u8> {
        self.metadata.clone()
    }

    fn status(&self) -> BoxFuture<'_, Result<RegionStatus, StoreError>> {
        Box::pin(async move { Ok(*self.status.lock()) })
    }

    fn set_download_state(&self, state: DownloadState) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let snapshot = {
                let mut status = self.status.lock();
                if status.download_state == state {
                    return Ok(());
                }
                status.download_state = state;
                if state == DownloadState::Active {
                    status.required_resource_count = self.simulation.required_resources as i64;
                }
                *status
            };

            if state == DownloadState::Active {
                self.spawn_download_task();
            }
            let _ = self.events.send(RegionEvent::StatusChanged(snapshot));
            Ok(())
        })
    }

    fn delete(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            if self.status.lock().download_state == DownloadState::Active {
                return Err(StoreError::RegionActive(self.id));
            }
            let regions = self.regions.upgrade().ok_or(StoreError::ShuttingDown)?;
            regions
                .remove(&self.id)
                .ok_or(StoreError::RegionNotFound(self.id))?;
            debug!(region = self.id, "offline region deleted");
            Ok(())
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<RegionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLngBounds;
    use crate::region::RegionDefinition;
    use crate::style::StyleReference;

    fn definition() -> RegionDefinition {
        let style = StyleReference::new("https://maps.example.com/style.json", "k").unwrap();
        let bounds = LatLngBounds::new(-104.9, 39.3, -104.8, 39.45).unwrap();
        RegionDefinition::for_viewport(style, bounds, 13.0, 1.0)
    }

    fn fast_simulation() -> SimulationConfig {
        SimulationConfig {
            required_resources: 100,
            bytes_per_resource: 10,
            tick_interval: Duration::from_millis(1),
            resources_per_tick: 50,
            resource_error_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let store = MemoryStore::new();
        assert_eq!(store.region_count(), 0);

        store
            .create_region(definition(), b"{}".to_vec())
            .await
            .unwrap();
        store
            .create_region(definition(), b"{}".to_vec())
            .await
            .unwrap();

        let regions = store.list_regions().await.unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].id(), 1);
        assert_eq!(regions[1].id(), 2);
    }

    #[tokio::test]
    async fn test_new_region_is_inactive() {
        let store = MemoryStore::new();
        let region = store
            .create_region(definition(), b"{}".to_vec())
            .await
            .unwrap();

        let status = region.status().await.unwrap();
        assert_eq!(status.download_state, DownloadState::Inactive);
        assert_eq!(status.required_resource_count, -1);
    }

    #[tokio::test]
    async fn test_metadata_is_preserved() {
        let store = MemoryStore::new();
        let region = store
            .create_region(definition(), b"\x00\x01binary".to_vec())
            .await
            .unwrap();

        assert_eq!(region.metadata(), b"\x00\x01binary".to_vec());
    }

    #[tokio::test]
    async fn test_download_runs_to_completion() {
        let store = MemoryStore::with_simulation(fast_simulation());
        let region = store
            .create_region(definition(), b"{}".to_vec())
            .await
            .unwrap();

        let mut events = region.subscribe();
        region
            .set_download_state(DownloadState::Active)
            .await
            .unwrap();

        let mut last = None;
        while let Ok(event) = events.recv().await {
            if let RegionEvent::StatusChanged(status) = event {
                last = Some(status);
                if status.complete {
                    break;
                }
            }
        }

        let status = last.expect("at least one status event");
        assert!(status.complete);
        assert_eq!(status.completed_resource_count, 100);
        assert_eq!(status.completed_resource_size, 1000);
        assert_eq!(status.download_state, DownloadState::Inactive);
    }

    #[tokio::test]
    async fn test_deactivation_stops_download() {
        let mut simulation = fast_simulation();
        simulation.resources_per_tick = 1;
        simulation.tick_interval = Duration::from_millis(5);
        let store = MemoryStore::with_simulation(simulation);
        let region = store
            .create_region(definition(), b"{}".to_vec())
            .await
            .unwrap();

        region
            .set_download_state(DownloadState::Active)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        region
            .set_download_state(DownloadState::Inactive)
            .await
            .unwrap();

        let frozen = region.status().await.unwrap();
        assert!(!frozen.complete);
        tokio::time::sleep(Duration::from_millis(30)).await;
        let later = region.status().await.unwrap();
        assert_eq!(
            frozen.completed_resource_count,
            later.completed_resource_count
        );
    }

    #[tokio::test]
    async fn test_delete_active_region_rejected() {
        let mut simulation = fast_simulation();
        simulation.resources_per_tick = 1;
        simulation.tick_interval = Duration::from_millis(50);
        let store = MemoryStore::with_simulation(simulation);
        let region = store
            .create_region(definition(), b"{}".to_vec())
            .await
            .unwrap();

        region
            .set_download_state(DownloadState::Active)
            .await
            .unwrap();

        let result = region.delete().await;
        assert!(matches!(result, Err(StoreError::RegionActive(1))));
        assert_eq!(store.region_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_inactive_region() {
        let store = MemoryStore::new();
        let region = store
            .create_region(definition(), b"{}".to_vec())
            .await
            .unwrap();

        region.delete().await.unwrap();
        assert_eq!(store.region_count(), 0);

        let result = region.delete().await;
        assert!(matches!(result, Err(StoreError::RegionNotFound(1))));
    }

    #[tokio::test]
    async fn test_tile_count_limit_stops_download() {
        let store = MemoryStore::with_simulation(fast_simulation());
        store.set_tile_count_limit(60);
        let region = store
            .create_region(definition(), b"{}".to_vec())
            .await
            .unwrap();

        let mut events = region.subscribe();
        region
            .set_download_state(DownloadState::Active)
            .await
            .unwrap();

        let mut limit_hit = None;
        while let Ok(event) = events.recv().await {
            if let RegionEvent::TileCountLimitExceeded(limit) = event {
                limit_hit = Some(limit);
                break;
            }
        }

        assert_eq!(limit_hit, Some(60));
        let status = region.status().await.unwrap();
        assert_eq!(status.download_state, DownloadState::Inactive);
        assert!(!status.complete);
    }

    #[tokio::test]
    async fn test_resource_error_is_informational() {
        let mut simulation = fast_simulation();
        simulation.resource_error_at = Some(50);
        let store = MemoryStore::with_simulation(simulation);
        let region = store
            .create_region(definition(), b"{}".to_vec())
            .await
            .unwrap();

        let mut events = region.subscribe();
        region
            .set_download_state(DownloadState::Active)
            .await
            .unwrap();

        let mut saw_error = false;
        loop {
            match events.recv().await {
                Ok(RegionEvent::ResourceError(_)) => saw_error = true,
                Ok(RegionEvent::StatusChanged(status)) if status.complete => break,
                Ok(_) => {}
                Err(_) => break,
            }
        }

        // The error fired and the download still completed.
        assert!(saw_error);
        assert!(region.status().await.unwrap().complete);
    }
}
