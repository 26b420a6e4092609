//! Track/source registry implementation
//!
//! The single authoritative store of all track and source state. Every other
//! component reads and mutates it under its synchronization discipline:
//! concurrent reads for stats and snapshots, exclusive-but-brief writes for
//! lifecycle mutations and per-frame counter updates. No frame rendering or
//! buffer allocation happens while a lock is held.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;

use crate::delivery::gate;
use crate::generator::runner::{self, GeneratorParams};
use crate::stats::{AggregateStats, TrackStats};

use super::config::{RegistryConfig, TrackConfig, TrackUpdate};
use super::entry::{SourceEntry, SourceState, SourceUpdate, TrackEntry, TrackState};
use super::error::RegistryError;
use super::frame::{HandleAllocator, SourceId, TrackId, VideoFrame};

/// Central registry for all tracks and sources
///
/// Thread-safe via `RwLock`. Read-heavy workloads (stats queries, snapshot
/// lookups, fan-out) benefit from the concurrent read access; per-entry
/// locks keep every mutation atomic with respect to concurrent readers, so
/// a reader never observes a half-updated record.
pub struct TrackRegistry {
    /// Map of track id to track record
    tracks: RwLock<HashMap<TrackId, Arc<RwLock<TrackEntry>>>>,

    /// Map of source id to source record
    sources: RwLock<HashMap<SourceId, SourceEntry>>,

    /// Configuration
    config: RegistryConfig,

    /// Track handle allocator
    next_track: HandleAllocator,

    /// Source handle allocator
    next_source: HandleAllocator,
}

impl TrackRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            tracks: RwLock::new(HashMap::new()),
            sources: RwLock::new(HashMap::new()),
            config,
            next_track: HandleAllocator::default(),
            next_source: HandleAllocator::default(),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create a new external frame source
    pub async fn create_source(&self) -> SourceId {
        let id = SourceId(self.next_source.next());
        self.sources.write().await.insert(id, SourceEntry::new(id));

        tracing::info!(source = %id, "Source created");
        id
    }

    /// Update a source's hints and quiesce its bound tracks
    ///
    /// Emission on every bound track is suppressed for the quiesce window so
    /// the upstream source can settle; all per-track counters restart from
    /// zero. The caller is not blocked for the quiesce duration.
    pub async fn update_source(
        &self,
        id: SourceId,
        update: SourceUpdate,
    ) -> Result<(), RegistryError> {
        let bound: Vec<TrackId> = {
            let mut sources = self.sources.write().await;
            let source = sources.get_mut(&id).ok_or(RegistryError::UnknownSource(id))?;

            if let Some(facing) = update.facing {
                source.facing = Some(facing);
            }
            if let Some(torch) = update.torch {
                source.torch = Some(torch);
            }
            if let Some(max_fps) = update.max_fps {
                source.max_fps = Some(max_fps);
            }
            source.bound.iter().copied().collect()
        };

        tracing::info!(source = %id, tracks = bound.len(), "Source updated, quiescing bound tracks");

        let now = Instant::now();
        for track_id in bound {
            if let Some(entry_arc) = self.tracks.read().await.get(&track_id).cloned() {
                let epoch = {
                    let mut entry = entry_arc.write().await;
                    // Self-driven tracks are unaffected by the source settling
                    if entry.mode.is_generated() {
                        continue;
                    }
                    entry.begin_quiesce(now)
                };
                self.schedule_quiesce_clear(track_id, entry_arc, epoch);
            }
        }

        Ok(())
    }

    /// Destroy a source
    ///
    /// Bound tracks survive but stop receiving routed frames.
    pub async fn dispose_source(&self, id: SourceId) -> Result<(), RegistryError> {
        let source = self
            .sources
            .write()
            .await
            .remove(&id)
            .ok_or(RegistryError::UnknownSource(id))?;

        let tracks = self.tracks.read().await;
        for track_id in &source.bound {
            if let Some(entry_arc) = tracks.get(track_id) {
                entry_arc.write().await.source = None;
            }
        }

        tracing::info!(source = %id, unbound = source.bound.len(), "Source disposed");
        Ok(())
    }

    /// Create a new track
    ///
    /// Generated modes spawn the track's generator immediately; `external`
    /// tracks emit only what the router feeds them.
    pub async fn create_track(
        &self,
        source: Option<SourceId>,
        config: TrackConfig,
    ) -> Result<TrackId, RegistryError> {
        config.validate()?;

        let id = TrackId(self.next_track.next());
        let mut entry = TrackEntry::new(id, &config, &self.config);

        if let Some(source_id) = source {
            let mut sources = self.sources.write().await;
            let source_entry = sources
                .get_mut(&source_id)
                .ok_or(RegistryError::UnknownSource(source_id))?;
            source_entry.bound.insert(id);
            entry.source = Some(source_id);
        }

        let entry_arc = Arc::new(RwLock::new(entry));
        self.tracks.write().await.insert(id, Arc::clone(&entry_arc));

        if config.mode.is_generated() {
            let handle = runner::spawn(
                GeneratorParams {
                    track: id,
                    mode: config.mode,
                    width: config.width,
                    height: config.height,
                    fps: config.fps,
                    pool_size: self.config.generator_pool_size,
                },
                Arc::clone(&entry_arc),
            );
            entry_arc.write().await.generator = Some(handle);
        }

        tracing::info!(
            track = %id,
            mode = %config.mode,
            width = config.width,
            height = config.height,
            fps = config.fps,
            policy = %config.backpressure,
            source = ?source,
            "Track created"
        );
        Ok(id)
    }

    /// Bind a track to a source, detaching it from any prior source
    pub async fn bind(&self, track_id: TrackId, source_id: SourceId) -> Result<(), RegistryError> {
        let entry_arc = self.entry(track_id).await?;
        let mut sources = self.sources.write().await;

        if !sources.contains_key(&source_id) {
            return Err(RegistryError::UnknownSource(source_id));
        }

        let mut entry = entry_arc.write().await;
        if let Some(prior) = entry.source.take() {
            if let Some(prior_entry) = sources.get_mut(&prior) {
                prior_entry.bound.remove(&track_id);
            }
        }

        // Checked above; the map is still locked
        if let Some(source_entry) = sources.get_mut(&source_id) {
            source_entry.bound.insert(track_id);
        }
        entry.source = Some(source_id);

        tracing::debug!(track = %track_id, source = %source_id, "Track bound");
        Ok(())
    }

    /// Reconfigure a track in place
    ///
    /// A single atomic step with respect to concurrent readers: config
    /// updates, counter resets, the quiesce flag for source-bound tracks,
    /// and the generator restart all happen under one record lock. The
    /// generated path is never quiesced; its new parameters take effect
    /// immediately.
    pub async fn reconfigure(
        &self,
        id: TrackId,
        update: TrackUpdate,
    ) -> Result<(), RegistryError> {
        update.validate()?;
        let entry_arc = self.entry(id).await?;

        let mut entry = entry_arc.write().await;
        let resolution_changed = update.width.is_some() || update.height.is_some();

        if let Some(width) = update.width {
            entry.width = width;
        }
        if let Some(height) = update.height {
            entry.height = height;
        }
        if let Some(fps) = update.fps {
            entry.fps = fps;
        }
        if let Some(policy) = update.backpressure {
            entry.backpressure = policy;
        }

        if let Some(generator) = entry.generator.as_ref() {
            if resolution_changed {
                generator.set_resolution(entry.width, entry.height);
            }
            if update.fps.is_some() {
                generator.set_fps(entry.fps);
            }
        }

        // Only the external path quiesces; generated tracks pick up their
        // new parameters immediately.
        let quiesce = entry.source.is_some() && !entry.mode.is_generated();
        if quiesce {
            let epoch = entry.begin_quiesce(Instant::now());
            drop(entry);
            self.schedule_quiesce_clear(id, entry_arc, epoch);
        } else {
            entry.reset_counters(Instant::now());
        }

        tracing::info!(track = %id, quiesce = quiesce, "Track reconfigured");
        Ok(())
    }

    /// Pause a track
    ///
    /// No frames are emitted and no stats accumulate until resume; the
    /// configuration is preserved.
    pub async fn pause(&self, id: TrackId) -> Result<(), RegistryError> {
        let entry_arc = self.entry(id).await?;
        let mut entry = entry_arc.write().await;

        entry.paused = true;
        if let Some(generator) = entry.generator.as_ref() {
            generator.pause();
        }

        tracing::debug!(track = %id, "Track paused");
        Ok(())
    }

    /// Resume a paused track with its prior configuration
    pub async fn resume(&self, id: TrackId) -> Result<(), RegistryError> {
        let entry_arc = self.entry(id).await?;
        let mut entry = entry_arc.write().await;

        entry.paused = false;
        if let Some(generator) = entry.generator.as_ref() {
            generator.resume();
        }

        tracing::debug!(track = %id, "Track resumed");
        Ok(())
    }

    /// Destroy a track
    ///
    /// Stops its generator before returning (no frame callback fires once
    /// this resolves) and detaches it from its source.
    pub async fn dispose_track(&self, id: TrackId) -> Result<(), RegistryError> {
        let entry_arc = self
            .tracks
            .write()
            .await
            .remove(&id)
            .ok_or(RegistryError::UnknownTrack(id))?;

        let (generator, source) = {
            let mut entry = entry_arc.write().await;
            (entry.generator.take(), entry.source.take())
        };

        if let Some(source_id) = source {
            if let Some(source_entry) = self.sources.write().await.get_mut(&source_id) {
                source_entry.bound.remove(&id);
            }
        }

        if let Some(generator) = generator {
            generator.stop().await;
        }

        tracing::info!(track = %id, "Track disposed");
        Ok(())
    }

    /// Subscribe to a track's frame stream
    ///
    /// Frames are push-delivered one at a time. A lagging subscriber skips
    /// ahead rather than stalling the scheduler.
    pub async fn subscribe(
        &self,
        id: TrackId,
    ) -> Result<broadcast::Receiver<VideoFrame>, RegistryError> {
        let entry_arc = self.entry(id).await?;
        let entry = entry_arc.read().await;
        Ok(entry.subscribe())
    }

    /// Consistent point-in-time copy of a track's state
    pub async fn snapshot(&self, id: TrackId) -> Result<TrackState, RegistryError> {
        let entry_arc = self.entry(id).await?;
        let entry = entry_arc.read().await;
        Ok(entry.snapshot())
    }

    /// Point-in-time copy of a source's hints and bindings
    pub async fn source_snapshot(&self, id: SourceId) -> Result<SourceState, RegistryError> {
        let sources = self.sources.read().await;
        let source = sources.get(&id).ok_or(RegistryError::UnknownSource(id))?;

        Ok(SourceState {
            id: source.id,
            facing: source.facing,
            torch: source.torch,
            max_fps: source.max_fps,
            tracks: source.bound.iter().copied().collect(),
        })
    }

    /// Throughput statistics for one track
    ///
    /// Values come from the last completed accounting window, falling back
    /// to the in-progress window before the first roll.
    pub async fn stats_for(&self, id: TrackId) -> Result<TrackStats, RegistryError> {
        let entry_arc = self.entry(id).await?;
        let entry = entry_arc.read().await;
        Ok(entry.stats())
    }

    /// Statistics summed across all tracks
    ///
    /// If no track has completed a window yet, the delivered sum falls back
    /// to the in-progress counts.
    pub async fn aggregate_stats(&self) -> AggregateStats {
        let tracks = self.tracks.read().await;

        let mut completed: u32 = 0;
        let mut in_progress: u32 = 0;
        let mut dropped: u64 = 0;
        for entry_arc in tracks.values() {
            let entry = entry_arc.read().await;
            completed += entry.window.completed_delivered();
            in_progress += entry.window.current_delivered();
            dropped += entry.dropped_frames;
        }

        AggregateStats {
            fps: if completed > 0 { completed } else { in_progress },
            dropped_frames: dropped,
        }
    }

    /// Number of live tracks
    pub async fn track_count(&self) -> usize {
        self.tracks.read().await.len()
    }

    /// Number of live sources
    pub async fn source_count(&self) -> usize {
        self.sources.read().await.len()
    }

    /// Tracks currently bound to a source
    pub(crate) async fn bound_tracks(&self, id: SourceId) -> Result<Vec<TrackId>, RegistryError> {
        let sources = self.sources.read().await;
        let source = sources.get(&id).ok_or(RegistryError::UnknownSource(id))?;
        Ok(source.bound.iter().copied().collect())
    }

    /// Gate an externally routed frame into one track
    pub(crate) async fn deliver_external(
        &self,
        id: TrackId,
        frame: VideoFrame,
    ) -> Result<bool, RegistryError> {
        let entry_arc = self.entry(id).await?;
        let mut entry = entry_arc.write().await;

        match gate::admit(&mut entry, frame, Instant::now()) {
            Some(out) => {
                let _ = entry.tx.send(out);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn entry(&self, id: TrackId) -> Result<Arc<RwLock<TrackEntry>>, RegistryError> {
        self.tracks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RegistryError::UnknownTrack(id))
    }

    /// Lower the quiesce flag after the configured window
    ///
    /// Soft, time-bounded suppression: the scheduling caller returns
    /// immediately. A newer reconfiguration bumps the epoch, which makes
    /// this clearance a no-op.
    fn schedule_quiesce_clear(&self, id: TrackId, entry_arc: Arc<RwLock<TrackEntry>>, epoch: u64) {
        let window = self.config.quiesce_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut entry = entry_arc.write().await;
            if entry.reconfigure_epoch == epoch {
                entry.reconfiguring = false;
                tracing::debug!(track = %id, "Quiesce window elapsed");
            }
        });
    }
}

impl Default for TrackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::time::{self, Duration};

    use crate::delivery::Backpressure;
    use crate::generator::TrackMode;

    use super::*;

    fn frame(seq: u8) -> VideoFrame {
        VideoFrame::new(4, 4, Bytes::from(vec![seq; 64]), seq as i64)
    }

    fn external_config(fps: u32) -> TrackConfig {
        TrackConfig::external().resolution(4, 4).fps(fps)
    }

    #[tokio::test]
    async fn test_create_and_snapshot() {
        let registry = TrackRegistry::new();

        let id = registry
            .create_track(None, external_config(24))
            .await
            .unwrap();
        let state = registry.snapshot(id).await.unwrap();

        assert_eq!(state.fps, 24);
        assert_eq!(state.mode, TrackMode::External);
        assert!(!state.paused);
        assert!(state.source.is_none());
        assert_eq!(registry.track_count().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_mutation() {
        let registry = TrackRegistry::new();

        let result = registry
            .create_track(None, TrackConfig::default().fps(0))
            .await;

        assert!(matches!(result, Err(RegistryError::InvalidConfig(_))));
        assert_eq!(registry.track_count().await, 0);
    }

    #[tokio::test]
    async fn test_reconfigure_invalid_retains_prior_config() {
        let registry = TrackRegistry::new();
        let id = registry
            .create_track(None, external_config(30))
            .await
            .unwrap();

        let result = registry
            .reconfigure(id, TrackUpdate::default().fps(0))
            .await;

        assert!(matches!(result, Err(RegistryError::InvalidConfig(_))));
        assert_eq!(registry.snapshot(id).await.unwrap().fps, 30);
    }

    #[tokio::test]
    async fn test_unknown_track_operations() {
        let registry = TrackRegistry::new();
        let id = registry
            .create_track(None, external_config(30))
            .await
            .unwrap();
        registry.dispose_track(id).await.unwrap();

        assert!(matches!(
            registry.snapshot(id).await,
            Err(RegistryError::UnknownTrack(_))
        ));
        assert!(matches!(
            registry.pause(id).await,
            Err(RegistryError::UnknownTrack(_))
        ));
        assert!(matches!(
            registry.dispose_track(id).await,
            Err(RegistryError::UnknownTrack(_))
        ));
    }

    #[tokio::test]
    async fn test_pause_resume_preserves_config() {
        let registry = TrackRegistry::new();
        let id = registry
            .create_track(
                None,
                external_config(15).backpressure(Backpressure::Throttle),
            )
            .await
            .unwrap();

        registry.pause(id).await.unwrap();
        assert!(registry.snapshot(id).await.unwrap().paused);

        registry.resume(id).await.unwrap();
        let state = registry.snapshot(id).await.unwrap();

        assert!(!state.paused);
        assert_eq!(state.fps, 15);
        assert_eq!(state.width, 4);
        assert_eq!(state.backpressure, Backpressure::Throttle);
    }

    #[tokio::test]
    async fn test_paused_track_emits_nothing() {
        let registry = TrackRegistry::new();
        let id = registry
            .create_track(None, external_config(30))
            .await
            .unwrap();
        let mut rx = registry.subscribe(id).await.unwrap();

        registry.pause(id).await.unwrap();
        assert!(!registry.deliver_external(id, frame(1)).await.unwrap());
        assert!(rx.try_recv().is_err());

        // Stats did not accumulate while paused
        let stats = registry.stats_for(id).await.unwrap();
        assert_eq!(stats.produced_fps, 0);
        assert_eq!(stats.dropped_frames, 0);
    }

    #[tokio::test]
    async fn test_source_binding_lifecycle() {
        let registry = TrackRegistry::new();
        let source = registry.create_source().await;
        let id = registry
            .create_track(Some(source), external_config(30))
            .await
            .unwrap();

        let source_state = registry.source_snapshot(source).await.unwrap();
        assert_eq!(source_state.tracks, vec![id]);

        // Disposing the source detaches but keeps the track
        registry.dispose_source(source).await.unwrap();
        assert!(registry.snapshot(id).await.unwrap().source.is_none());
        assert_eq!(registry.track_count().await, 1);
        assert!(matches!(
            registry.source_snapshot(source).await,
            Err(RegistryError::UnknownSource(_))
        ));
    }

    #[tokio::test]
    async fn test_create_track_with_unknown_source() {
        let registry = TrackRegistry::new();
        let source = registry.create_source().await;
        registry.dispose_source(source).await.unwrap();

        let result = registry.create_track(Some(source), external_config(30)).await;

        assert!(matches!(result, Err(RegistryError::UnknownSource(_))));
        assert_eq!(registry.track_count().await, 0);
    }

    #[tokio::test]
    async fn test_rebind_moves_track_between_sources() {
        let registry = TrackRegistry::new();
        let first = registry.create_source().await;
        let second = registry.create_source().await;
        let id = registry
            .create_track(Some(first), external_config(30))
            .await
            .unwrap();

        registry.bind(id, second).await.unwrap();

        assert!(registry.source_snapshot(first).await.unwrap().tracks.is_empty());
        assert_eq!(registry.source_snapshot(second).await.unwrap().tracks, vec![id]);
        assert_eq!(registry.snapshot(id).await.unwrap().source, Some(second));
    }

    #[tokio::test]
    async fn test_update_source_hints() {
        let registry = TrackRegistry::new();
        let source = registry.create_source().await;

        registry
            .update_source(
                source,
                SourceUpdate::default()
                    .facing(crate::registry::entry::Facing::Back)
                    .max_fps(60),
            )
            .await
            .unwrap();

        let state = registry.source_snapshot(source).await.unwrap();
        assert_eq!(state.facing, Some(crate::registry::entry::Facing::Back));
        assert_eq!(state.max_fps, Some(60));
        assert!(state.torch.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_quiesces_external_track() {
        let registry = TrackRegistry::new();
        let source = registry.create_source().await;
        let id = registry
            .create_track(Some(source), external_config(1000))
            .await
            .unwrap();

        // Prime some stats
        registry.deliver_external(id, frame(1)).await.unwrap();
        registry
            .reconfigure(id, TrackUpdate::default().fps(10))
            .await
            .unwrap();

        let state = registry.snapshot(id).await.unwrap();
        assert_eq!(state.fps, 10);
        assert!(state.reconfiguring);
        assert_eq!(registry.stats_for(id).await.unwrap().produced_fps, 0);

        // Inside the quiesce window: silent discard
        time::sleep(Duration::from_millis(100)).await;
        assert!(!registry.deliver_external(id, frame(2)).await.unwrap());

        // After the window: emission resumes
        time::sleep(Duration::from_millis(300)).await;
        assert!(!registry.snapshot(id).await.unwrap().reconfiguring);
        assert!(registry.deliver_external(id, frame(3)).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_never_quiesces_generated_track() {
        let registry = TrackRegistry::new();
        let id = registry
            .create_track(
                None,
                TrackConfig::default()
                    .resolution(4, 4)
                    .fps(10)
                    .mode(TrackMode::GeneratedCpu),
            )
            .await
            .unwrap();

        registry
            .reconfigure(id, TrackUpdate::default().resolution(8, 8).fps(20))
            .await
            .unwrap();

        let state = registry.snapshot(id).await.unwrap();
        assert!(!state.reconfiguring);
        assert_eq!((state.width, state.height, state.fps), (8, 8, 20));

        // Frames keep flowing at the new resolution
        let mut rx = registry.subscribe(id).await.unwrap();
        time::sleep(Duration::from_millis(300)).await;
        let received = rx.recv().await.unwrap();
        assert_eq!((received.width, received.height), (8, 8));

        registry.dispose_track(id).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_reconfigures_extend_quiesce() {
        let config = RegistryConfig::default().quiesce_window(Duration::from_millis(200));
        let registry = TrackRegistry::with_config(config);
        let source = registry.create_source().await;
        let id = registry
            .create_track(Some(source), external_config(30))
            .await
            .unwrap();

        registry
            .reconfigure(id, TrackUpdate::default().fps(10))
            .await
            .unwrap();
        time::sleep(Duration::from_millis(150)).await;
        registry
            .reconfigure(id, TrackUpdate::default().fps(20))
            .await
            .unwrap();

        // The first clearance is stale; the flag must survive it
        time::sleep(Duration::from_millis(100)).await;
        assert!(registry.snapshot(id).await.unwrap().reconfiguring);

        time::sleep(Duration::from_millis(150)).await;
        assert!(!registry.snapshot(id).await.unwrap().reconfiguring);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_generator_synchronously() {
        let registry = TrackRegistry::new();
        let id = registry
            .create_track(
                None,
                TrackConfig::default()
                    .resolution(4, 4)
                    .fps(100)
                    .mode(TrackMode::GeneratedCpu),
            )
            .await
            .unwrap();
        let mut rx = registry.subscribe(id).await.unwrap();

        time::sleep(Duration::from_millis(100)).await;
        registry.dispose_track(id).await.unwrap();
        while rx.try_recv().is_ok() {}

        // Generator task has terminated; the stream closes with no frames
        time::sleep(Duration::from_millis(500)).await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_track_failure_independence() {
        let registry = TrackRegistry::new();
        let healthy = registry
            .create_track(None, external_config(30))
            .await
            .unwrap();
        let doomed = registry
            .create_track(None, external_config(30))
            .await
            .unwrap();

        registry.dispose_track(doomed).await.unwrap();
        assert!(registry.deliver_external(doomed, frame(1)).await.is_err());

        // The other track is untouched
        assert!(registry.deliver_external(healthy, frame(1)).await.unwrap());
        assert_eq!(registry.stats_for(healthy).await.unwrap().produced_fps, 1);
    }

    #[tokio::test]
    async fn test_stats_fresh_track_not_all_zero() {
        let registry = TrackRegistry::new();
        let id = registry
            .create_track(None, external_config(30))
            .await
            .unwrap();

        registry.deliver_external(id, frame(1)).await.unwrap();

        // No window has rolled yet; readers see the in-progress counts
        let stats = registry.stats_for(id).await.unwrap();
        assert_eq!(stats.produced_fps, 1);
        assert_eq!(stats.delivered_fps, 1);
    }

    #[tokio::test]
    async fn test_aggregate_stats_fallback() {
        let registry = TrackRegistry::new();
        let a = registry
            .create_track(None, external_config(30))
            .await
            .unwrap();
        let b = registry
            .create_track(None, external_config(30))
            .await
            .unwrap();

        registry.deliver_external(a, frame(1)).await.unwrap();
        registry.deliver_external(b, frame(2)).await.unwrap();

        let stats = registry.aggregate_stats().await;
        assert_eq!(stats.fps, 2);
        assert_eq!(stats.dropped_frames, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lagging_subscriber_skips_ahead() {
        let config = RegistryConfig::default().broadcast_capacity(4);
        let registry = TrackRegistry::with_config(config);
        let id = registry
            .create_track(None, external_config(1000))
            .await
            .unwrap();
        let mut rx = registry.subscribe(id).await.unwrap();

        for seq in 0..10u8 {
            registry.deliver_external(id, frame(seq)).await.unwrap();
            time::sleep(Duration::from_millis(2)).await;
        }

        // The scheduler never blocked; the slow reader pays by skipping
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aggregate_stats_prefers_completed_windows() {
        let registry = TrackRegistry::new();
        let id = registry
            .create_track(None, external_config(1000))
            .await
            .unwrap();

        registry.deliver_external(id, frame(1)).await.unwrap();
        time::sleep(Duration::from_millis(5)).await;
        registry.deliver_external(id, frame(2)).await.unwrap();
        time::sleep(Duration::from_millis(1100)).await;
        // This arrival rolls the window and lands in the new one
        registry.deliver_external(id, frame(3)).await.unwrap();

        let stats = registry.aggregate_stats().await;
        assert_eq!(stats.fps, 2);
    }
}
