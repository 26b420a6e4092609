//! External source fan-out
//!
//! Externally pushed frames arrive tagged with a source id; the router fans
//! each one out to every track currently bound to that source. Each
//! destination gates the frame independently: two tracks bound to the same
//! source may emit, buffer, or drop it differently based on their own
//! fps and policy. Frames are never mutated between destinations.

use std::sync::Arc;

use crate::registry::{RegistryError, SourceId, TrackRegistry, VideoFrame};

/// Fan-out entry point for externally produced frames
#[derive(Clone)]
pub struct FrameRouter {
    registry: Arc<TrackRegistry>,
}

impl FrameRouter {
    /// Create a router over a registry
    pub fn new(registry: Arc<TrackRegistry>) -> Self {
        Self { registry }
    }

    /// Route one frame to every track bound to `source`
    ///
    /// Fails only when the source itself is unknown. Tracks disposed
    /// between lookup and delivery are skipped; one track's state never
    /// affects another's delivery.
    pub async fn route_frame(
        &self,
        source: SourceId,
        frame: VideoFrame,
    ) -> Result<(), RegistryError> {
        let bound = self.registry.bound_tracks(source).await?;

        for track_id in bound {
            match self.registry.deliver_external(track_id, frame.clone()).await {
                Ok(emitted) => {
                    tracing::trace!(
                        source = %source,
                        track = %track_id,
                        emitted = emitted,
                        "Frame routed"
                    );
                }
                // Disposed mid-fan-out; the remaining tracks still get it
                Err(RegistryError::UnknownTrack(_)) => {}
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}
