//! Registry and track configuration

use std::time::Duration;

use crate::delivery::Backpressure;
use crate::generator::TrackMode;

use super::error::RegistryError;

/// Registry-wide configuration options
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How long emission stays suppressed after a source reconfiguration,
    /// to let the upstream source settle
    pub quiesce_window: Duration,

    /// Capacity of each track's broadcast channel; lagging subscribers skip
    /// ahead rather than block the scheduler
    pub broadcast_capacity: usize,

    /// Accounting period for produced/delivered rate windows
    pub stats_window: Duration,

    /// Number of reusable frame buffers per pooled generator
    pub generator_pool_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            quiesce_window: Duration::from_millis(350),
            broadcast_capacity: 256,
            stats_window: Duration::from_secs(1),
            generator_pool_size: 3,
        }
    }
}

impl RegistryConfig {
    /// Set the quiesce window applied after source reconfiguration
    pub fn quiesce_window(mut self, window: Duration) -> Self {
        self.quiesce_window = window;
        self
    }

    /// Set the per-track broadcast channel capacity
    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the stats accounting period
    pub fn stats_window(mut self, window: Duration) -> Self {
        self.stats_window = window;
        self
    }

    /// Set the pooled generator's buffer count
    pub fn generator_pool_size(mut self, size: usize) -> Self {
        self.generator_pool_size = size;
        self
    }
}

/// Configuration for a new track
#[derive(Debug, Clone)]
pub struct TrackConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Target frame rate
    pub fps: u32,
    /// How the track's frames are produced
    pub mode: TrackMode,
    /// Backpressure policy applied when supply exceeds the target rate
    pub backpressure: Backpressure,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            mode: TrackMode::GeneratedGpu,
            backpressure: Backpressure::DropLate,
        }
    }
}

impl TrackConfig {
    /// Config for a track fed by an external source
    pub fn external() -> Self {
        Self {
            mode: TrackMode::External,
            ..Default::default()
        }
    }

    /// Set the resolution
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the target frame rate
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the generation mode
    pub fn mode(mut self, mode: TrackMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the backpressure policy
    pub fn backpressure(mut self, policy: Backpressure) -> Self {
        self.backpressure = policy;
        self
    }

    /// Reject non-positive dimensions or frame rates
    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        if self.fps == 0 {
            return Err(RegistryError::InvalidConfig("fps must be >= 1".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(RegistryError::InvalidConfig(format!(
                "resolution must be >= 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Partial reconfiguration of an existing track
///
/// Unset fields leave the current value untouched.
#[derive(Debug, Clone, Default)]
pub struct TrackUpdate {
    /// New frame width
    pub width: Option<u32>,
    /// New frame height
    pub height: Option<u32>,
    /// New target frame rate
    pub fps: Option<u32>,
    /// New backpressure policy
    pub backpressure: Option<Backpressure>,
}

impl TrackUpdate {
    /// Update both dimensions
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Update the frame width
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Update the frame height
    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Update the target frame rate
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Update the backpressure policy
    pub fn backpressure(mut self, policy: Backpressure) -> Self {
        self.backpressure = Some(policy);
        self
    }

    /// Reject non-positive values before any state mutates
    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        if self.fps == Some(0) {
            return Err(RegistryError::InvalidConfig("fps must be >= 1".into()));
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(RegistryError::InvalidConfig(
                "resolution must be >= 1x1".into(),
            ));
        }
        Ok(())
    }
}
