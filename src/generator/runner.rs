//! Generator timer task
//!
//! One task per generated track. A `tokio::time::interval` fires at `1/fps`;
//! each tick produces exactly one frame and pushes it through the delivery
//! gate. There is no catch-up queuing: a slow tick is one frame shorter,
//! never two frames for one tick. Control arrives over a command channel,
//! and `stop` resolves only after the task has finished, so no frame
//! callback can fire once a dispose call has returned.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};

use crate::delivery::gate;
use crate::registry::entry::TrackEntry;
use crate::registry::frame::{monotonic_timestamp_ns, TrackId};

use super::pattern;
use super::TrackMode;

/// How often the generator reports its produced/dropped rate
const RATE_REPORT_PERIOD: Duration = Duration::from_secs(1);

/// Control messages for a running generator
enum Command {
    SetFps(u32),
    SetResolution(u32, u32),
    Pause,
    Resume,
    Stop,
}

/// Spawn parameters for one generator
#[derive(Debug, Clone, Copy)]
pub(crate) struct GeneratorParams {
    pub(crate) track: TrackId,
    pub(crate) mode: TrackMode,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) fps: u32,
    pub(crate) pool_size: usize,
}

/// Handle to a running generator task
pub(crate) struct GeneratorHandle {
    tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl GeneratorHandle {
    /// Retarget the timer; cancels the current cadence and reschedules
    pub(crate) fn set_fps(&self, fps: u32) {
        let _ = self.tx.send(Command::SetFps(fps));
    }

    /// Apply a new resolution from the next produced frame on
    pub(crate) fn set_resolution(&self, width: u32, height: u32) {
        let _ = self.tx.send(Command::SetResolution(width, height));
    }

    /// Suspend frame production
    pub(crate) fn pause(&self) {
        let _ = self.tx.send(Command::Pause);
    }

    /// Resume frame production
    pub(crate) fn resume(&self) {
        let _ = self.tx.send(Command::Resume);
    }

    /// Stop the generator and wait for its task to finish
    pub(crate) async fn stop(self) {
        let _ = self.tx.send(Command::Stop);
        let _ = self.task.await;
    }
}

/// Spawn the generator task for a track
pub(crate) fn spawn(params: GeneratorParams, entry: Arc<RwLock<TrackEntry>>) -> GeneratorHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(params, entry, rx));
    GeneratorHandle { tx, task }
}

fn cadence(fps: u32) -> Interval {
    let mut ticker = time::interval(Duration::from_secs_f64(1.0 / fps.max(1) as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn run(
    params: GeneratorParams,
    entry: Arc<RwLock<TrackEntry>>,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut renderer = pattern::for_mode(params.mode, params.width, params.height, params.pool_size);
    let mut fps = params.fps;
    let mut ticker = cadence(fps);
    let mut paused = false;
    let mut produced: u32 = 0;
    let mut dropped: u32 = 0;
    let mut rate_mark = Instant::now();

    tracing::debug!(
        track = %params.track,
        mode = %params.mode,
        fps = fps,
        "Generator started"
    );

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::SetFps(next)) => {
                    fps = next;
                    ticker = cadence(fps);
                }
                Some(Command::SetResolution(width, height)) => {
                    renderer.set_resolution(width, height);
                }
                Some(Command::Pause) => paused = true,
                Some(Command::Resume) => {
                    paused = false;
                    ticker = cadence(fps);
                }
                Some(Command::Stop) | None => break,
            },
            _ = ticker.tick(), if !paused => {
                let timestamp_ns = monotonic_timestamp_ns();
                match renderer.render(timestamp_ns) {
                    Some(frame) => {
                        produced += 1;
                        let mut guard = entry.write().await;
                        if let Some(out) = gate::admit(&mut guard, frame, Instant::now()) {
                            // Ignored send errors mean no sink is attached yet
                            let _ = guard.tx.send(out);
                        }
                    }
                    // Buffer acquisition failed; retried on the next tick
                    None => dropped += 1,
                }

                let now = Instant::now();
                if now.duration_since(rate_mark) >= RATE_REPORT_PERIOD {
                    if dropped > 0 {
                        entry.write().await.dropped_frames += dropped as u64;
                    }
                    tracing::trace!(
                        track = %params.track,
                        produced = produced,
                        dropped = dropped,
                        "Generator rate"
                    );
                    produced = 0;
                    dropped = 0;
                    rate_mark = now;
                }
            }
        }
    }

    tracing::debug!(track = %params.track, "Generator stopped");
}
