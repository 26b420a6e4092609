//! Synthetic track demo with generated and routed tracks
//!
//! Run with: cargo run --example synthetic_tracks
//!
//! Creates three tracks:
//! - a 720p30 gradient track (`generated-gpu` path, pooled buffers)
//! - a 360p15 scanline track (`generated-cpu` path)
//! - a 30 fps `external` track fed by a simulated 100 fps camera through
//!   the router, shedding oversupply under the default `drop-late` policy
//!
//! Per-track and aggregate stats print once per second until Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use vtrack::{
    monotonic_timestamp_ns, FrameRouter, TrackConfig, TrackId, TrackMode, TrackRegistry,
    VideoFrame,
};

/// Simulated camera: pushes gray frames at 100 fps
async fn camera(router: FrameRouter, source: vtrack::SourceId) {
    let data = Bytes::from(vec![0x80u8; 320 * 180 * 4]);
    let mut ticker = tokio::time::interval(Duration::from_millis(10));

    loop {
        ticker.tick().await;
        let frame = VideoFrame::new(320, 180, data.clone(), monotonic_timestamp_ns());
        if router.route_frame(source, frame).await.is_err() {
            break;
        }
    }
}

/// Drain a track's frame stream, counting only
async fn sink(registry: Arc<TrackRegistry>, id: TrackId) {
    let Ok(mut rx) = registry.subscribe(id).await else {
        return;
    };
    while rx.recv().await.is_ok() {}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vtrack=debug".parse()?),
        )
        .init();

    let registry = Arc::new(TrackRegistry::new());

    let gradient = registry
        .create_track(
            None,
            TrackConfig::default()
                .resolution(1280, 720)
                .fps(30)
                .mode(TrackMode::GeneratedGpu),
        )
        .await?;

    let scanline = registry
        .create_track(
            None,
            TrackConfig::default()
                .resolution(640, 360)
                .fps(15)
                .mode(TrackMode::GeneratedCpu),
        )
        .await?;

    let source = registry.create_source().await;
    let routed = registry
        .create_track(Some(source), TrackConfig::external().resolution(320, 180).fps(30))
        .await?;

    for id in [gradient, scanline, routed] {
        tokio::spawn(sink(Arc::clone(&registry), id));
    }

    let router = FrameRouter::new(Arc::clone(&registry));
    tokio::spawn(camera(router, source));

    println!("Tracks:");
    println!("  {gradient}  1280x720 @ 30fps  generated-gpu");
    println!("  {scanline}  640x360  @ 15fps  generated-cpu");
    println!("  {routed}  320x180  @ 30fps  external (camera at 100fps, drop-late)");
    println!();

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for id in [gradient, scanline, routed] {
                    let stats = registry.stats_for(id).await?;
                    println!(
                        "{id}: produced {:>3}/s delivered {:>3}/s dropped {}",
                        stats.produced_fps, stats.delivered_fps, stats.dropped_frames
                    );
                }
                let total = registry.aggregate_stats().await;
                println!("all: {} fps, {} dropped", total.fps, total.dropped_frames);
                println!();
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    for id in [gradient, scanline, routed] {
        registry.dispose_track(id).await?;
    }
    registry.dispose_source(source).await?;

    Ok(())
}
