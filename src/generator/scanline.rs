//! Direct-pixel-write renderer
//!
//! The pattern strategy behind `generated-cpu` tracks: a horizontal ramp on
//! the red channel, a vertical ramp on green, and the cycling phase on blue,
//! written pixel by pixel in BGRA order. Trades per-frame compute and a
//! fresh allocation per frame for having no pool to manage; interchangeable
//! with the gradient strategy from the scheduler's point of view.

use bytes::BytesMut;

use crate::registry::frame::VideoFrame;

use super::pattern::{phase_at, PatternRenderer, BYTES_PER_PIXEL};

/// Ramp pattern renderer using direct pixel writes
#[derive(Debug)]
pub struct ScanlineRenderer {
    width: u32,
    height: u32,
}

impl ScanlineRenderer {
    /// Create a renderer at the given resolution
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl PatternRenderer for ScanlineRenderer {
    fn set_resolution(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    fn render(&mut self, timestamp_ns: i64) -> Option<VideoFrame> {
        let w = self.width as usize;
        let h = self.height as usize;
        let blue = (phase_at(timestamp_ns) * 255.0) as u8;

        let mut buf = BytesMut::zeroed(w * h * BYTES_PER_PIXEL);
        for y in 0..h {
            let green = (y * 255 / h) as u8;
            let row = &mut buf[y * w * BYTES_PER_PIXEL..(y + 1) * w * BYTES_PER_PIXEL];
            for x in 0..w {
                let red = (x * 255 / w) as u8;
                let px = &mut row[x * BYTES_PER_PIXEL..(x + 1) * BYTES_PER_PIXEL];
                px[0] = blue;
                px[1] = green;
                px[2] = red;
                px[3] = 0xFF;
            }
        }

        Some(VideoFrame::new(
            self.width,
            self.height,
            buf.freeze(),
            timestamp_ns,
        ))
    }
}
