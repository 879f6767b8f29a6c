//! The per-refresh presentation bridge.

use std::sync::Arc;

use vitrine_browser::{FrameSurface, BYTES_PER_PIXEL};

use crate::gpu::GpuSurface;

/// Callbacks the GPU surface drives on its refresh thread.
///
/// Mirrors the usual GL-renderer shape: one-time setup, one call per
/// refresh tick, teardown when the context goes away. Setup and teardown
/// are unused by the presenter and default to no-ops.
pub trait RefreshHandler {
    /// The GPU context was created. Nothing to prepare here.
    fn surface_created(&mut self) {}

    /// One refresh tick: draw the current frame into `target`.
    fn render_frame(&mut self, target: &mut dyn GpuSurface);

    /// The GPU context is closing.
    fn surface_closing(&mut self) {}
}

/// Converts and submits the latest browser frame each refresh tick.
///
/// The source frame is BGRA, top-to-bottom; the target wants RGBA,
/// bottom-to-top. Conversion reuses one scratch buffer across ticks.
/// The bridge never consults the browser handle: with no browser (yet, or
/// anymore) it simply presents the last painted frame, or skips the tick
/// if nothing was ever painted.
pub struct PresentationBridge {
    surface: Arc<FrameSurface>,
    converted: Vec<u8>,
}

impl PresentationBridge {
    /// Create a bridge reading from the given frame surface.
    pub fn new(surface: Arc<FrameSurface>) -> Self {
        Self {
            surface,
            converted: Vec::new(),
        }
    }

    /// Present the current frame: flip rows, reorder channels, submit.
    ///
    /// Runs within one refresh tick and never blocks on the engine. The
    /// effective frame size may be smaller than the viewport while a
    /// resize is settling; whatever was painted is what gets drawn.
    pub fn present_frame(&mut self, target: &mut dyn GpuSurface) {
        let converted = &mut self.converted;
        let dimensions = self.surface.with_frame(|frame| {
            if !frame.is_painted() {
                return None;
            }
            let width = frame.painted_width();
            let height = frame.painted_height();

            converted.clear();
            converted.reserve(width as usize * height as usize * BYTES_PER_PIXEL);
            // Walk source rows bottom-up so the first output row is the
            // image's last, and swap B and R within each pixel.
            for src_row in (0..height).rev() {
                for bgra in frame.painted_row(src_row).chunks_exact(BYTES_PER_PIXEL) {
                    converted.extend_from_slice(&[bgra[2], bgra[1], bgra[0], bgra[3]]);
                }
            }
            Some((width, height))
        });

        let Some((width, height)) = dimensions else {
            return;
        };
        target.clear();
        target.draw_pixels(converted, width, height);
    }
}

impl RefreshHandler for PresentationBridge {
    fn render_frame(&mut self, target: &mut dyn GpuSurface) {
        self.present_frame(target);
    }
}
