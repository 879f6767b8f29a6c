//! Boundary trait for the GPU drawing surface.

/// The drawing surface the presenter submits frames to.
///
/// One fixed drawing primitive: clear, then raw pixel upload. The surface
/// expects tightly packed RGBA bytes in bottom-up row order, matching the
/// classic GL pixel-upload convention.
pub trait GpuSurface {
    /// Clear the color and depth targets before the upload.
    fn clear(&mut self);

    /// Upload `width × height` RGBA pixels for display this tick.
    fn draw_pixels(&mut self, pixels: &[u8], width: u32, height: u32);
}
