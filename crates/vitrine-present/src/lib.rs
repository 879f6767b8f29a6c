//! GPU presentation for vitrine frame surfaces.
//!
//! The presenter runs inside the GPU surface's own refresh cycle: once per
//! tick it takes the latest complete frame from the browser's
//! [`FrameSurface`](vitrine_browser::FrameSurface), converts it to the
//! drawing convention the surface expects (bottom-up rows, RGBA bytes),
//! and submits it. It never waits for the rendering engine; a tick without
//! a fresh paint simply re-shows the previous pixels.

mod bridge;
mod gpu;

pub use bridge::{PresentationBridge, RefreshHandler};
pub use gpu::GpuSurface;
