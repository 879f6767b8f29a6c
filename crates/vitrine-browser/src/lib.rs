//! Off-screen browser hosting for vitrine plugins.
//!
//! This crate owns the bridge's engine-facing half: the boundary traits an
//! embedded rendering engine is driven through, the per-plugin browser host
//! and its asynchronous lifecycle, the pixel frame surface the engine paints
//! into, the parameter bindings installed into the scripting context, and
//! the input forwarding path from the native editor into the browser.
//!
//! The rendering engine itself is an external collaborator: everything it
//! must provide or accept is expressed as a trait in [`engine`], and the
//! rest of the crate is written purely against those traits.

pub mod engine;
mod error;

mod bindings;
mod host;
mod input;
mod surface;

pub use bindings::{ParameterBindings, PARAMETERS_OBJECT};
pub use error::{EngineError, Result};
pub use host::{BrowserCell, BrowserHost, EngineRuntime, EngineStartup};
pub use input::{InputConfig, InputForwarder};
pub use surface::{FrameRef, FrameSurface, BYTES_PER_PIXEL};
