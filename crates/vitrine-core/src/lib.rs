//! Core abstractions for the vitrine web-UI bridge.
//!
//! This crate holds the pieces shared by every other vitrine crate: the
//! automatable parameter model exposed to script code, and the viewport
//! geometry that the browser, the pixel surface, and the GPU target must
//! agree on.
//!
//! The audio signal chain, state persistence, and plugin-format wrappers
//! are deliberately out of scope; they interact with this crate only
//! through [`ParameterSet`] and [`AutomationHost`].

mod geometry;
mod parameters;

pub use geometry::Viewport;
pub use parameters::{
    AutomationHost, FloatParameter, ParameterSet, ParameterSnapshot,
};
