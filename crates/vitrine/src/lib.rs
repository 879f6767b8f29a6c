//! # Vitrine
//!
//! Web-page control surfaces for audio plugins.
//!
//! Vitrine bridges three asynchronous worlds that otherwise never meet: an
//! off-screen browser engine painting pixel buffers on its own threads, a
//! GPU surface driven by the host UI's refresh cycle, and the audio host's
//! parameter-automation system exposed to script code running in the page.
//!
//! ## Architecture
//!
//! ```text
//! engine paint thread          GPU refresh thread        script thread
//!        │                            │                        │
//!        ▼                            ▼                        ▼
//!  FrameSurface  ──(swap)──▶  PresentationBridge      ParameterBindings
//!        ▲                            │                        │
//!        │                            ▼                        ▼
//!   BrowserHost                  GpuSurface               ParameterSet
//! ```
//!
//! The engine itself is consumed through the boundary traits in
//! [`browser::engine`]; an adapter for a concrete engine implements
//! [`BrowserDriver`](browser::engine::BrowserDriver) and calls back into
//! the sinks it is handed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitrine::prelude::*;
//!
//! let parameters = Arc::new(ParameterSet::new(vec![
//!     FloatParameter::new("gain", 0.5, 0.0..=1.0),
//! ]));
//!
//! let runtime = match EngineRuntime::initialize(driver)? {
//!     EngineStartup::Ready(runtime) => runtime,
//!     // Engine helper subprocess: exit immediately.
//!     EngineStartup::HelperProcess { exit_code } => std::process::exit(exit_code),
//! };
//!
//! let host = BrowserHost::new(&runtime);
//! let bindings = Arc::new(ParameterBindings::new(parameters.clone()));
//! host.create_browser(Viewport::new(800, 600), "https://ui.local/", Some(bindings))?;
//!
//! // Per editor window:
//! let mut bridge = PresentationBridge::new(host.frame_surface());
//! let input = InputForwarder::new(&host, InputConfig::default());
//! ```

// Re-export sub-crates
pub use vitrine_browser as browser;
pub use vitrine_core as core;
pub use vitrine_present as present;

/// Prelude module for convenient imports.
///
/// Import everything you need to embed a web control surface:
/// ```rust,ignore
/// use vitrine::prelude::*;
/// ```
pub mod prelude {
    // Parameter model and geometry
    pub use vitrine_core::{
        AutomationHost, FloatParameter, ParameterSet, ParameterSnapshot, Viewport,
    };

    // Browser hosting
    pub use vitrine_browser::{
        BrowserCell, BrowserHost, EngineError, EngineRuntime, EngineStartup, FrameSurface,
        InputConfig, InputForwarder, ParameterBindings, PARAMETERS_OBJECT,
    };

    // Engine boundary traits and event shapes
    pub use vitrine_browser::engine::{
        Browser, BrowserDriver, BrowserLifecycle, BrowserRequest, CloseDecision, KeyEvent,
        Launch, PaintSink, PointerButton, PointerEvent, ScriptContextHandler, ScriptException,
        ScriptGlobal, ScriptInterceptor, ScriptValue,
    };

    // Presentation
    pub use vitrine_present::{GpuSurface, PresentationBridge, RefreshHandler};
}
