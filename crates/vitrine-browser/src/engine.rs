//! Boundary traits for the embedded rendering engine.
//!
//! The engine is consumed, never implemented, by this crate: an adapter for
//! a concrete engine implements [`BrowserDriver`] and [`Browser`], and calls
//! back into the [`BrowserLifecycle`], [`PaintSink`], and
//! [`ScriptContextHandler`] objects it was handed at creation time. Each
//! trait covers exactly one capability so an adapter composes the set it
//! needs instead of funneling everything through one polymorphic handler.

use std::sync::Arc;

use vitrine_core::Viewport;

use crate::error::Result;

/// Script values crossing the engine boundary are JSON values.
pub type ScriptValue = serde_json::Value;

/// An exception to raise in the scripting context for a single call.
///
/// Raising one does not tear down the binding; only the offending script
/// call observes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptException {
    /// Message delivered through the engine's exception channel.
    pub message: String,
}

impl ScriptException {
    /// Create an exception with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScriptException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ScriptException {}

/// How the process came up when the engine subsystem initialized.
///
/// Engines that fork auxiliary subprocesses re-enter the embedder's own
/// binary; initialization detects that case and the embedder must exit
/// with the given code instead of constructing anything further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// Normal startup: this is the main process, carry on.
    Main,
    /// This process is an engine helper. Exit with `exit_code` immediately.
    Helper {
        /// Process exit code the engine expects.
        exit_code: i32,
    },
}

/// Everything needed to create one off-screen browser.
#[derive(Debug, Clone)]
pub struct BrowserRequest<'a> {
    /// Initial viewport the browser renders at.
    pub viewport: Viewport,
    /// URL loaded into the browser on creation.
    pub url: &'a str,
}

/// Response to an advisory close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Let the close continue; a [`BrowserLifecycle::browser_closed`]
    /// notification will follow once the engine confirms it.
    Proceed,
    /// Veto the close; the browser stays alive.
    Veto,
}

/// Process-level engine subsystem.
///
/// One driver serves the whole process; individual browsers are created
/// through it and live independently of any editor window.
pub trait BrowserDriver: Send + Sync {
    /// One-time process-level initialization of the engine subsystem.
    ///
    /// Must complete before any browser creation. Returns
    /// [`Launch::Helper`] when the engine determines this process is one of
    /// its auxiliary subprocesses; the embedder must then exit with the
    /// carried code and touch nothing else.
    fn initialize(&self) -> Result<Launch>;

    /// Create one off-screen browser.
    ///
    /// Asynchronous: the call returns once the request is accepted, and the
    /// live browser arrives later via
    /// [`BrowserLifecycle::browser_created`]. Paint notifications go to
    /// `paint` on the engine's own threads; scripting-context lifecycle
    /// goes to `script` if present.
    fn create_browser(
        &self,
        request: BrowserRequest<'_>,
        paint: Arc<dyn PaintSink>,
        lifecycle: Arc<dyn BrowserLifecycle>,
        script: Option<Arc<dyn ScriptContextHandler>>,
    ) -> Result<()>;

    /// Tear down the engine subsystem. Called once, at process shutdown.
    fn shutdown(&self);
}

/// A live off-screen browser instance.
///
/// Handles are looked up per use and never cached: after close the handle
/// disappears and every caller must tolerate its absence.
pub trait Browser: Send + Sync {
    /// Tell the engine the viewport changed; it will re-query the paint
    /// sink's viewport and repaint at the new size asynchronously.
    fn viewport_changed(&self);

    /// Ask the browser to close. Advisory: the lifecycle sink may veto,
    /// and actual teardown is signaled separately.
    fn request_close(&self);

    /// Dispatch a pointer move (also used for drags).
    fn send_pointer_move(&self, event: PointerEvent);

    /// Dispatch a pointer button transition.
    fn send_pointer_button(
        &self,
        event: PointerEvent,
        button: PointerButton,
        released: bool,
        clicks: u32,
    );

    /// Dispatch a wheel scroll.
    fn send_wheel(&self, event: PointerEvent, delta_x: i32, delta_y: i32);

    /// Dispatch a keyboard character.
    fn send_key(&self, event: KeyEvent);
}

/// Browser lifecycle notifications, driven by the engine.
pub trait BrowserLifecycle: Send + Sync {
    /// The browser finished creating and is ready for dispatch.
    fn browser_created(&self, browser: Arc<dyn Browser>);

    /// The engine asks whether a pending close may continue.
    fn close_requested(&self) -> CloseDecision;

    /// The browser is gone. Owned resources may now be released. No
    /// further calls for this browser follow.
    fn browser_closed(&self);

    /// A page load finished with the given HTTP status.
    fn load_finished(&self, status: i32) {
        log::debug!("browser load finished (status {status})");
    }

    /// A page load failed.
    fn load_failed(&self, error: &str) {
        log::warn!("browser load failed: {error}");
    }
}

/// Receiver for the engine's paint notifications.
///
/// Invoked on the engine's own threads; implementations must return
/// promptly and never block on UI-side work.
pub trait PaintSink: Send + Sync {
    /// New pixels are available: a tightly packed BGRA buffer of
    /// `width × height` 32-bit pixels, top-to-bottom row order.
    fn on_paint(&self, pixels: &[u8], width: u32, height: u32);

    /// The viewport the engine should render at.
    fn viewport(&self) -> Viewport;
}

/// The scripting context's global scope, offered during context creation.
pub trait ScriptGlobal {
    /// Install a named object whose property accesses route through
    /// `interceptor`.
    fn install(&mut self, name: &str, interceptor: Arc<dyn ScriptInterceptor>);
}

/// Scripting-context lifecycle notifications, driven by the engine.
pub trait ScriptContextHandler: Send + Sync {
    /// A scripting context was created; bindings may be installed now.
    fn context_created(&self, global: &mut dyn ScriptGlobal);

    /// The scripting context went away; installed bindings are dead.
    fn context_released(&self);
}

/// Property get/set interception on an installed script object.
pub trait ScriptInterceptor: Send + Sync {
    /// Read a property. `None` means not intercepted: the engine falls
    /// back to default property resolution. Never raises.
    fn get(&self, name: &str) -> Option<ScriptValue>;

    /// Write a property. `Ok(false)` means not intercepted; `Ok(true)`
    /// means handled; `Err` raises a script exception for this call only.
    fn set(&self, name: &str, value: &ScriptValue) -> std::result::Result<bool, ScriptException>;
}

/// Pointer position in browser-viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// X in viewport pixels, origin top-left.
    pub x: i32,
    /// Y in viewport pixels, origin top-left.
    pub y: i32,
}

/// Pointer button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left / primary button.
    Primary,
    /// Middle button.
    Middle,
    /// Right / secondary button.
    Secondary,
}

/// A keyboard character event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The character produced by the key press.
    pub character: char,
}
