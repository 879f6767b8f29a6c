//! Input forwarding from the native editor into the browser.
//!
//! Pointer and keyboard events arrive in the editor window's local
//! coordinate space and leave in browser-viewport coordinates. The two
//! spaces share a top-left origin, so the mapping is the identity in the
//! common case; it only bends while the editor window and the browser
//! viewport are sized independently. Every forward is a silent no-op when
//! no browser is live.

use std::sync::{Arc, Mutex, PoisonError};

use vitrine_core::Viewport;

use crate::engine::{KeyEvent, PaintSink, PointerButton, PointerEvent};
use crate::host::{BrowserCell, BrowserHost};
use crate::surface::FrameSurface;

/// Wheel deltas arrive normalized; the browser expects pixel-ish steps.
const WHEEL_DELTA_SCALE: f32 = 100.0;

/// Input forwarding configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputConfig {
    /// Forward wheel events to the browser. Off by default: wheel
    /// delivery is best-effort and embedders opt in explicitly.
    pub forward_wheel: bool,
}

/// Translates native editor input into browser input events.
pub struct InputForwarder {
    cell: Arc<BrowserCell>,
    surface: Arc<FrameSurface>,
    editor: Mutex<Viewport>,
    config: InputConfig,
}

impl InputForwarder {
    /// Create a forwarder for the given host.
    ///
    /// The editor size starts equal to the browser viewport (identity
    /// mapping) and is updated via [`InputForwarder::editor_resized`].
    pub fn new(host: &BrowserHost, config: InputConfig) -> Self {
        let surface = host.frame_surface();
        let editor = surface.viewport();
        Self {
            cell: host.cell(),
            surface,
            editor: Mutex::new(editor),
            config,
        }
    }

    /// The editor window was resized; recompute the coordinate mapping.
    pub fn editor_resized(&self, width: u32, height: u32) {
        let mut editor = self.editor.lock().unwrap_or_else(PoisonError::into_inner);
        *editor = Viewport::new(width, height);
    }

    /// Map editor-local coordinates into viewport coordinates.
    fn map(&self, x: f32, y: f32) -> PointerEvent {
        let editor = *self.editor.lock().unwrap_or_else(PoisonError::into_inner);
        let viewport = self.surface.viewport();
        if editor == viewport || editor.is_empty() {
            return PointerEvent {
                x: x as i32,
                y: y as i32,
            };
        }
        PointerEvent {
            x: (x * viewport.width as f32 / editor.width as f32) as i32,
            y: (y * viewport.height as f32 / editor.height as f32) as i32,
        }
    }

    /// Forward a pointer move.
    pub fn pointer_moved(&self, x: f32, y: f32) {
        if let Some(browser) = self.cell.browser() {
            browser.send_pointer_move(self.map(x, y));
        }
    }

    /// Forward a pointer drag. Drags use the same mapping and event shape
    /// as moves.
    pub fn pointer_dragged(&self, x: f32, y: f32) {
        self.pointer_moved(x, y);
    }

    /// Forward a button press.
    pub fn pointer_down(&self, x: f32, y: f32, button: PointerButton, clicks: u32) {
        if let Some(browser) = self.cell.browser() {
            browser.send_pointer_button(self.map(x, y), button, false, clicks);
        }
    }

    /// Forward a button release.
    pub fn pointer_up(&self, x: f32, y: f32, button: PointerButton, clicks: u32) {
        if let Some(browser) = self.cell.browser() {
            browser.send_pointer_button(self.map(x, y), button, true, clicks);
        }
    }

    /// Forward a wheel scroll, if wheel forwarding is enabled.
    ///
    /// Best-effort: delivery is not guaranteed and nothing depends on it.
    pub fn wheel(&self, x: f32, y: f32, delta_y: f32) {
        if !self.config.forward_wheel {
            return;
        }
        if let Some(browser) = self.cell.browser() {
            let delta = (delta_y * WHEEL_DELTA_SCALE) as i32;
            browser.send_wheel(self.map(x, y), 0, delta);
        }
    }

    /// Forward a keyboard character.
    pub fn key_char(&self, character: char) {
        if let Some(browser) = self.cell.browser() {
            browser.send_key(KeyEvent { character });
        }
    }
}
