//! Engine runtime and per-plugin browser host.
//!
//! [`EngineRuntime`] is the process-scoped handle to the initialized engine
//! subsystem; it exists only after initialization succeeded, so anything
//! built from it is structurally guaranteed to run post-init.
//! [`BrowserHost`] manages the lifecycle of exactly one off-screen browser
//! per plugin instance. The browser outlives any editor window: editors
//! open and close against a host that keeps rendering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use vitrine_core::Viewport;

use crate::engine::{
    Browser, BrowserDriver, BrowserLifecycle, BrowserRequest, CloseDecision, Launch,
    ScriptContextHandler,
};
use crate::error::{EngineError, Result};
use crate::surface::FrameSurface;

/// Outcome of engine initialization.
pub enum EngineStartup {
    /// Main process: the runtime is live and hosts may be built from it.
    Ready(EngineRuntime),
    /// This process is an engine helper subprocess. The embedder must exit
    /// with `exit_code` immediately; no plugin construction may follow.
    HelperProcess {
        /// Process exit code the engine expects.
        exit_code: i32,
    },
}

/// Process-scoped handle to the initialized engine subsystem.
///
/// Initialize once per process, before any browser exists; dependents are
/// handed the runtime by reference instead of reaching for globals. The
/// subsystem shuts down when the runtime drops.
pub struct EngineRuntime {
    driver: Arc<dyn BrowserDriver>,
}

impl EngineRuntime {
    /// Perform one-time process-level engine initialization.
    ///
    /// On [`EngineStartup::HelperProcess`] the caller must exit the process
    /// with the carried code; everything else is short-circuited. A failure
    /// here is fatal for plugin construction: no editor is offered.
    pub fn initialize(driver: Arc<dyn BrowserDriver>) -> Result<EngineStartup> {
        match driver.initialize()? {
            Launch::Helper { exit_code } => {
                log::info!("engine helper subprocess finished (exit code {exit_code})");
                Ok(EngineStartup::HelperProcess { exit_code })
            }
            Launch::Main => {
                log::debug!("engine subsystem initialized");
                Ok(EngineStartup::Ready(EngineRuntime { driver }))
            }
        }
    }

    /// The process-wide driver.
    pub fn driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }
}

impl Drop for EngineRuntime {
    fn drop(&mut self) {
        log::debug!("shutting down engine subsystem");
        self.driver.shutdown();
    }
}

/// Shared slot holding the live browser handle and its lifecycle state.
///
/// The cell is the [`BrowserLifecycle`] sink handed to the engine, and the
/// lookup point for everyone needing to dispatch into the browser. Lookups
/// return `None` before creation, while a close is in flight, and after
/// close; callers treat that as a normal silent no-op state.
pub struct BrowserCell {
    slot: RwLock<Option<Arc<dyn Browser>>>,
    /// A create has been issued and not yet undone by a close.
    requested: AtomicBool,
    /// A close request was acknowledged; the handle is withheld from here
    /// until the closed notification lands.
    closing: AtomicBool,
    /// The initial page load finished (successfully or not).
    loaded: AtomicBool,
}

impl BrowserCell {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: RwLock::new(None),
            requested: AtomicBool::new(false),
            closing: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
        })
    }

    /// Current browser handle, or `None` if not yet created or closing.
    pub fn browser(&self) -> Option<Arc<dyn Browser>> {
        if self.closing.load(Ordering::Acquire) {
            return None;
        }
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the initial page load has finished.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }
}

impl BrowserLifecycle for BrowserCell {
    fn browser_created(&self, browser: Arc<dyn Browser>) {
        log::debug!("browser created");
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            log::warn!("browser_created with a live handle already in place; replacing");
        }
        *slot = Some(browser);
    }

    fn close_requested(&self) -> CloseDecision {
        log::debug!("browser close requested");
        self.closing.store(true, Ordering::Release);
        CloseDecision::Proceed
    }

    fn browser_closed(&self) {
        log::debug!("browser closed");
        // Release the handle only now that the engine confirmed teardown.
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.closing.store(false, Ordering::Release);
        self.loaded.store(false, Ordering::Release);
        self.requested.store(false, Ordering::Release);
    }

    fn load_finished(&self, status: i32) {
        log::debug!("browser load finished (status {status})");
        self.loaded.store(true, Ordering::Release);
    }

    fn load_failed(&self, error: &str) {
        log::warn!("browser load failed: {error}");
        // Matches load semantics elsewhere: a failed load still ends the
        // loading phase.
        self.loaded.store(true, Ordering::Release);
    }
}

/// Manages one off-screen browser and its frame surface.
///
/// Created once per plugin instance, before any editor UI exists, and
/// dropped on plugin teardown. Editor windows attach to and detach from
/// the host's surface any number of times in between.
pub struct BrowserHost {
    driver: Arc<dyn BrowserDriver>,
    surface: Arc<FrameSurface>,
    cell: Arc<BrowserCell>,
}

impl BrowserHost {
    /// Create a host against an initialized engine runtime.
    pub fn new(runtime: &EngineRuntime) -> Self {
        Self {
            driver: runtime.driver().clone(),
            surface: Arc::new(FrameSurface::new()),
            cell: BrowserCell::new(),
        }
    }

    /// Create the host's browser, rendering at `viewport` and loading
    /// `url`.
    ///
    /// Asynchronous: the handle is not available until the engine's
    /// created notification fires; poll [`BrowserHost::browser`]. At most
    /// one browser exists per host; a second call while one is live (or
    /// being created) fails with [`EngineError::BrowserExists`]. After a
    /// completed close the host may create again.
    pub fn create_browser(
        &self,
        viewport: Viewport,
        url: &str,
        script: Option<Arc<dyn ScriptContextHandler>>,
    ) -> Result<()> {
        if self.cell.requested.swap(true, Ordering::AcqRel) {
            return Err(EngineError::BrowserExists);
        }

        self.surface.resize(viewport);

        let request = BrowserRequest { viewport, url };
        let result = self.driver.create_browser(
            request,
            self.surface.clone(),
            self.cell.clone(),
            script,
        );
        if result.is_err() {
            self.cell.requested.store(false, Ordering::Release);
        }
        result
    }

    /// Resize the viewport.
    ///
    /// The frame surface reallocates immediately; the live browser is
    /// notified asynchronously and repaints at the new size on its own
    /// schedule. Until that paint lands, consumers see the surface's
    /// effective painted size, which may lag.
    pub fn resize_viewport(&self, width: u32, height: u32) {
        self.surface.resize(Viewport::new(width, height));
        if let Some(browser) = self.cell.browser() {
            browser.viewport_changed();
        }
    }

    /// Current browser handle, or `None` if not yet created or closing.
    pub fn browser(&self) -> Option<Arc<dyn Browser>> {
        self.cell.browser()
    }

    /// The shared lookup cell, for wiring input forwarding.
    pub fn cell(&self) -> Arc<BrowserCell> {
        self.cell.clone()
    }

    /// The frame surface the engine paints into, for wiring a presenter.
    pub fn frame_surface(&self) -> Arc<FrameSurface> {
        self.surface.clone()
    }

    /// Ask the browser to close.
    ///
    /// Advisory and asynchronous: the engine consults the lifecycle sink,
    /// and resources are released only once the closed notification lands.
    /// A no-op without a live browser.
    pub fn request_close(&self) {
        if let Some(browser) = self.cell.browser() {
            browser.request_close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::engine::{KeyEvent, PaintSink, PointerButton, PointerEvent};

    /// Records dispatched browser calls.
    #[derive(Default)]
    struct FakeBrowser {
        events: Mutex<Vec<String>>,
    }

    impl Browser for FakeBrowser {
        fn viewport_changed(&self) {
            self.events.lock().unwrap().push("viewport_changed".into());
        }
        fn request_close(&self) {
            self.events.lock().unwrap().push("request_close".into());
        }
        fn send_pointer_move(&self, event: PointerEvent) {
            self.events
                .lock()
                .unwrap()
                .push(format!("move {},{}", event.x, event.y));
        }
        fn send_pointer_button(
            &self,
            event: PointerEvent,
            button: PointerButton,
            released: bool,
            clicks: u32,
        ) {
            self.events.lock().unwrap().push(format!(
                "button {:?} released={released} clicks={clicks} at {},{}",
                button, event.x, event.y
            ));
        }
        fn send_wheel(&self, event: PointerEvent, delta_x: i32, delta_y: i32) {
            self.events
                .lock()
                .unwrap()
                .push(format!("wheel {delta_x},{delta_y} at {},{}", event.x, event.y));
        }
        fn send_key(&self, event: KeyEvent) {
            self.events
                .lock()
                .unwrap()
                .push(format!("key {}", event.character));
        }
    }

    /// Driver whose lifecycle is stepped manually from tests.
    #[derive(Default)]
    struct FakeDriver {
        helper_exit: Option<i32>,
        fail_create: bool,
        created: Mutex<Vec<(Viewport, String)>>,
        lifecycle: Mutex<Option<Arc<dyn BrowserLifecycle>>>,
        shutdowns: AtomicBool,
    }

    impl BrowserDriver for FakeDriver {
        fn initialize(&self) -> Result<Launch> {
            match self.helper_exit {
                Some(exit_code) => Ok(Launch::Helper { exit_code }),
                None => Ok(Launch::Main),
            }
        }

        fn create_browser(
            &self,
            request: BrowserRequest<'_>,
            _paint: Arc<dyn PaintSink>,
            lifecycle: Arc<dyn BrowserLifecycle>,
            _script: Option<Arc<dyn ScriptContextHandler>>,
        ) -> Result<()> {
            if self.fail_create {
                return Err(EngineError::CreationFailed("rejected".into()));
            }
            self.created
                .lock()
                .unwrap()
                .push((request.viewport, request.url.to_string()));
            *self.lifecycle.lock().unwrap() = Some(lifecycle);
            Ok(())
        }

        fn shutdown(&self) {
            self.shutdowns.store(true, Ordering::SeqCst);
        }
    }

    impl FakeDriver {
        fn finish_creation(&self) -> Arc<FakeBrowser> {
            let browser = Arc::new(FakeBrowser::default());
            let lifecycle = self.lifecycle.lock().unwrap().clone().unwrap();
            lifecycle.browser_created(browser.clone());
            browser
        }

        fn lifecycle(&self) -> Arc<dyn BrowserLifecycle> {
            self.lifecycle.lock().unwrap().clone().unwrap()
        }
    }

    fn runtime(driver: Arc<FakeDriver>) -> EngineRuntime {
        match EngineRuntime::initialize(driver).unwrap() {
            EngineStartup::Ready(runtime) => runtime,
            EngineStartup::HelperProcess { .. } => panic!("unexpected helper launch"),
        }
    }

    #[test]
    fn test_helper_subprocess_short_circuits() {
        let driver = Arc::new(FakeDriver {
            helper_exit: Some(7),
            ..Default::default()
        });
        match EngineRuntime::initialize(driver.clone()).unwrap() {
            EngineStartup::HelperProcess { exit_code } => assert_eq!(exit_code, 7),
            EngineStartup::Ready(_) => panic!("helper launch must not yield a runtime"),
        }
        // Nothing was created.
        assert!(driver.created.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handle_is_null_until_created() {
        let driver = Arc::new(FakeDriver::default());
        let runtime = runtime(driver.clone());
        let host = BrowserHost::new(&runtime);

        assert!(host.browser().is_none());
        host.create_browser(Viewport::new(800, 600), "https://ui.local/", None)
            .unwrap();
        assert!(host.browser().is_none(), "creation is asynchronous");

        driver.finish_creation();
        assert!(host.browser().is_some());
        assert_eq!(
            driver.created.lock().unwrap()[0],
            (Viewport::new(800, 600), "https://ui.local/".to_string())
        );
    }

    #[test]
    fn test_create_sizes_the_surface() {
        let driver = Arc::new(FakeDriver::default());
        let runtime = runtime(driver);
        let host = BrowserHost::new(&runtime);
        host.create_browser(Viewport::new(640, 360), "about:blank", None)
            .unwrap();
        assert_eq!(host.frame_surface().viewport(), Viewport::new(640, 360));
    }

    #[test]
    fn test_second_create_fails() {
        let driver = Arc::new(FakeDriver::default());
        let runtime = runtime(driver.clone());
        let host = BrowserHost::new(&runtime);
        host.create_browser(Viewport::new(800, 600), "about:blank", None)
            .unwrap();
        assert!(matches!(
            host.create_browser(Viewport::new(800, 600), "about:blank", None),
            Err(EngineError::BrowserExists)
        ));
    }

    #[test]
    fn test_failed_create_can_be_retried() {
        let driver = Arc::new(FakeDriver {
            fail_create: true,
            ..Default::default()
        });
        let runtime = runtime(driver);
        let host = BrowserHost::new(&runtime);
        assert!(host
            .create_browser(Viewport::new(800, 600), "about:blank", None)
            .is_err());

        // The pending flag was rolled back; the next attempt is not
        // rejected as a duplicate.
        assert!(matches!(
            host.create_browser(Viewport::new(800, 600), "about:blank", None),
            Err(EngineError::CreationFailed(_))
        ));
    }

    #[test]
    fn test_resize_reaches_surface_and_browser() {
        let driver = Arc::new(FakeDriver::default());
        let runtime = runtime(driver.clone());
        let host = BrowserHost::new(&runtime);
        host.create_browser(Viewport::new(800, 600), "about:blank", None)
            .unwrap();
        let browser = driver.finish_creation();

        host.resize_viewport(400, 300);
        assert_eq!(host.frame_surface().viewport(), Viewport::new(400, 300));
        assert_eq!(browser.events.lock().unwrap().as_slice(), ["viewport_changed"]);
    }

    #[test]
    fn test_resize_without_browser_is_silent() {
        let driver = Arc::new(FakeDriver::default());
        let runtime = runtime(driver);
        let host = BrowserHost::new(&runtime);
        host.resize_viewport(400, 300);
        assert_eq!(host.frame_surface().viewport(), Viewport::new(400, 300));
    }

    #[test]
    fn test_close_protocol_ordering() {
        let driver = Arc::new(FakeDriver::default());
        let runtime = runtime(driver.clone());
        let host = BrowserHost::new(&runtime);
        host.create_browser(Viewport::new(800, 600), "about:blank", None)
            .unwrap();
        let browser = driver.finish_creation();

        // Advisory request reaches the browser; the handle stays live.
        host.request_close();
        assert_eq!(browser.events.lock().unwrap().as_slice(), ["request_close"]);
        assert!(host.browser().is_some());

        // Engine asks; from acknowledgement on, the handle is withheld.
        let lifecycle = driver.lifecycle();
        assert_eq!(lifecycle.close_requested(), CloseDecision::Proceed);
        assert!(host.browser().is_none());

        // Teardown confirmation releases the slot and allows re-creation.
        lifecycle.browser_closed();
        assert!(host.browser().is_none());
        assert!(host
            .create_browser(Viewport::new(800, 600), "about:blank", None)
            .is_ok());
    }

    #[test]
    fn test_load_state_tracking() {
        let driver = Arc::new(FakeDriver::default());
        let runtime = runtime(driver.clone());
        let host = BrowserHost::new(&runtime);
        host.create_browser(Viewport::new(800, 600), "about:blank", None)
            .unwrap();
        driver.finish_creation();
        let cell = host.cell();

        assert!(!cell.is_loaded());
        driver.lifecycle().load_finished(200);
        assert!(cell.is_loaded());

        driver.lifecycle().browser_closed();
        assert!(!cell.is_loaded());
    }

    #[test]
    fn test_runtime_drop_shuts_down_driver() {
        let driver = Arc::new(FakeDriver::default());
        drop(runtime(driver.clone()));
        assert!(driver.shutdowns.load(Ordering::SeqCst));
    }
}
