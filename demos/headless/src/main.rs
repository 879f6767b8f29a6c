//! Headless vitrine demo.
//!
//! Wires the full bridge — engine runtime, browser host, frame surface,
//! parameter bindings, input forwarding, presentation — against a
//! synthetic engine driver that paints a BGRA test gradient instead of web
//! content. One presented frame is written to `frame.ppm`, and a few
//! script-driven parameter writes are simulated through the installed
//! interceptor.

use std::sync::{Arc, Mutex};

use vitrine::prelude::*;

// ---------------------------------------------------------------------------
// Synthetic engine
// ---------------------------------------------------------------------------

/// Engine driver whose single browser paints a gradient on demand.
#[derive(Default)]
struct TestPatternDriver {
    /// Interceptor captured from the script-context installation, so the
    /// demo can play the role of script code.
    interceptor: Mutex<Option<Arc<dyn ScriptInterceptor>>>,
}

impl BrowserDriver for TestPatternDriver {
    fn initialize(&self) -> Result<Launch, EngineError> {
        Ok(Launch::Main)
    }

    fn create_browser(
        &self,
        request: BrowserRequest<'_>,
        paint: Arc<dyn PaintSink>,
        lifecycle: Arc<dyn BrowserLifecycle>,
        script: Option<Arc<dyn ScriptContextHandler>>,
    ) -> Result<(), EngineError> {
        log::info!("creating test-pattern browser for {}", request.url);
        let browser = Arc::new(TestPatternBrowser {
            paint,
            lifecycle: lifecycle.clone(),
        });
        browser.repaint();
        lifecycle.browser_created(browser);
        lifecycle.load_finished(200);

        if let Some(script) = script {
            let mut global = CapturingGlobal {
                slot: &self.interceptor,
            };
            script.context_created(&mut global);
        }
        Ok(())
    }

    fn shutdown(&self) {}
}

struct TestPatternBrowser {
    paint: Arc<dyn PaintSink>,
    lifecycle: Arc<dyn BrowserLifecycle>,
}

impl TestPatternBrowser {
    /// Paint a gradient at whatever viewport the sink reports.
    fn repaint(&self) {
        let viewport = self.paint.viewport();
        if viewport.is_empty() {
            return;
        }
        let mut pixels = Vec::with_capacity(viewport.pixel_count() * 4);
        for y in 0..viewport.height {
            for x in 0..viewport.width {
                let b = (x * 255 / viewport.width.max(1)) as u8;
                let g = (y * 255 / viewport.height.max(1)) as u8;
                pixels.extend_from_slice(&[b, g, 0x40, 0xff]);
            }
        }
        self.paint.on_paint(&pixels, viewport.width, viewport.height);
    }
}

impl Browser for TestPatternBrowser {
    fn viewport_changed(&self) {
        self.repaint();
    }

    fn request_close(&self) {
        if self.lifecycle.close_requested() == CloseDecision::Proceed {
            self.lifecycle.browser_closed();
        }
    }

    fn send_pointer_move(&self, event: PointerEvent) {
        log::debug!("pointer move at {},{}", event.x, event.y);
    }

    fn send_pointer_button(
        &self,
        event: PointerEvent,
        button: PointerButton,
        released: bool,
        _clicks: u32,
    ) {
        log::debug!(
            "pointer {:?} {} at {},{}",
            button,
            if released { "up" } else { "down" },
            event.x,
            event.y
        );
    }

    fn send_wheel(&self, _event: PointerEvent, _delta_x: i32, delta_y: i32) {
        log::debug!("wheel {delta_y}");
    }

    fn send_key(&self, event: KeyEvent) {
        log::debug!("key '{}'", event.character);
    }
}

/// Captures the installed interceptor the way a scripting engine would
/// retain it.
struct CapturingGlobal<'a> {
    slot: &'a Mutex<Option<Arc<dyn ScriptInterceptor>>>,
}

impl ScriptGlobal for CapturingGlobal<'_> {
    fn install(&mut self, name: &str, interceptor: Arc<dyn ScriptInterceptor>) {
        log::info!("script global '{name}' installed");
        *self.slot.lock().unwrap() = Some(interceptor);
    }
}

// ---------------------------------------------------------------------------
// GPU surface stub
// ---------------------------------------------------------------------------

/// Collects the submitted RGBA frame and writes it out as binary PPM.
#[derive(Default)]
struct PpmSurface {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl GpuSurface for PpmSurface {
    fn clear(&mut self) {
        self.pixels.clear();
    }

    fn draw_pixels(&mut self, pixels: &[u8], width: u32, height: u32) {
        self.pixels.extend_from_slice(pixels);
        self.width = width;
        self.height = height;
    }
}

impl PpmSurface {
    fn write(&self, path: &str) -> std::io::Result<()> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("P6\n{} {}\n255\n", self.width, self.height).as_bytes());
        // Submitted rows are bottom-up (GL convention); PPM is top-down.
        let stride = self.width as usize * 4;
        for row in (0..self.height as usize).rev() {
            for rgba in self.pixels[row * stride..(row + 1) * stride].chunks_exact(4) {
                out.extend_from_slice(&rgba[..3]);
            }
        }
        std::fs::write(path, out)
    }
}

// ---------------------------------------------------------------------------

/// Prints edits the way a plugin host records automation.
struct PrintingHost;

impl AutomationHost for PrintingHost {
    fn parameter_edited(&self, name: &str, value: f64) {
        println!("automation: {name} = {value}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let parameters = Arc::new(ParameterSet::new(vec![
        FloatParameter::new("freq", 20.0, 20.0..=20_000.0),
        FloatParameter::new("gain", 0.5, 0.0..=1.0),
        FloatParameter::new("q", 1.0, 1.0..=10.0),
    ]));
    parameters.set_automation_host(Arc::new(PrintingHost));

    let driver = Arc::new(TestPatternDriver::default());
    let runtime = match EngineRuntime::initialize(driver.clone())? {
        EngineStartup::Ready(runtime) => runtime,
        EngineStartup::HelperProcess { exit_code } => std::process::exit(exit_code),
    };

    let host = BrowserHost::new(&runtime);
    let bindings = Arc::new(ParameterBindings::new(parameters.clone()));
    host.create_browser(Viewport::new(320, 200), "vitrine://demo/", Some(bindings))?;

    // An editor window opens and stretches the viewport.
    host.resize_viewport(640, 400);
    let forwarder = InputForwarder::new(&host, InputConfig::default());
    forwarder.pointer_moved(10.0, 10.0);
    forwarder.key_char('v');

    // One refresh tick.
    let mut bridge = PresentationBridge::new(host.frame_surface());
    let mut target = PpmSurface::default();
    bridge.present_frame(&mut target);
    target.write("frame.ppm")?;
    println!("wrote {}x{} frame to frame.ppm", target.width, target.height);

    // Script-driven parameter traffic through the installed interceptor.
    let interceptor = driver
        .interceptor
        .lock()
        .unwrap()
        .clone()
        .expect("bindings were installed at browser creation");
    println!("script reads gain as {:?}", interceptor.get("gain"));
    interceptor.set("gain", &ScriptValue::from(0.8))?;
    interceptor.set("freq", &ScriptValue::from(440.0))?;
    if let Err(exception) = interceptor.set("q", &ScriptValue::from("wide")) {
        println!("script exception: {exception}");
    }
    println!("parameter snapshot: {}", parameters.snapshot_json());

    host.request_close();
    assert!(host.browser().is_none());
    Ok(())
}
