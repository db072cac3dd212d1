//! Headlight Planet entry point
//!
//! Handles platform-specific initialization and drives the engine's frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, Response};

    use headlight_planet::renderer::BillboardRenderer;
    use headlight_planet::sim::ObstacleTemplate;
    use headlight_planet::{
        AssetLoadError, Engine, EngineError, FpsCounter, FrameOutcome, Settings,
    };

    type SharedEngine = Rc<RefCell<Engine<BillboardRenderer>>>;

    /// Engine plus the pending animation-frame request
    #[derive(Clone)]
    struct Game {
        engine: SharedEngine,
        frame_handle: Rc<Cell<Option<i32>>>,
        /// Present only when the FPS readout is enabled
        fps: Option<Rc<RefCell<FpsCounter>>>,
    }

    impl Game {
        /// Start the engine and schedule a frame if it wasn't already running
        fn resume(&self) {
            match self.engine.borrow_mut().start() {
                Ok(true) => request_animation_frame(self.clone()),
                Ok(false) => {}
                Err(e) => log::warn!("Cannot resume: {}", e),
            }
        }

        /// Stop the engine and cancel the pending frame
        fn pause(&self) {
            self.engine.borrow_mut().stop();
            if let Some(handle) = self.frame_handle.take()
                && let Some(window) = web_sys::window()
            {
                let _ = window.cancel_animation_frame(handle);
            }
            if let Some(fps) = &self.fps {
                fps.borrow_mut().reset();
            }
        }
    }

    fn set_text(selector: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.query_selector(selector).ok().flatten())
        {
            el.set_text_content(Some(text));
        }
    }

    fn set_class(id: &str, class: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            let _ = el.set_attribute("class", class);
        }
    }

    pub async fn run() -> Result<(), EngineError> {
        log::info!("Headlight Planet starting...");

        let window = web_sys::window()
            .ok_or_else(|| EngineError::ContextUnavailable("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| EngineError::ContextUnavailable("no document".into()))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| EngineError::ContextUnavailable("no #canvas element".into()))?
            .dyn_into()
            .map_err(|_| EngineError::ContextUnavailable("#canvas is not a canvas".into()))?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| EngineError::ContextUnavailable(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| EngineError::Adapter(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = BillboardRenderer::new(surface, &adapter, width, height).await?;

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        // Write back so first-time visitors get an editable entry
        settings.save();
        let config = settings.game_config(seed);
        let model_path = config.obstacle_model_path.clone();

        let engine = Engine::new(config, renderer)
            .with_hit_callback(|hits| set_text("#hud-hits .hud-value", &hits.to_string()))
            .with_finish_callback(|hits| {
                set_text("#final-hits", &hits.to_string());
                set_class("game-over", "");
            });

        let game = Game {
            engine: Rc::new(RefCell::new(engine)),
            frame_handle: Rc::new(Cell::new(None)),
            fps: settings
                .show_fps
                .then(|| Rc::new(RefCell::new(FpsCounter::new()))),
        };
        log::info!("Game initialized with seed: {}", seed);

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }
        set_class("hud", "");
        set_class(
            "hud-fps",
            if settings.show_fps { "hud-item" } else { "hud-item hidden" },
        );

        setup_keyboard(&game)?;
        setup_restart_button(&game);
        setup_auto_stop(&game);
        setup_resize(&game, canvas);
        setup_teardown(&game);

        // Obstacles arrive whenever the model does; driving starts right away
        {
            let engine = game.engine.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let loaded = fetch_text(&model_path)
                    .await
                    .and_then(|json| ObstacleTemplate::from_json(&model_path, &json));
                engine.borrow_mut().supply_obstacles(loaded);
            });
        }

        game.resume();
        log::info!("Headlight Planet running!");
        Ok(())
    }

    async fn fetch_text(path: &str) -> Result<String, AssetLoadError> {
        let fail = |reason: String| AssetLoadError::Fetch {
            path: path.to_string(),
            reason,
        };

        let window = web_sys::window().ok_or_else(|| fail("no window".into()))?;
        let response = JsFuture::from(window.fetch_with_str(path))
            .await
            .map_err(|e| fail(format!("{:?}", e)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| fail("fetch did not return a Response".into()))?;
        if !response.ok() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        let body = response.text().map_err(|e| fail(format!("{:?}", e)))?;
        JsFuture::from(body)
            .await
            .map_err(|e| fail(format!("{:?}", e)))?
            .as_string()
            .ok_or_else(|| fail("body is not text".into()))
    }

    /// Key listeners live until the engine is disposed
    fn setup_keyboard(game: &Game) -> Result<(), EngineError> {
        let window = web_sys::window()
            .ok_or_else(|| EngineError::ContextUnavailable("no window".into()))?;

        let listeners = [("keydown", true), ("keyup", false)].map(|(event_name, pressed)| {
            let engine = game.engine.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                let mut engine = engine.borrow_mut();
                if engine.config().bindings.is_driving_key(&code) {
                    event.prevent_default();
                }
                engine.set_key_state(&code, pressed);
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            (event_name, closure)
        });

        game.engine.borrow_mut().on_dispose(move || {
            if let Some(window) = web_sys::window() {
                for (event_name, closure) in &listeners {
                    let _ = window.remove_event_listener_with_callback(
                        event_name,
                        closure.as_ref().unchecked_ref(),
                    );
                }
            }
            log::debug!("Keyboard listeners removed");
        });
        Ok(())
    }

    fn request_animation_frame(game: Game) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let handle_slot = game.frame_handle.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => handle_slot.set(Some(handle)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Game, time: f64) {
        game.frame_handle.set(None);

        // Callbacks fired inside frame() must not touch the engine again
        let outcome = game.engine.borrow_mut().frame(time / 1000.0);
        if let Some(fps) = &game.fps {
            let rate = fps.borrow_mut().record(time / 1000.0);
            set_text("#hud-fps .hud-value", &rate.to_string());
        }
        match outcome {
            Ok(FrameOutcome::Continue) => request_animation_frame(game),
            Ok(FrameOutcome::Stopped) => {}
            Err(e) => {
                log::error!("Render error: {}", e);
                game.pause();
            }
        }
    }

    fn setup_restart_button(game: &Game) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("restart-btn"))
        else {
            return;
        };

        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let seed = js_sys::Date::now() as u64;
            game.pause();
            if let Err(e) = game.engine.borrow_mut().restart(seed) {
                log::warn!("Restart failed: {}", e);
                return;
            }
            set_text("#hud-hits .hud-value", "0");
            set_class("game-over", "hidden");
            game.resume();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Stop while the tab is hidden, resume when it comes back
    fn setup_auto_stop(game: &Game) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let game = game.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                game.pause();
                log::info!("Auto-stopped (tab hidden)");
            } else if !game.engine.borrow().is_round_over() {
                game.resume();
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(game: &Game, canvas: HtmlCanvasElement) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let engine = game.engine.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            let width = (canvas.client_width() as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            engine.borrow_mut().resize(width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_teardown(game: &Game) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.pause();
            game.engine.borrow_mut().dispose();
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    if let Err(e) = wasm_game::run().await {
        log::error!("Failed to start: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Headlight Planet (native) starting...");
    log::info!("Native mode runs a headless drive - run with `trunk serve` for the web version");

    // Optional quality preset as the first argument: low, medium or high
    let settings = match std::env::args().nth(1) {
        Some(arg) => match headlight_planet::QualityPreset::parse(&arg) {
            Some(preset) => headlight_planet::Settings::from_preset(preset),
            None => {
                log::warn!("Unknown quality preset '{}', using defaults", arg);
                headlight_planet::Settings::load()
            }
        },
        None => headlight_planet::Settings::load(),
    };

    let hits = scripted_drive(settings, 10.0);
    println!("Headless drive finished with {} hits", hits);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive for `seconds` at 60 fps with a fixed steering script
#[cfg(not(target_arch = "wasm32"))]
fn scripted_drive(settings: headlight_planet::Settings, seconds: f32) -> u32 {
    use headlight_planet::renderer::HeadlessRenderer;
    use headlight_planet::sim::ObstacleTemplate;
    use headlight_planet::{AssetLoadError, Engine, FpsCounter, FrameOutcome};

    const FRAME: f64 = 1.0 / 60.0;

    let mut fps = settings.show_fps.then(FpsCounter::new);

    let config = settings.game_config(0x5EED);
    let model_path = config.obstacle_model_path.clone();
    let mut engine = Engine::new(config, HeadlessRenderer::new())
        .with_hit_callback(|hits| log::info!("Hit! total {}", hits));

    let loaded = std::fs::read_to_string(&model_path)
        .map_err(|e| AssetLoadError::Fetch {
            path: model_path.clone(),
            reason: e.to_string(),
        })
        .and_then(|json| ObstacleTemplate::from_json(&model_path, &json));
    engine.supply_obstacles(loaded);

    if let Err(e) = engine.start() {
        log::error!("Failed to start: {}", e);
        return 0;
    }

    engine.set_key_state("ArrowUp", true);
    let frames = (seconds as f64 / FRAME) as u32;
    for i in 0..=frames {
        let now = i as f64 * FRAME;
        match now {
            t if (2.0..4.0).contains(&t) => engine.set_key_state("ArrowRight", true),
            t if (6.0..7.0).contains(&t) => engine.set_key_state("ArrowLeft", true),
            _ => {
                engine.set_key_state("ArrowRight", false);
                engine.set_key_state("ArrowLeft", false);
            }
        }

        if let Some(fps) = fps.as_mut() {
            fps.record(now);
        }
        match engine.frame(now) {
            Ok(FrameOutcome::Continue) => {}
            Ok(FrameOutcome::Stopped) => break,
            Err(e) => {
                log::error!("Frame failed: {}", e);
                break;
            }
        }
    }

    let hits = engine.hits();
    if let Some(fps) = &fps {
        log::info!("Simulated frame rate: {} fps", fps.fps());
    }
    log::info!(
        "Drove {:.1}s, {} obstacles left, {} frames rendered",
        engine.elapsed(),
        engine.obstacles().len(),
        engine.renderer().frames
    );
    engine.dispose();
    hits
}
