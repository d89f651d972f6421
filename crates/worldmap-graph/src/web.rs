//! Browser entry point
//!
//! Mounts the map on `<canvas id="worldmap_canvas">`, loads the world from
//! the page origin and forwards map events to the page through [`JsBridge`].

use std::sync::{Arc, Mutex};

use wasm_bindgen::JsCast;

use crate::api::ApiClient;
use crate::bridge::JsBridge;
use crate::config::MapConfig;
use crate::graph::{MapEvent, WorldMapWidget};
use crate::loader::{load_world, LoadedWorld};

pub const CANVAS_ID: &str = "worldmap_canvas";

pub struct WebApp {
    map: WorldMapWidget,
    bridge: JsBridge,
    api: ApiClient,
    pending_load: Option<Arc<Mutex<Option<LoadedWorld>>>>,
    loader_events: Arc<Mutex<Vec<MapEvent>>>,
}

impl WebApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut config = MapConfig::default();
        if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
            config.api_base_url = origin;
        }
        let mut app = Self {
            api: ApiClient::new(&config.api_base_url),
            map: WorldMapWidget::new(config),
            bridge: JsBridge::new(),
            pending_load: None,
            loader_events: Arc::new(Mutex::new(Vec::new())),
        };
        app.start_load(&cc.egui_ctx);
        app.bridge.emit_ready();
        app
    }

    fn start_load(&mut self, ctx: &egui::Context) {
        let api = self.api.clone();
        let result = Arc::new(Mutex::new(None));
        let result_clone = result.clone();
        let events = self.loader_events.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let repaint = ctx.clone();
            let loaded = load_world(&api, move |event| {
                if let Ok(mut queue) = events.lock() {
                    queue.push(event);
                }
                repaint.request_repaint();
            })
            .await;
            if let Ok(mut slot) = result_clone.lock() {
                *slot = Some(loaded);
            }
            ctx.request_repaint();
        });

        self.pending_load = Some(result);
    }

    fn check_pending(&mut self) {
        let events: Vec<MapEvent> = self
            .loader_events
            .try_lock()
            .map(|mut q| q.drain(..).collect())
            .unwrap_or_default();
        for event in events {
            self.handle_event(event);
        }

        let loaded = self
            .pending_load
            .as_ref()
            .and_then(|p| p.try_lock().ok())
            .and_then(|mut g| g.take());
        if let Some(loaded) = loaded {
            if let Some(event) = self.map.set_world(loaded.data) {
                self.handle_event(event);
            }
            self.pending_load = None;
        }
    }

    fn handle_event(&mut self, event: MapEvent) {
        if let MapEvent::LoadingChanged(loading) = event {
            self.map.set_loading(loading);
        }
        self.bridge.emit(&event);
    }
}

impl eframe::App for WebApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_pending();
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                for event in self.map.ui(ui) {
                    self.handle_event(event);
                }
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.map.dispose();
    }
}

fn find_canvas() -> Option<web_sys::HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(CANVAS_ID)?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(canvas) = find_canvas() else {
            tracing::error!("no <canvas id=\"{}\"> on the page", CANVAS_ID);
            return;
        };
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(|cc| Ok(Box::new(WebApp::new(cc)))),
            )
            .await;
        if let Err(e) = started {
            tracing::error!("failed to start eframe: {:?}", e);
        }
    });
}
