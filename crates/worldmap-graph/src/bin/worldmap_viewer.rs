//! World Map Viewer - native host for the world map widget
//!
//! Loads the world from the content API (or a JSON dump) and shows it in
//! an eframe window. Zone clicks are reported in the side panel and logged.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use clap::Parser;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    use worldmap_graph::graph::ZoneId;
    use worldmap_graph::loader::FileSource;
    use worldmap_graph::{
        load_world, ApiClient, JsBridge, LoadedWorld, MapConfig, MapEvent, WorldMapWidget,
    };

    /// Zoomable world map viewer
    #[derive(Parser, Debug)]
    #[command(name = "worldmap-viewer")]
    #[command(about = "Browse MUD zones and rooms on a zoomable map")]
    struct Args {
        /// Map config file (YAML, or JSON by extension)
        #[arg(long, short = 'c', env = "WORLDMAP_CONFIG")]
        config: Option<PathBuf>,

        /// Content API base URL (overrides the config)
        #[arg(long, env = "WORLDMAP_API")]
        api: Option<String>,

        /// Load a `{zones, rooms}` JSON dump instead of calling the API
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    }

    #[derive(Clone)]
    enum Source {
        Api(ApiClient),
        File(FileSource),
    }

    type PendingLoad = Arc<Mutex<Option<LoadedWorld>>>;

    struct ViewerApp {
        map: WorldMapWidget,
        bridge: JsBridge,
        source: Source,
        runtime: Arc<tokio::runtime::Runtime>,
        pending_load: Option<PendingLoad>,
        /// Events raised by the loader thread, drained each frame
        loader_events: Arc<Mutex<Vec<MapEvent>>>,
        selected_zone: Option<ZoneId>,
        error: Option<String>,
    }

    impl ViewerApp {
        fn new(config: MapConfig, source: Source, runtime: Arc<tokio::runtime::Runtime>) -> Self {
            Self {
                map: WorldMapWidget::new(config),
                bridge: JsBridge::new(),
                source,
                runtime,
                pending_load: None,
                loader_events: Arc::new(Mutex::new(Vec::new())),
                selected_zone: None,
                error: None,
            }
        }

        fn start_load(&mut self, ctx: &egui::Context) {
            if self.pending_load.is_some() {
                return;
            }
            self.error = None;

            let source = self.source.clone();
            let runtime = self.runtime.clone();
            let result: PendingLoad = Arc::new(Mutex::new(None));
            let result_clone = result.clone();
            let events = self.loader_events.clone();
            let ctx = ctx.clone();

            std::thread::spawn(move || {
                let repaint = ctx.clone();
                let emit = move |event: MapEvent| {
                    if let Ok(mut queue) = events.lock() {
                        queue.push(event);
                    }
                    repaint.request_repaint();
                };
                let loaded = match source {
                    Source::Api(api) => runtime.block_on(load_world(&api, emit)),
                    Source::File(file) => pollster::block_on(load_world(&file, emit)),
                };
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
                if let Some(e) = &loaded.error {
                    self.error = Some(format!("Failed to load world: {}", e));
                } else if loaded.rejected_rooms + loaded.rejected_exits > 0 {
                    self.error = Some(format!(
                        "{} rooms and {} exits skipped (invalid rows)",
                        loaded.rejected_rooms, loaded.rejected_exits
                    ));
                }
                if let Some(event) = self.map.set_world(loaded.data) {
                    self.handle_event(event);
                }
                self.pending_load = None;
            }
        }

        fn handle_event(&mut self, event: MapEvent) {
            match event {
                MapEvent::ZoneClicked(zone_id) => {
                    tracing::info!("zone {} selected", zone_id);
                    self.selected_zone = Some(zone_id);
                }
                MapEvent::LoadingChanged(loading) => self.map.set_loading(loading),
                MapEvent::ViewModeChanged(mode) => {
                    tracing::debug!("view mode: {}", mode.label());
                }
            }
            self.bridge.emit(&event);
        }

        fn render_side_panel(&mut self, ctx: &egui::Context) {
            egui::SidePanel::right("zone_panel")
                .default_width(240.0)
                .show(ctx, |ui| {
                    ui.heading("Zone");
                    ui.separator();

                    let world = self.map.controller().world();
                    match self.selected_zone {
                        Some(zone_id) => {
                            ui.label(world.zone_name(zone_id));
                            ui.label(format!("id {}", zone_id));
                            if let Some(bounds) = world.zone_index().get(zone_id) {
                                ui.label(format!("{} rooms", bounds.room_count));
                            }
                            if let Some(climate) =
                                world.zone(zone_id).and_then(|z| z.climate.as_deref())
                            {
                                ui.label(format!("climate: {}", climate));
                            }
                        }
                        None => {
                            ui.label("Click a zone on the map");
                        }
                    }

                    ui.add_space(12.0);
                    let reload = ui.add_enabled(
                        self.pending_load.is_none(),
                        egui::Button::new("Reload world"),
                    );
                    if reload.clicked() {
                        self.start_load(ctx);
                    }

                    if let Some(error) = &self.error {
                        ui.add_space(8.0);
                        ui.colored_label(egui::Color32::from_rgb(220, 120, 100), error);
                    }
                });
        }
    }

    impl eframe::App for ViewerApp {
        fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
            self.check_pending();
            self.render_side_panel(ctx);

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

    pub fn main() -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();

        let args = Args::parse();

        let mut config = match &args.config {
            Some(path) => MapConfig::from_path(path)?,
            None => MapConfig::default(),
        };
        if let Some(api) = args.api {
            config.api_base_url = api;
        }

        let source = match args.file {
            Some(path) => Source::File(FileSource::new(path)),
            None => Source::Api(ApiClient::new(&config.api_base_url)),
        };

        let runtime = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()?,
        );

        tracing::info!("Starting world map viewer");

        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_title("World Map")
                .with_inner_size([1400.0, 900.0])
                .with_min_inner_size([640.0, 480.0]),
            ..Default::default()
        };

        eframe::run_native(
            "World Map",
            native_options,
            Box::new(move |cc| {
                cc.egui_ctx.set_theme(egui::Theme::Dark);
                let mut app = ViewerApp::new(config, source, runtime);
                app.start_load(&cc.egui_ctx);
                Ok(Box::new(app) as Box<dyn eframe::App>)
            }),
        )?;

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
