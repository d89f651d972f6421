//! World map visualization module
//!
//! Renders tens of thousands of rooms grouped into zones on a pannable,
//! zoomable 2-D map.
//!
//! # Architecture
//!
//! ```text
//! WorldData (validated rooms + zones)
//!        │
//!        ▼
//! WorldModel::build ── AutoLayout (fills missing coordinates)
//!        │          └─ ZoneIndex / RoomIndex (bounds, hit-testing)
//!        ▼
//! ViewportController
//!        ├──► Viewport (pan/zoom transform)
//!        ├──► ViewModeMachine (zoom → world / zones / rooms)
//!        └──► NodeGenerator (cached overview nodes)
//!        │
//!        ▼
//! FrameRenderer (draws to egui::Painter)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut map = WorldMapWidget::new(MapConfig::default());
//! map.set_world(world_data);
//! for event in map.ui(ui) {
//!     if let MapEvent::ZoneClicked(zone_id) = event { /* open zone */ }
//! }
//! ```

pub mod camera;
pub mod colors;
pub mod controller;
pub mod layout;
pub mod lod;
pub mod nodes;
pub mod render;
pub mod spatial;
pub mod types;
pub mod viewport_fit;
pub mod world;

pub use camera::{CellSize, Viewport};
pub use controller::{MapEvent, ViewportController};
pub use layout::{auto_layout, LayoutGroup, LayoutResult, Placement};
pub use lod::ViewMode;
pub use nodes::{NodeGenerator, RenderNode};
pub use render::{plan_frame, FramePlan, FrameRenderer, FrameStats};
pub use types::*;
pub use world::WorldModel;

use crate::config::MapConfig;
use egui::{Color32, Pos2, Rect, Sense, Vec2};

/// Wheel scroll (points) per zoom notch
const SCROLL_PER_NOTCH: f32 = 50.0;

/// Repaint cadence while timed work is pending
const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_millis(50);

/// World map widget for egui
pub struct WorldMapWidget {
    controller: ViewportController,
    renderer: FrameRenderer,
    loading: bool,
    last_stats: FrameStats,
}

impl WorldMapWidget {
    pub fn new(config: MapConfig) -> Self {
        let renderer = FrameRenderer::new(config.layers, config.cull_buffer_px);
        Self {
            controller: ViewportController::new(config),
            renderer,
            loading: false,
            last_stats: FrameStats::default(),
        }
    }

    /// Replace the world; layout and indexes are rebuilt here, once.
    /// Returns a mode change if the new fit lands in a different mode.
    pub fn set_world(&mut self, data: WorldData) -> Option<MapEvent> {
        let model = WorldModel::build(data, self.controller.config());
        self.controller.set_world(model)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    pub fn dispose(&mut self) {
        self.controller.dispose();
    }

    /// Render the map and handle input. Returns host notifications.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Vec<MapEvent> {
        let mut events = Vec::new();
        if self.controller.is_disposed() {
            return events;
        }

        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
        let screen_rect = response.rect;
        let origin = screen_rect.min.to_vec2();
        let local = |p: Pos2| p - origin;
        let now = ui.input(|i| i.time);

        self.controller.resize(screen_rect.size());

        // Pan
        if response.drag_started() {
            if let Some(press) = ui.input(|i| i.pointer.press_origin()) {
                self.controller.pointer_down(local(press));
            }
        }
        if let Some(pos) = response.hover_pos().or(response.interact_pointer_pos()) {
            self.controller.pointer_move(local(pos), now);
        } else {
            self.controller.pointer_leave();
        }
        if response.drag_stopped() {
            self.controller.pointer_up();
        }

        // Zoom at pointer (wheel and pinch)
        if let Some(pos) = response.hover_pos() {
            let (scroll, pinch) = ui.input(|i| (i.raw_scroll_delta.y, i.zoom_delta()));
            let mut notches = scroll / SCROLL_PER_NOTCH;
            if pinch != 1.0 {
                notches += pinch.ln() / self.controller.config().zoom_step.ln();
            }
            self.controller.wheel(local(pos), notches, now);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.extend(self.controller.click(local(pos)));
            }
        }

        if response.hovered()
            && ui.input(|i| i.key_pressed(egui::Key::R) || i.key_pressed(egui::Key::Home))
        {
            self.controller.fit_to_world();
        }

        events.extend(self.controller.tick(now));

        if self.loading {
            self.render_loading_state(&painter, screen_rect);
        } else if self.controller.world().is_empty() {
            self.render_empty_state(&painter, screen_rect);
        } else {
            let overview = self.controller.overview_nodes();
            self.last_stats = self.renderer.render(
                &painter,
                screen_rect,
                &render::FrameInput {
                    world: self.controller.world(),
                    viewport: self.controller.viewport(),
                    mode: self.controller.mode(),
                    interacting: self.controller.is_interacting(now),
                    hovered_zone: self.controller.hovered_zone(),
                    overview: overview.as_deref(),
                },
            );
            self.controller.record_frame(self.last_stats);
            self.render_chrome(&painter, screen_rect);
        }

        if self.controller.take_repaint() {
            ui.ctx().request_repaint();
        } else if self.controller.needs_tick(now) {
            ui.ctx().request_repaint_after(TICK_INTERVAL);
        }

        events
    }

    fn render_loading_state(&self, painter: &egui::Painter, screen_rect: Rect) {
        painter.rect_filled(screen_rect, 0.0, colors::BACKGROUND);
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "Loading world…",
            egui::FontId::proportional(14.0),
            Color32::from_rgb(150, 150, 150),
        );
    }

    /// Render empty state when no world is loaded
    fn render_empty_state(&self, painter: &egui::Painter, screen_rect: Rect) {
        painter.rect_filled(screen_rect, 0.0, colors::BACKGROUND);
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "No rooms to display",
            egui::FontId::proportional(14.0),
            Color32::from_rgb(150, 150, 150),
        );
    }

    /// Render UI chrome (stats, keyboard hints)
    fn render_chrome(&self, painter: &egui::Painter, screen_rect: Rect) {
        let world = self.controller.world().stats();
        let frame = self.last_stats;

        let stats_text = format!("{} rooms | {} zones", world.rooms, world.zones);
        painter.text(
            screen_rect.left_top() + Vec2::new(10.0, 10.0),
            egui::Align2::LEFT_TOP,
            stats_text,
            egui::FontId::proportional(12.0),
            Color32::from_rgb(150, 150, 150),
        );

        let mut detail = format!("{} drawn", frame.glyphs);
        if frame.suppressed_duplicates > 0 {
            detail.push_str(&format!(" | {} hidden (same cell)", frame.suppressed_duplicates));
        }
        if world.conflicts > 0 {
            detail.push_str(&format!(" | {} layout conflicts", world.conflicts));
        }
        painter.text(
            screen_rect.left_top() + Vec2::new(10.0, 28.0),
            egui::Align2::LEFT_TOP,
            detail,
            egui::FontId::proportional(10.0),
            Color32::from_rgb(120, 120, 120),
        );

        let zoom_text = format!(
            "Zoom: {:.0}% | {}",
            self.controller.viewport().zoom() * 100.0,
            self.controller.mode().label()
        );
        painter.text(
            screen_rect.left_bottom() + Vec2::new(10.0, -30.0),
            egui::Align2::LEFT_BOTTOM,
            zoom_text,
            egui::FontId::proportional(11.0),
            Color32::from_rgb(120, 120, 120),
        );

        let hints = "Drag: Pan | Scroll: Zoom | Click: Open zone | R: Fit";
        painter.text(
            screen_rect.left_bottom() + Vec2::new(10.0, -10.0),
            egui::Align2::LEFT_BOTTOM,
            hints,
            egui::FontId::proportional(10.0),
            Color32::from_rgb(100, 100, 100),
        );
    }
}
