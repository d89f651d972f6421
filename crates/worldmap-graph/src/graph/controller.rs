//! Viewport controller - owns every piece of mutable map state
//!
//! Viewport, view-mode machine, node cache, drag anchor, interaction
//! timestamp and hover all live on one object with an explicit lifecycle.
//! `dispose` clears it in one call; handlers are no-ops afterwards.
//!
//! Time is passed in (`now`, seconds, e.g. `egui::InputState::time`), so
//! debounce and cool-down logic is testable without a clock.
//! Pointer positions are container-local.

use super::camera::Viewport;
use super::lod::{ViewMode, ViewModeMachine};
use super::nodes::{NodeGenerator, RenderNode};
use super::render::FrameStats;
use super::types::ZoneId;
use super::viewport_fit::ViewportFit;
use super::world::WorldModel;
use crate::config::MapConfig;
use egui::{Pos2, Vec2};
use std::sync::Arc;

/// Pointer travel (px) beyond which a press becomes a drag
const DRAG_THRESHOLD_PX: f32 = 3.0;

/// Notifications for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    ZoneClicked(ZoneId),
    LoadingChanged(bool),
    ViewModeChanged(ViewMode),
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    start: Pos2,
    offset_at_down: Vec2,
    moved: bool,
}

pub struct ViewportController {
    config: MapConfig,
    world: WorldModel,
    container: Vec2,
    viewport: Viewport,
    fit: ViewportFit,
    lod: ViewModeMachine,
    generator: NodeGenerator,
    overview: Option<Arc<[RenderNode]>>,
    drag: Option<DragState>,
    last_interaction: Option<f64>,
    hovered_zone: Option<ZoneId>,
    needs_repaint: bool,
    last_suppressed: usize,
    disposed: bool,
}

impl ViewportController {
    pub fn new(config: MapConfig) -> Self {
        let world = WorldModel::empty(&config);
        Self {
            viewport: Viewport::new(config.max_zoom),
            world,
            config,
            container: Vec2::ZERO,
            fit: ViewportFit::default(),
            lod: ViewModeMachine::default(),
            generator: NodeGenerator::new(),
            overview: None,
            drag: None,
            last_interaction: None,
            hovered_zone: None,
            needs_repaint: true,
            last_suppressed: 0,
            disposed: false,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldModel {
        &self.world
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn container(&self) -> Vec2 {
        self.container
    }

    pub fn mode(&self) -> ViewMode {
        self.lod.current()
    }

    pub fn hovered_zone(&self) -> Option<ZoneId> {
        self.hovered_zone
    }

    pub fn generator(&self) -> &NodeGenerator {
        &self.generator
    }

    /// Overview nodes from the last tick (world-map mode only)
    pub fn overview_nodes(&self) -> Option<Arc<[RenderNode]>> {
        self.overview.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Pan/zoom happened within the cool-down window
    pub fn is_interacting(&self, now: f64) -> bool {
        self.last_interaction
            .is_some_and(|t| now - t < self.config.interaction_cooldown_secs)
    }

    /// True while timed work is outstanding (cool-down, pending mode commit)
    pub fn needs_tick(&self, now: f64) -> bool {
        !self.disposed && (self.is_interacting(now) || self.lod.has_pending())
    }

    /// Consume the repaint flag
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.needs_repaint)
    }

    // =========================================================================
    // DATA
    // =========================================================================

    /// Swap in a rebuilt world. Clears the cache, refits and settles the
    /// view mode; returns the mode change if there was one.
    pub fn set_world(&mut self, world: WorldModel) -> Option<MapEvent> {
        if self.disposed || world.revision == self.world.revision {
            return None;
        }
        self.world = world;
        self.generator.invalidate();
        self.overview = None;
        self.hovered_zone = None;
        self.drag = None;
        self.fit.set_content(self.world.fit_extent());
        self.fit.apply(&mut self.viewport, self.container);

        let before = self.lod.current();
        self.lod.reset(self.viewport.zoom());
        self.needs_repaint = true;
        (self.lod.current() != before).then(|| MapEvent::ViewModeChanged(self.lod.current()))
    }

    // =========================================================================
    // VIEWPORT
    // =========================================================================

    /// Container size changed; refits while auto-fit is on
    pub fn resize(&mut self, size: Vec2) {
        if self.disposed || size == self.container {
            return;
        }
        self.container = size;
        self.fit.on_resize(&mut self.viewport, size);
        self.needs_repaint = true;
    }

    /// Show the whole world (R / Home)
    pub fn fit_to_world(&mut self) {
        if self.disposed {
            return;
        }
        if self.fit.apply(&mut self.viewport, self.container) {
            self.needs_repaint = true;
        }
    }

    pub fn pointer_down(&mut self, pos: Pos2) {
        if self.disposed {
            return;
        }
        self.drag = Some(DragState {
            start: pos,
            offset_at_down: self.viewport.offset,
            moved: false,
        });
    }

    /// Drag-to-pan while a button is held; hover tracking otherwise
    pub fn pointer_move(&mut self, pos: Pos2, now: f64) {
        if self.disposed {
            return;
        }
        if let Some(drag) = self.drag.as_mut() {
            let delta = pos - drag.start;
            if drag.moved || delta.length() > DRAG_THRESHOLD_PX {
                drag.moved = true;
                self.viewport.offset = drag.offset_at_down + delta;
                self.fit.disable_auto();
                self.last_interaction = Some(now);
                self.needs_repaint = true;
            }
        }
        self.update_hover(pos);
    }

    /// Ends a press; true if it was a drag rather than a click
    pub fn pointer_up(&mut self) -> bool {
        self.drag.take().is_some_and(|d| d.moved)
    }

    pub fn pointer_leave(&mut self) {
        if self.hovered_zone.take().is_some() {
            self.needs_repaint = true;
        }
    }

    /// Zoom by `notches` wheel steps around `pos`
    pub fn wheel(&mut self, pos: Pos2, notches: f32, now: f64) {
        if self.disposed || notches == 0.0 {
            return;
        }
        let factor = self.config.zoom_step.powf(notches);
        if self.viewport.zoom_at(pos, factor) {
            self.fit.disable_auto();
            self.last_interaction = Some(now);
            self.needs_repaint = true;
        }
    }

    /// Resolve a click to the owning zone of the room (or overview zone)
    /// under the pointer
    pub fn click(&mut self, pos: Pos2) -> Option<MapEvent> {
        if self.disposed {
            return None;
        }
        let world_pos = self.viewport.screen_to_world(pos);

        if self.lod.current() == ViewMode::WorldMap {
            let hit = self.overview.as_deref().and_then(|nodes| {
                nodes.iter().find_map(|n| match n {
                    RenderNode::Zone { zone_id, rect, .. } if rect.contains(world_pos) => {
                        Some(*zone_id)
                    }
                    _ => None,
                })
            });
            if let Some(zone_id) = hit {
                return Some(MapEvent::ZoneClicked(zone_id));
            }
        }

        let index = self.world.room_at(world_pos)?;
        let room = self.world.room(index)?;
        tracing::debug!("click {} -> zone {}", room.key, room.key.zone_id);
        Some(MapEvent::ZoneClicked(room.key.zone_id))
    }

    fn update_hover(&mut self, pos: Pos2) {
        let world_pos = self.viewport.screen_to_world(pos);
        let hovered = self.world.zone_index().hit_test(world_pos);
        if hovered != self.hovered_zone {
            self.hovered_zone = hovered;
            self.needs_repaint = true;
        }
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Per-frame housekeeping: view-mode evaluation and overview nodes.
    pub fn tick(&mut self, now: f64) -> Option<MapEvent> {
        if self.disposed {
            return None;
        }
        let interacting = self.is_interacting(now);
        let zoom = self.viewport.zoom();
        let committed = self.lod.observe(zoom, now, interacting);

        if self.lod.current() == ViewMode::WorldMap && !self.world.is_empty() {
            self.overview = Some(self.generator.generate(
                self.world.zone_data(),
                zoom,
                now,
                interacting,
            ));
        } else {
            self.overview = None;
        }

        committed.map(|mode| {
            self.needs_repaint = true;
            MapEvent::ViewModeChanged(mode)
        })
    }

    /// Feed back what the last frame drew
    pub fn record_frame(&mut self, stats: FrameStats) {
        if stats.suppressed_duplicates != self.last_suppressed {
            tracing::debug!(
                "{} co-located rooms hidden by grid-cell dedup",
                stats.suppressed_duplicates
            );
            self.last_suppressed = stats.suppressed_duplicates;
        }
    }

    /// Tear down: drop cached work and pending timers; later calls are no-ops
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.drag = None;
        self.last_interaction = None;
        self.hovered_zone = None;
        self.overview = None;
        self.generator.invalidate();
        self.lod = ViewModeMachine::new(self.lod.current());
        self.needs_repaint = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{Room, WorldData, Zone};

    fn controller_with_world() -> ViewportController {
        let config = MapConfig::default();
        let mut controller = ViewportController::new(config.clone());
        controller.resize(Vec2::new(800.0, 600.0));
        let world = WorldModel::build(
            WorldData::new(
                vec![Zone::new(7, "Haon-Dor")],
                vec![
                    Room::new(7, 1).at(0, 0, 0),
                    Room::new(7, 2).at(1, 0, 0),
                    Room::new(7, 3).at(0, 1, 0),
                    Room::new(7, 4).at(1, 1, 0),
                ],
            ),
            &config,
        );
        controller.set_world(world);
        controller
    }

    #[test]
    fn test_set_world_fits_and_settles_mode() {
        let controller = controller_with_world();
        assert_eq!(controller.viewport().zoom(), 1.0);
        let center = controller.viewport().world_to_screen(Pos2::new(20.0, 20.0));
        assert_eq!(center, Pos2::new(400.0, 300.0));
        assert_eq!(controller.mode(), ViewMode::ZoneOverview);
    }

    #[test]
    fn test_drag_pans_from_anchor() {
        let mut controller = controller_with_world();
        let before = controller.viewport().offset;
        controller.pointer_down(Pos2::new(100.0, 100.0));
        controller.pointer_move(Pos2::new(110.0, 100.0), 1.0);
        controller.pointer_move(Pos2::new(150.0, 130.0), 1.01);
        assert!(controller.pointer_up());
        assert_eq!(controller.viewport().offset, before + Vec2::new(50.0, 30.0));
        assert!(controller.is_interacting(1.05));
        assert!(!controller.is_interacting(2.0));
    }

    #[test]
    fn test_small_press_is_a_click() {
        let mut controller = controller_with_world();
        let before = controller.viewport().offset;
        controller.pointer_down(Pos2::new(100.0, 100.0));
        controller.pointer_move(Pos2::new(101.0, 101.0), 1.0);
        assert!(!controller.pointer_up());
        assert_eq!(controller.viewport().offset, before);
    }

    #[test]
    fn test_click_reports_owning_zone() {
        let mut controller = controller_with_world();
        let on_room = controller.viewport().world_to_screen(Pos2::new(40.0, 40.0));
        assert_eq!(controller.click(on_room), Some(MapEvent::ZoneClicked(7)));
        assert_eq!(controller.click(Pos2::new(5.0, 5.0)), None);
    }

    #[test]
    fn test_hover_tracks_zone_box() {
        let mut controller = controller_with_world();
        controller.take_repaint();
        controller.pointer_move(Pos2::new(400.0, 300.0), 0.0);
        assert_eq!(controller.hovered_zone(), Some(7));
        assert!(controller.take_repaint());
        controller.pointer_move(Pos2::new(5.0, 5.0), 0.1);
        assert_eq!(controller.hovered_zone(), None);
    }

    #[test]
    fn test_wheel_zoom_and_mode_commit() {
        let mut controller = controller_with_world();
        let pointer = Pos2::new(400.0, 300.0);
        // 1.0 * 1.1^2 = 1.21 → room detail once stable
        controller.wheel(pointer, 2.0, 10.0);
        assert!((controller.viewport().zoom() - 1.21).abs() < 1e-4);

        assert_eq!(controller.tick(10.0), None);
        assert!(controller.needs_tick(10.05));
        assert_eq!(
            controller.tick(10.5),
            Some(MapEvent::ViewModeChanged(ViewMode::RoomDetail))
        );
        assert_eq!(controller.mode(), ViewMode::RoomDetail);
    }

    #[test]
    fn test_world_map_tick_produces_overview() {
        let mut controller = controller_with_world();
        controller.viewport.set_min_zoom(0.01);
        controller.wheel(Pos2::new(400.0, 300.0), -40.0, 0.0);
        assert!(controller.viewport().zoom() < 0.05);
        controller.tick(1.0);
        assert_eq!(
            controller.tick(1.2),
            Some(MapEvent::ViewModeChanged(ViewMode::WorldMap))
        );
        controller.tick(1.3);
        let nodes = controller.overview_nodes().expect("overview in world-map mode");
        assert!(nodes.iter().any(|n| n.zone_id() == 7));

        let zone_center = controller.viewport().world_to_screen(Pos2::new(20.0, 20.0));
        assert_eq!(controller.click(zone_center), Some(MapEvent::ZoneClicked(7)));
    }

    #[test]
    fn test_resize_refits_until_user_moves() {
        let mut controller = controller_with_world();
        controller.resize(Vec2::new(1000.0, 1000.0));
        let center = controller.viewport().world_to_screen(Pos2::new(20.0, 20.0));
        assert_eq!(center, Pos2::new(500.0, 500.0));

        controller.wheel(Pos2::ZERO, -1.0, 0.0);
        let before = controller.viewport().clone();
        controller.resize(Vec2::new(400.0, 400.0));
        assert_eq!(controller.viewport(), &before);

        controller.fit_to_world();
        let center = controller.viewport().world_to_screen(Pos2::new(20.0, 20.0));
        assert_eq!(center, Pos2::new(200.0, 200.0));
    }

    #[test]
    fn test_new_world_invalidates_cache() {
        let mut controller = controller_with_world();
        controller.viewport.set_min_zoom(0.01);
        controller.wheel(Pos2::ZERO, -40.0, 0.0);
        controller.tick(1.0);
        controller.tick(1.2);
        controller.tick(1.3);
        assert!(!controller.generator().cache().is_empty());

        let world = WorldModel::build(
            WorldData::new(vec![], vec![Room::new(1, 1)]),
            controller.config(),
        );
        controller.set_world(world);
        assert!(controller.generator().cache().is_empty());
        assert!(controller.overview_nodes().is_none());
    }

    #[test]
    fn test_dispose_stops_everything() {
        let mut controller = controller_with_world();
        controller.wheel(Pos2::ZERO, 1.0, 0.0);
        controller.dispose();
        assert!(controller.is_disposed());
        assert!(!controller.needs_tick(0.01));

        let offset = controller.viewport().offset;
        controller.pointer_down(Pos2::ZERO);
        controller.pointer_move(Pos2::new(100.0, 100.0), 1.0);
        controller.wheel(Pos2::ZERO, 3.0, 1.0);
        assert_eq!(controller.viewport().offset, offset);
        assert_eq!(controller.tick(5.0), None);
        assert_eq!(controller.click(Pos2::new(400.0, 300.0)), None);
    }
}
