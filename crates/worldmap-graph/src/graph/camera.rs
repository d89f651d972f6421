//! Viewport - pan/zoom transform between world and screen space
//!
//! Three coordinate spaces are in play:
//! - **grid**: integer room layout cells (`GridPos`)
//! - **world**: pixels before zoom (`grid * cell size`)
//! - **screen**: container-local pixels (`world * zoom + offset`)
//!
//! The viewport is mutated only by pan/zoom handlers. It never touches
//! room coordinates.

use super::types::GridPos;
use egui::{Pos2, Rect, Vec2};

/// Lowest zoom ever allowed, whatever the data extent.
pub const ABSOLUTE_MIN_ZOOM: f32 = 1e-4;

/// World pixels per grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub width: f32,
    pub height: f32,
}

impl CellSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Room center in world space
    pub fn to_world(&self, grid: GridPos) -> Pos2 {
        Pos2::new(grid.x as f32 * self.width, grid.y as f32 * self.height)
    }

    /// Fractional grid coordinate under a world point
    pub fn to_grid(&self, world: Pos2) -> Vec2 {
        Vec2::new(world.x / self.width, world.y / self.height)
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Pan/zoom state: `screen = world * zoom + offset`
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Screen-space translation
    pub offset: Vec2,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 2.0,
        }
    }
}

impl Viewport {
    pub fn new(max_zoom: f32) -> Self {
        Self {
            max_zoom,
            ..Default::default()
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    /// Set the lower zoom bound, re-clamping the current zoom
    pub fn set_min_zoom(&mut self, min_zoom: f32) {
        self.min_zoom = min_zoom.clamp(ABSOLUTE_MIN_ZOOM, self.max_zoom);
        self.zoom = self.clamp_zoom(self.zoom);
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    // =========================================================================
    // COORDINATE TRANSFORMS
    // =========================================================================

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        Pos2::new(
            world.x * self.zoom + self.offset.x,
            world.y * self.zoom + self.offset.y,
        )
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.offset.x) / self.zoom,
            (screen.y - self.offset.y) / self.zoom,
        )
    }

    pub fn world_rect_to_screen(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.world_to_screen(world.min), self.world_to_screen(world.max))
    }

    /// World-space rectangle covered by a container of `size`
    pub fn visible_world_rect(&self, size: Vec2) -> Rect {
        Rect::from_min_max(
            self.screen_to_world(Pos2::ZERO),
            self.screen_to_world(size.to_pos2()),
        )
    }

    // =========================================================================
    // INTERACTION
    // =========================================================================

    /// Translate by a screen-space delta
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply zoom by `factor`, keeping the world point under `pointer` fixed.
    ///
    /// Returns true if the zoom actually changed (false when already clamped).
    pub fn zoom_at(&mut self, pointer: Pos2, factor: f32) -> bool {
        let before = self.zoom;
        let after = self.clamp_zoom(before * factor);
        if after == before {
            return false;
        }
        let anchor = self.screen_to_world(pointer);
        self.zoom = after;
        self.offset = pointer.to_vec2() - anchor.to_vec2() * after;
        true
    }

    /// Set zoom and offset so `world_center` lands at the container center
    pub fn look_at(&mut self, world_center: Pos2, zoom: f32, container: Vec2) {
        self.zoom = self.clamp_zoom(zoom);
        self.offset = container / 2.0 - world_center.to_vec2() * self.zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_identity() {
        let vp = Viewport::default();
        let p = Pos2::new(12.0, -7.0);
        assert_eq!(vp.world_to_screen(p), p);
        assert_eq!(vp.screen_to_world(p), p);
    }

    #[test]
    fn test_grid_to_screen() {
        let cell = CellSize::new(40.0, 30.0);
        let mut vp = Viewport::new(2.0);
        vp.look_at(Pos2::ZERO, 0.5, Vec2::ZERO);
        vp.offset = Vec2::new(10.0, 20.0);

        let world = cell.to_world(GridPos::new(3, 2, 0));
        assert_eq!(world, Pos2::new(120.0, 60.0));
        assert_eq!(vp.world_to_screen(world), Pos2::new(70.0, 50.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = Viewport::new(2.0);
        vp.set_min_zoom(0.5);
        for _ in 0..50 {
            vp.zoom_at(Pos2::new(100.0, 100.0), 1.5);
        }
        assert_eq!(vp.zoom(), 2.0);
        assert!(!vp.zoom_at(Pos2::new(100.0, 100.0), 1.5));

        for _ in 0..50 {
            vp.zoom_at(Pos2::new(100.0, 100.0), 0.5);
        }
        assert_eq!(vp.zoom(), 0.5);
    }

    #[test]
    fn test_raising_min_zoom_reclamps() {
        let mut vp = Viewport::new(2.0);
        vp.set_min_zoom(0.01);
        vp.look_at(Pos2::ZERO, 0.02, Vec2::ZERO);
        vp.set_min_zoom(0.1);
        assert_eq!(vp.zoom(), 0.1);
    }

    #[test]
    fn test_pan_moves_offset_only() {
        let mut vp = Viewport::default();
        vp.pan_by(Vec2::new(5.0, -3.0));
        assert_eq!(vp.offset, Vec2::new(5.0, -3.0));
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_visible_world_rect() {
        let mut vp = Viewport::new(2.0);
        vp.look_at(Pos2::new(100.0, 100.0), 2.0, Vec2::new(800.0, 600.0));
        let rect = vp.visible_world_rect(Vec2::new(800.0, 600.0));
        assert!((rect.width() - 400.0).abs() < 1e-3);
        assert!((rect.height() - 300.0).abs() < 1e-3);
        assert!((rect.center().x - 100.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            ox in -5000.0f32..5000.0,
            oy in -5000.0f32..5000.0,
            zoom in 0.01f32..2.0,
            wx in -100_000.0f32..100_000.0,
            wy in -100_000.0f32..100_000.0,
        ) {
            let mut vp = Viewport::new(2.0);
            vp.set_min_zoom(0.01);
            vp.look_at(Pos2::ZERO, zoom, Vec2::ZERO);
            vp.offset = Vec2::new(ox, oy);

            let world = Pos2::new(wx, wy);
            let back = vp.screen_to_world(vp.world_to_screen(world));
            // f32 error scales with the screen magnitude divided back by zoom
            let tol = 1e-5 * (1.0 + wx.abs().max(wy.abs()) + ox.abs().max(oy.abs()) / zoom);
            prop_assert!((back.x - wx).abs() <= tol);
            prop_assert!((back.y - wy).abs() <= tol);
        }

        #[test]
        fn prop_zoom_anchor_is_stable(
            ox in -2000.0f32..2000.0,
            oy in -2000.0f32..2000.0,
            zoom in 0.05f32..2.0,
            px in 0.0f32..1600.0,
            py in 0.0f32..1200.0,
            zoom_in in any::<bool>(),
        ) {
            let mut vp = Viewport::new(2.0);
            vp.set_min_zoom(0.05);
            vp.look_at(Pos2::ZERO, zoom, Vec2::ZERO);
            vp.offset = Vec2::new(ox, oy);

            let pointer = Pos2::new(px, py);
            let anchor = vp.screen_to_world(pointer);
            vp.zoom_at(pointer, if zoom_in { 1.1 } else { 1.0 / 1.1 });

            let after = vp.world_to_screen(anchor);
            prop_assert!((after.x - px).abs() <= 1.0);
            prop_assert!((after.y - py).abs() <= 1.0);
        }
    }
}
