//! Viewport auto-fit logic
//!
//! Computes the zoom and center that show the whole world, plus the lower
//! zoom bound derived from it. User pan/zoom turns auto-fit off; a refit
//! (R / Home) turns it back on.

use super::camera::{Viewport, ABSOLUTE_MIN_ZOOM};
use egui::{Pos2, Rect, Vec2};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Margin around content (10% on each side)
const FIT_MARGIN: f32 = 0.9;

/// Fitting never magnifies past 1:1
const MAX_FIT_ZOOM: f32 = 1.0;

/// Default lower zoom bound when the world fits comfortably
const DEFAULT_MIN_ZOOM: f32 = 0.1;

// =============================================================================
// FIT MATH
// =============================================================================

/// Zoom that fits `content` into `container` with margin, capped at 1:1
pub fn fit_zoom(content: Rect, container: Vec2) -> f32 {
    if container.x <= 0.0 || container.y <= 0.0 {
        return MAX_FIT_ZOOM;
    }
    // Content is padded upstream; guard anyway so a zero extent never divides
    let width = content.width().max(1.0);
    let height = content.height().max(1.0);
    let zoom_x = container.x * FIT_MARGIN / width;
    let zoom_y = container.y * FIT_MARGIN / height;
    zoom_x.min(zoom_y).clamp(ABSOLUTE_MIN_ZOOM, MAX_FIT_ZOOM)
}

/// Lower zoom bound: low enough to zoom out to half the fit level
pub fn min_zoom_for(fit: f32) -> f32 {
    (fit * 0.5).min(DEFAULT_MIN_ZOOM).max(ABSOLUTE_MIN_ZOOM)
}

// =============================================================================
// VIEWPORT FIT
// =============================================================================

/// Auto-fit state for the viewport
#[derive(Debug, Clone)]
pub struct ViewportFit {
    /// Whether auto-fit is active (user hasn't panned or zoomed)
    pub auto_enabled: bool,

    /// Bounding box of all content in world coordinates
    pub content_bounds: Option<Rect>,

    /// Zoom that showed the whole world when the bounds were last set
    pub optimal_zoom: f32,
}

impl Default for ViewportFit {
    fn default() -> Self {
        Self {
            auto_enabled: true,
            content_bounds: None,
            optimal_zoom: MAX_FIT_ZOOM,
        }
    }
}

impl ViewportFit {
    /// New content extent; re-enables auto-fit
    pub fn set_content(&mut self, bounds: Option<Rect>) {
        self.content_bounds = bounds;
        self.auto_enabled = true;
    }

    /// User took over the camera
    pub fn disable_auto(&mut self) {
        self.auto_enabled = false;
    }

    pub fn optimal_center(&self) -> Option<Pos2> {
        self.content_bounds.map(|b| b.center())
    }

    /// Fit `viewport` to the content and fix its lower zoom bound.
    ///
    /// Returns false when there is no content to fit.
    pub fn apply(&mut self, viewport: &mut Viewport, container: Vec2) -> bool {
        let Some(bounds) = self.content_bounds else {
            return false;
        };
        let zoom = fit_zoom(bounds, container);
        self.optimal_zoom = zoom;
        viewport.set_min_zoom(min_zoom_for(zoom));
        viewport.look_at(bounds.center(), zoom, container);
        self.auto_enabled = true;
        true
    }

    /// Re-fit after a container resize, only while auto-fit is active
    pub fn on_resize(&mut self, viewport: &mut Viewport, container: Vec2) -> bool {
        self.auto_enabled && self.apply(viewport, container)
    }
}
