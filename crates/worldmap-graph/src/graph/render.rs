//! Frame rendering - culls, dedups and paints rooms and zones with egui::Painter
//!
//! Split in two: [`plan_frame`] decides what is visible (pure, testable),
//! [`FrameRenderer`] paints a plan. Viewport math is container-local; the
//! renderer offsets by the container origin when painting.

use super::camera::Viewport;
use super::colors::{self, apply_opacity, blend, terrain_color, zone_color};
use super::lod::ViewMode;
use super::nodes::RenderNode;
use super::types::{Direction, Sector, ZoneId};
use super::world::WorldModel;
use crate::config::LayerToggles;
use egui::{Align2, Color32, FontId, Pos2, Rect, Shape, Stroke, Vec2};
use std::collections::{HashMap, HashSet};

// =============================================================================
// RENDER CONSTANTS
// =============================================================================

/// Zone labels appear from this zoom
const LABEL_ZOOM: f32 = 0.3;

/// Room glow appears from this zoom
const ROOM_GLOW_ZOOM: f32 = 0.8;

/// Smallest glyph edge on screen
const MIN_GLYPH_PX: f32 = 1.5;

const AURA_RINGS: usize = 4;
const DASH_PX: f32 = 6.0;
const GAP_PX: f32 = 4.0;

// =============================================================================
// FRAME PLAN
// =============================================================================

/// A zone present in the visible room set
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneGroup {
    pub zone_id: ZoneId,
    /// Dominant-sector color, or hash hue
    pub color: Color32,
    /// Visible glyphs belonging to this zone
    pub visible_rooms: usize,
}

/// What a frame will draw
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    /// Room indices to draw, ascending; one per grid cell
    pub glyphs: Vec<usize>,
    /// Zones in order of first visible glyph
    pub zones: Vec<ZoneGroup>,
    /// Rooms hidden because an earlier room holds the same cell
    pub suppressed_duplicates: usize,
    /// Rooms outside the buffered viewport
    pub culled: usize,
}

/// Cull to the buffered viewport, dedup by grid cell and group by zone.
pub fn plan_frame(
    world: &WorldModel,
    viewport: &Viewport,
    container: Vec2,
    cull_buffer_px: f32,
) -> FramePlan {
    if world.is_empty() {
        return FramePlan::default();
    }

    let visible = viewport
        .visible_world_rect(container)
        .expand(cull_buffer_px / viewport.zoom());
    let candidates = world.room_index().query_rect(visible);
    let culled = world.rooms().len() - candidates.len();

    let layout = world.layout();
    let mut seen_cells: HashSet<(i32, i32)> = HashSet::with_capacity(candidates.len());
    let mut glyphs = Vec::with_capacity(candidates.len());
    let mut suppressed_duplicates = 0;
    for index in candidates {
        let Some(placement) = layout.get(index) else {
            continue;
        };
        if seen_cells.insert(placement.pos.planar()) {
            glyphs.push(index);
        } else {
            suppressed_duplicates += 1;
        }
    }

    let mut order: Vec<ZoneId> = Vec::new();
    let mut sectors: HashMap<ZoneId, Vec<Sector>> = HashMap::new();
    for &index in &glyphs {
        let Some(room) = world.room(index) else {
            continue;
        };
        let entry = sectors.entry(room.key.zone_id).or_insert_with(|| {
            order.push(room.key.zone_id);
            Vec::new()
        });
        entry.push(room.sector);
    }
    let zones = order
        .into_iter()
        .map(|zone_id| {
            let zone_sectors = sectors.remove(&zone_id).unwrap_or_default();
            ZoneGroup {
                zone_id,
                color: zone_color(zone_id, colors::dominant_sector(zone_sectors.iter().copied())),
                visible_rooms: zone_sectors.len(),
            }
        })
        .collect();

    FramePlan {
        glyphs,
        zones,
        suppressed_duplicates,
        culled,
    }
}

// =============================================================================
// FRAME RENDERER
// =============================================================================

/// Per-frame inputs
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub world: &'a WorldModel,
    pub viewport: &'a Viewport,
    pub mode: ViewMode,
    /// Pan/zoom within the cool-down window; expensive effects are skipped
    pub interacting: bool,
    pub hovered_zone: Option<ZoneId>,
    /// Cached overview nodes, drawn instead of rooms in world-map mode
    pub overview: Option<&'a [RenderNode]>,
}

/// Counts reported back to the chrome overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub glyphs: usize,
    pub zones: usize,
    pub suppressed_duplicates: usize,
    pub culled: usize,
    /// Zone auras painted this frame
    pub auras: usize,
}

pub struct FrameRenderer {
    pub layers: LayerToggles,
    pub cull_buffer_px: f32,
}

impl FrameRenderer {
    pub fn new(layers: LayerToggles, cull_buffer_px: f32) -> Self {
        Self {
            layers,
            cull_buffer_px,
        }
    }

    /// Zone auras are drawn only when enabled and the view is at rest
    pub fn draws_auras(&self, interacting: bool) -> bool {
        self.layers.zone_glow && !interacting
    }

    /// Paint one frame into `screen_rect`
    pub fn render(
        &self,
        painter: &egui::Painter,
        screen_rect: Rect,
        input: &FrameInput<'_>,
    ) -> FrameStats {
        painter.rect_filled(screen_rect, 0.0, colors::BACKGROUND);

        let origin = screen_rect.min.to_vec2();
        let to_screen = |world: Pos2| input.viewport.world_to_screen(world) + origin;

        let stats = match (input.mode, input.overview) {
            (ViewMode::WorldMap, Some(nodes)) => {
                self.render_overview(painter, input, nodes, &to_screen)
            }
            _ => {
                let plan = plan_frame(
                    input.world,
                    input.viewport,
                    screen_rect.size(),
                    self.cull_buffer_px,
                );
                let auras = self.render_plan(painter, input, &plan, &to_screen);
                FrameStats {
                    glyphs: plan.glyphs.len(),
                    zones: plan.zones.len(),
                    suppressed_duplicates: plan.suppressed_duplicates,
                    culled: plan.culled,
                    auras,
                }
            }
        };

        if let Some(zone_id) = input.hovered_zone {
            self.render_tooltip(painter, screen_rect, input.world, zone_id);
        }

        stats
    }

    /// World-map mode: packed zone rectangles and sampled glyphs
    fn render_overview(
        &self,
        painter: &egui::Painter,
        input: &FrameInput<'_>,
        nodes: &[RenderNode],
        to_screen: &impl Fn(Pos2) -> Pos2,
    ) -> FrameStats {
        let zoom = input.viewport.zoom();
        let clip = painter.clip_rect();
        let mut stats = FrameStats::default();

        for node in nodes {
            match node {
                RenderNode::Zone {
                    zone_id,
                    rect,
                    label,
                    room_count,
                } => {
                    let screen = Rect::from_min_max(to_screen(rect.min), to_screen(rect.max));
                    if !clip.intersects(screen) {
                        stats.culled += room_count;
                        continue;
                    }
                    stats.zones += 1;
                    let color = input.world.zone_color(*zone_id);
                    painter.rect_filled(screen, 3.0, apply_opacity(color, 0.35));
                    let hovered = input.hovered_zone == Some(*zone_id);
                    let stroke = if hovered {
                        Stroke::new(2.0, colors::HOVER_OUTLINE)
                    } else {
                        Stroke::new(1.0, color)
                    };
                    painter.rect_stroke(screen, 3.0, stroke);

                    if self.layers.zone_labels && screen.width() > 60.0 && screen.height() > 18.0 {
                        painter.text(
                            screen.center(),
                            Align2::CENTER_CENTER,
                            format!("{label} ({room_count})"),
                            FontId::proportional(11.0),
                            colors::LABEL_TEXT,
                        );
                    }
                }
                RenderNode::Room { zone_id, pos, .. } => {
                    let screen = to_screen(*pos);
                    if !clip.contains(screen) {
                        continue;
                    }
                    stats.glyphs += 1;
                    let color = input.world.zone_color(*zone_id);
                    let radius = (2.5 * zoom.sqrt()).max(1.0);
                    painter.circle_filled(screen, radius, blend(color, Color32::WHITE, 0.3));
                }
            }
        }
        stats
    }

    /// Zone and room detail from a frame plan. Returns the auras drawn.
    fn render_plan(
        &self,
        painter: &egui::Painter,
        input: &FrameInput<'_>,
        plan: &FramePlan,
        to_screen: &impl Fn(Pos2) -> Pos2,
    ) -> usize {
        let world = input.world;
        let zoom = input.viewport.zoom();
        let mut auras = 0;

        // Auras, cheapest to drop while the user is moving
        if self.draws_auras(input.interacting) {
            for group in &plan.zones {
                let Some(bounds) = world.zone_index().get(group.zone_id) else {
                    continue;
                };
                let screen = Rect::from_min_max(
                    to_screen(bounds.rect().min),
                    to_screen(bounds.rect().max),
                );
                let radius = screen.size().max_elem() * 0.6 + 12.0;
                for ring in 0..AURA_RINGS {
                    let t = 1.0 - ring as f32 / AURA_RINGS as f32;
                    painter.circle_filled(
                        screen.center(),
                        radius * t,
                        apply_opacity(group.color, 0.05),
                    );
                }
                auras += 1;
            }
        }

        for group in &plan.zones {
            let Some(bounds) = world.zone_index().get(group.zone_id) else {
                continue;
            };
            let screen = Rect::from_min_max(
                to_screen(bounds.rect().min),
                to_screen(bounds.rect().max),
            )
            .expand(4.0);
            let hovered = input.hovered_zone == Some(group.zone_id);

            if self.layers.zone_outline || hovered {
                let stroke = if hovered {
                    Stroke::new(2.0, colors::HOVER_OUTLINE)
                } else {
                    Stroke::new(1.0, apply_opacity(group.color, 0.8))
                };
                let corners = [
                    screen.left_top(),
                    screen.right_top(),
                    screen.right_bottom(),
                    screen.left_bottom(),
                    screen.left_top(),
                ];
                painter.extend(Shape::dashed_line(&corners, stroke, DASH_PX, GAP_PX));
            }

            if self.layers.zone_labels && zoom >= LABEL_ZOOM {
                let galley = painter.layout_no_wrap(
                    world.zone_name(group.zone_id),
                    FontId::proportional(12.0),
                    colors::LABEL_TEXT,
                );
                let text_pos = Pos2::new(
                    screen.center().x - galley.size().x / 2.0,
                    screen.top() - galley.size().y - 6.0,
                );
                let plate = Rect::from_min_size(text_pos, galley.size()).expand(3.0);
                painter.rect_filled(plate, 3.0, colors::LABEL_PLATE);
                painter.galley(text_pos, galley, colors::LABEL_TEXT);
            }
        }

        let zone_colors: HashMap<ZoneId, Color32> =
            plan.zones.iter().map(|g| (g.zone_id, g.color)).collect();
        let glyph = (world.glyph_size() * zoom).max(Vec2::splat(MIN_GLYPH_PX));
        let show_glow = self.layers.room_glow && zoom >= ROOM_GLOW_ZOOM;
        let detail = input.mode == ViewMode::RoomDetail;

        for &index in &plan.glyphs {
            let (Some(room), Some(world_pos)) = (world.room(index), world.positions().get(index))
            else {
                continue;
            };
            let center = to_screen(*world_pos);
            let rect = Rect::from_center_size(center, glyph);
            let tint = zone_colors
                .get(&room.key.zone_id)
                .copied()
                .unwrap_or(Color32::GRAY);
            let rounding = glyph.x.min(glyph.y) * 0.2;

            if show_glow {
                painter.rect_filled(
                    rect.expand(glyph.x * 0.25),
                    rounding * 2.0,
                    apply_opacity(tint, 0.18),
                );
            }

            painter.rect_filled(rect, rounding, terrain_color(room.sector));
            painter.rect_filled(rect, rounding, apply_opacity(tint, 0.35));
            // Highlight band across the top third
            let band = Rect::from_min_max(
                rect.min,
                Pos2::new(rect.max.x, rect.min.y + rect.height() / 3.0),
            );
            painter.rect_filled(band, rounding, Color32::from_white_alpha(40));

            if world.layout().get(index).is_some_and(|p| p.is_overlapping) {
                painter.rect_stroke(
                    rect.expand(2.0),
                    rounding,
                    Stroke::new(1.5, colors::OVERLAP_RING),
                );
            }

            if detail {
                self.render_exits(painter, room.exits.iter().map(|e| e.direction), rect, zoom);
                painter.text(
                    Pos2::new(center.x, rect.bottom() + 2.0),
                    Align2::CENTER_TOP,
                    &room.name,
                    FontId::proportional((9.0 * zoom).clamp(8.0, 13.0)),
                    colors::LABEL_TEXT,
                );
            }
        }
        auras
    }

    /// Exit stubs: lines toward planar neighbours, dots for up/down
    fn render_exits(
        &self,
        painter: &egui::Painter,
        directions: impl Iterator<Item = Direction>,
        rect: Rect,
        zoom: f32,
    ) {
        let stroke = Stroke::new(1.0_f32.max(zoom), colors::EXIT_LINE);
        let reach = rect.width() * 0.3;
        for direction in directions {
            let (dx, dy, dz) = direction.vector();
            if dz != 0 {
                let corner = if dz > 0 { rect.right_top() } else { rect.right_bottom() };
                painter.circle_filled(corner, 2.0 * zoom.max(1.0), colors::EXIT_LINE);
                continue;
            }
            let dir = Vec2::new(dx as f32, dy as f32);
            let from = rect.center() + dir * Vec2::new(rect.width() / 2.0, rect.height() / 2.0);
            painter.line_segment([from, from + dir * reach], stroke);
        }
    }

    /// Floating zone label near the top of the frame
    fn render_tooltip(
        &self,
        painter: &egui::Painter,
        screen_rect: Rect,
        world: &WorldModel,
        zone_id: ZoneId,
    ) {
        let rooms = world
            .zone_index()
            .get(zone_id)
            .map(|b| b.room_count)
            .unwrap_or(0);
        let galley = painter.layout_no_wrap(
            format!("{} · {} rooms", world.zone_name(zone_id), rooms),
            FontId::proportional(13.0),
            colors::LABEL_TEXT,
        );
        let pos = Pos2::new(
            screen_rect.center().x - galley.size().x / 2.0,
            screen_rect.top() + 12.0,
        );
        let plate = Rect::from_min_size(pos, galley.size()).expand(6.0);
        painter.rect_filled(plate, 4.0, colors::TOOLTIP_PLATE);
        painter.rect_stroke(plate, 4.0, Stroke::new(1.0, colors::HOVER_OUTLINE));
        painter.galley(pos, galley, colors::LABEL_TEXT);
    }
}
