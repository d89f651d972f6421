//! Render node generation and caching
//!
//! Turns per-zone data into a flat list of drawable nodes for a given zoom.
//! Output is cached under a quantized zoom key so continuous zooming reuses
//! prior work. The cache is a bounded ring: at most [`CACHE_CAPACITY`]
//! entries, oldest produced evicted first, entries older than
//! [`CACHE_TTL_SECS`] ignored.

use super::layout::SquareSpiral;
use super::spatial::ZoneBounds;
use super::types::{RoomKey, ZoneId};
use egui::{Pos2, Rect, Vec2};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::VecDeque;
use std::sync::Arc;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Maximum cached node lists
pub const CACHE_CAPACITY: usize = 5;

/// Cached lists older than this are regenerated
pub const CACHE_TTL_SECS: f64 = 5.0;

/// Zoom is quantized to steps of 1 / ZOOM_QUANTUM
const ZOOM_QUANTUM: f32 = 5.0;

/// Sizing zoom used for the lowest quantization bucket
const MIN_SIZING_ZOOM: f32 = 0.05;

/// Below this zoom, repeated calls during interaction are throttled
const THROTTLE_ZOOM: f32 = 0.5;

/// Minimum spacing between generations while throttled
const THROTTLE_SECS: f64 = 0.1;

/// Room glyphs are emitted from this zoom up
pub const ROOM_GLYPH_ZOOM: f32 = 0.15;

/// Room glyph cap per zone
pub const MAX_GLYPHS_PER_ZONE: usize = 20;

/// Smallest on-screen zone rectangle, in pixels
const MIN_ZONE_SCREEN_PX: f32 = 24.0;

/// Screen gap kept between packed zones
const PACK_GAP_PX: f32 = 6.0;

/// Spiral slots tried before falling back to the far right
const MAX_SPIRAL_STEPS: usize = 48;

// =============================================================================
// INPUT / OUTPUT TYPES
// =============================================================================

/// Per-zone input to the generator
#[derive(Debug, Clone)]
pub struct ZoneData {
    pub zone_id: ZoneId,
    pub label: String,
    /// Exact world-space bounds of the zone's rooms
    pub bounds: ZoneBounds,
    /// World-space room centers, in input order
    pub rooms: Vec<(RoomKey, Pos2)>,
}

/// A drawable unit. Rectangles and positions are in world space; the frame
/// renderer applies the viewport transform.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Zone {
        zone_id: ZoneId,
        rect: Rect,
        label: String,
        room_count: usize,
    },
    Room {
        room_key: RoomKey,
        zone_id: ZoneId,
        pos: Pos2,
    },
}

impl RenderNode {
    pub fn zone_id(&self) -> ZoneId {
        match self {
            RenderNode::Zone { zone_id, .. } | RenderNode::Room { zone_id, .. } => *zone_id,
        }
    }

    pub fn is_zone(&self) -> bool {
        matches!(self, RenderNode::Zone { .. })
    }
}

// =============================================================================
// CACHE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub zone_count: usize,
    /// `round(zoom * 5)`: one step per 0.2 of zoom
    pub zoom_step: i32,
}

impl CacheKey {
    pub fn new(zone_count: usize, zoom: f32) -> Self {
        Self {
            zone_count,
            zoom_step: (zoom * ZOOM_QUANTUM).round() as i32,
        }
    }

    /// Zoom the cached layout was sized for
    pub fn sizing_zoom(&self) -> f32 {
        (self.zoom_step as f32 / ZOOM_QUANTUM).max(MIN_SIZING_ZOOM)
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub nodes: Arc<[RenderNode]>,
    pub timestamp: f64,
}

/// Bounded ring of node lists, ordered oldest produced first
#[derive(Debug, Clone)]
pub struct RenderCache {
    entries: VecDeque<CacheEntry>,
    capacity: usize,
    ttl: f64,
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(CACHE_CAPACITY, CACHE_TTL_SECS)
    }
}

impl RenderCache {
    pub fn new(capacity: usize, ttl: f64) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fresh entry for `key`, if any
    pub fn get(&self, key: &CacheKey, now: f64) -> Option<Arc<[RenderNode]>> {
        self.entries
            .iter()
            .find(|e| e.key == *key && now - e.timestamp <= self.ttl)
            .map(|e| e.nodes.clone())
    }

    /// Store a freshly produced list, replacing any entry with the same key.
    /// Returns the number of entries evicted.
    pub fn insert(&mut self, key: CacheKey, nodes: Arc<[RenderNode]>, now: f64) -> usize {
        self.entries.retain(|e| e.key != key);
        self.entries.push_back(CacheEntry {
            key,
            nodes,
            timestamp: now,
        });
        self.evict()
    }

    /// Drop the oldest produced entries until within capacity
    pub fn evict(&mut self) -> usize {
        let excess = self.entries.len().saturating_sub(self.capacity);
        self.entries.drain(..excess);
        excess
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.iter().map(|e| &e.key)
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub hits: u64,
    pub misses: u64,
    pub throttled: u64,
    pub evictions: u64,
}

/// Cached node generator
#[derive(Debug, Clone, Default)]
pub struct NodeGenerator {
    cache: RenderCache,
    last: Option<(f64, Arc<[RenderNode]>)>,
    stats: GeneratorStats,
}

impl NodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn stats(&self) -> GeneratorStats {
        self.stats
    }

    /// Forget everything (new world data)
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.last = None;
    }

    /// Node list for `zones` at `zoom`.
    ///
    /// `interacting` enables throttling: at low zoom, calls closer together
    /// than [`THROTTLE_SECS`] get the previous list back.
    pub fn generate(
        &mut self,
        zones: &[ZoneData],
        zoom: f32,
        now: f64,
        interacting: bool,
    ) -> Arc<[RenderNode]> {
        if interacting && zoom < THROTTLE_ZOOM {
            if let Some((at, nodes)) = &self.last {
                if now - at < THROTTLE_SECS {
                    self.stats.throttled += 1;
                    return nodes.clone();
                }
            }
        }

        let key = CacheKey::new(zones.len(), zoom);
        if let Some(nodes) = self.cache.get(&key, now) {
            self.stats.hits += 1;
            self.last = Some((now, nodes.clone()));
            return nodes;
        }

        self.stats.misses += 1;
        let nodes: Arc<[RenderNode]> = build_nodes(zones, key.sizing_zoom()).into();
        let evicted = self.cache.insert(key, nodes.clone(), now);
        self.stats.evictions += evicted as u64;
        tracing::debug!(
            "render nodes: miss {:?} -> {} nodes ({} evicted)",
            key,
            nodes.len(),
            evicted
        );
        self.last = Some((now, nodes.clone()));
        nodes
    }
}

// =============================================================================
// PLACEMENT
// =============================================================================

#[derive(Debug, Clone)]
struct PlacedRect(Rect);

impl RTreeObject for PlacedRect {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.0.min.x, self.0.min.y], [self.0.max.x, self.0.max.y])
    }
}

/// Greedy non-overlapping packing of zone rectangles
struct ZonePacker {
    tree: RTree<PlacedRect>,
    max_x: Option<f32>,
    margin: f32,
}

impl ZonePacker {
    fn new(margin: f32) -> Self {
        Self {
            tree: RTree::new(),
            max_x: None,
            margin,
        }
    }

    fn collides(&self, rect: Rect) -> bool {
        let r = rect.expand(self.margin);
        let envelope = AABB::from_corners([r.min.x, r.min.y], [r.max.x, r.max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .next()
            .is_some()
    }

    /// Place `rect` as-is if free, else at the first free spiral slot,
    /// else to the right of everything placed.
    fn place(&mut self, rect: Rect) -> Rect {
        let placed = if !self.collides(rect) {
            rect
        } else {
            let step = rect.size() + Vec2::splat(self.margin * 2.0);
            SquareSpiral::new()
                .skip(1)
                .take(MAX_SPIRAL_STEPS)
                .map(|(sx, sy)| rect.translate(Vec2::new(sx as f32 * step.x, sy as f32 * step.y)))
                .find(|candidate| !self.collides(*candidate))
                .unwrap_or_else(|| {
                    let x = self.max_x.unwrap_or(rect.min.x) + self.margin * 2.0;
                    rect.translate(Vec2::new(x - rect.min.x, 0.0))
                })
        };
        self.max_x = Some(self.max_x.map_or(placed.max.x, |m| m.max(placed.max.x)));
        self.tree.insert(PlacedRect(placed));
        placed
    }
}

/// Produce zone rectangles (and, at sufficient zoom, capped room glyphs)
/// sized for `zoom`
pub fn build_nodes(zones: &[ZoneData], zoom: f32) -> Vec<RenderNode> {
    let zoom = zoom.max(MIN_SIZING_ZOOM);
    let min_size = MIN_ZONE_SCREEN_PX / zoom;
    let mut packer = ZonePacker::new(PACK_GAP_PX / zoom / 2.0);

    // Larger zones first; id breaks ties so output is stable
    let mut order: Vec<&ZoneData> = zones.iter().collect();
    order.sort_by(|a, b| {
        b.bounds
            .room_count
            .cmp(&a.bounds.room_count)
            .then(a.zone_id.cmp(&b.zone_id))
    });

    let with_glyphs = zoom >= ROOM_GLYPH_ZOOM;
    let mut nodes = Vec::with_capacity(zones.len() * if with_glyphs { 1 + MAX_GLYPHS_PER_ZONE } else { 1 });

    for zone in order {
        let source = zone.bounds.rect();
        let size = Vec2::new(source.width().max(min_size), source.height().max(min_size));
        let rect = packer.place(Rect::from_center_size(source.center(), size));

        nodes.push(RenderNode::Zone {
            zone_id: zone.zone_id,
            rect,
            label: zone.label.clone(),
            room_count: zone.bounds.room_count,
        });

        if with_glyphs {
            let n = zone.rooms.len();
            let picks = n.min(MAX_GLYPHS_PER_ZONE);
            // Evenly spread picks across the zone's rooms
            for k in 0..picks {
                let (room_key, world) = &zone.rooms[k * n / picks];
                // Normalized offset inside the source box, mapped into the placed box
                let u = ((world.x - source.min.x) / source.width().max(f32::EPSILON)).clamp(0.0, 1.0);
                let v = ((world.y - source.min.y) / source.height().max(f32::EPSILON)).clamp(0.0, 1.0);
                nodes.push(RenderNode::Room {
                    room_key: *room_key,
                    zone_id: zone.zone_id,
                    pos: Pos2::new(rect.min.x + u * rect.width(), rect.min.y + v * rect.height()),
                });
            }
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::spatial::compute_zone_bounds;

    fn zone(zone_id: ZoneId, origin: Pos2, rooms: usize) -> ZoneData {
        let rooms: Vec<(RoomKey, Pos2)> = (0..rooms)
            .map(|i| {
                let p = origin + Vec2::new((i % 10) as f32 * 40.0, (i / 10) as f32 * 40.0);
                (RoomKey::new(zone_id, i as i64), p)
            })
            .collect();
        let bounds = compute_zone_bounds(
            rooms.iter().map(|(_, p)| (zone_id, *p)),
            Vec2::splat(40.0),
        )[0];
        ZoneData {
            zone_id,
            label: format!("Zone {zone_id}"),
            bounds,
            rooms,
        }
    }

    fn zone_rects(nodes: &[RenderNode]) -> Vec<(ZoneId, Rect)> {
        nodes
            .iter()
            .filter_map(|n| match n {
                RenderNode::Zone { zone_id, rect, .. } => Some((*zone_id, *rect)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_cache_key_quantizes_zoom() {
        assert_eq!(CacheKey::new(3, 0.51), CacheKey::new(3, 0.58));
        assert_ne!(CacheKey::new(3, 0.5), CacheKey::new(3, 0.7));
        assert_ne!(CacheKey::new(3, 0.5), CacheKey::new(4, 0.5));
        assert_eq!(CacheKey::new(1, 0.01).sizing_zoom(), MIN_SIZING_ZOOM);
    }

    #[test]
    fn test_cache_never_exceeds_capacity() {
        let mut cache = RenderCache::default();
        for step in 0..20 {
            cache.insert(CacheKey::new(1, step as f32 * 0.2), Arc::from(vec![]), step as f64);
            assert!(cache.len() <= CACHE_CAPACITY);
        }
        // Most recent five survive
        let steps: Vec<i32> = cache.keys().map(|k| k.zoom_step).collect();
        assert_eq!(steps, vec![15, 16, 17, 18, 19]);
    }

    #[test]
    fn test_cache_ttl() {
        let mut cache = RenderCache::default();
        let key = CacheKey::new(1, 1.0);
        cache.insert(key, Arc::from(vec![]), 10.0);
        assert!(cache.get(&key, 12.0).is_some());
        assert!(cache.get(&key, 10.0 + CACHE_TTL_SECS + 0.1).is_none());
    }

    #[test]
    fn test_generator_hits_within_quantum() {
        let zones = vec![zone(1, Pos2::ZERO, 5), zone(2, Pos2::new(1000.0, 0.0), 3)];
        let mut generator = NodeGenerator::new();
        let a = generator.generate(&zones, 1.0, 0.0, false);
        let b = generator.generate(&zones, 1.05, 0.5, false);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(generator.stats().hits, 1);
        assert_eq!(generator.stats().misses, 1);

        generator.generate(&zones, 1.4, 1.0, false);
        assert_eq!(generator.stats().misses, 2);
    }

    #[test]
    fn test_generator_throttles_low_zoom_interaction() {
        let zones = vec![zone(1, Pos2::ZERO, 5)];
        let mut generator = NodeGenerator::new();
        let a = generator.generate(&zones, 0.2, 0.0, true);
        let b = generator.generate(&zones, 0.45, 0.05, true);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(generator.stats().throttled, 1);

        // Not interacting: no throttle, new key → miss
        generator.generate(&zones, 0.45, 0.06, false);
        assert_eq!(generator.stats().misses, 2);
    }

    #[test]
    fn test_generator_cache_stays_bounded() {
        let zones = vec![zone(1, Pos2::ZERO, 5)];
        let mut generator = NodeGenerator::new();
        for i in 0..40 {
            generator.generate(&zones, 0.1 + i as f32 * 0.05, i as f64, false);
            assert!(generator.cache().len() <= CACHE_CAPACITY);
        }
        assert!(generator.stats().evictions > 0);
    }

    #[test]
    fn test_packed_zones_do_not_overlap() {
        // All zones stacked on one spot
        let zones: Vec<ZoneData> = (0..12).map(|id| zone(id, Pos2::ZERO, 1 + id as usize)).collect();
        let nodes = build_nodes(&zones, 0.4);
        let rects = zone_rects(&nodes);
        assert_eq!(rects.len(), 12);
        for (i, (_, a)) in rects.iter().enumerate() {
            for (_, b) in &rects[i + 1..] {
                assert!(!a.intersects(*b), "{a:?} overlaps {b:?}");
            }
        }
        // Biggest zone first, untouched
        assert_eq!(rects[0].0, 11);
    }

    #[test]
    fn test_zone_rects_have_minimum_screen_size() {
        let zones = vec![zone(1, Pos2::ZERO, 1)];
        let zoom = 0.2;
        let rects = zone_rects(&build_nodes(&zones, zoom));
        let rect = rects[0].1;
        assert!(rect.width() * zoom >= MIN_ZONE_SCREEN_PX - 1e-3);
        assert!(rect.height() * zoom >= MIN_ZONE_SCREEN_PX - 1e-3);
    }

    #[test]
    fn test_room_glyphs_capped_and_inside_zone() {
        let zones = vec![zone(1, Pos2::ZERO, 95)];
        let nodes = build_nodes(&zones, 1.0);
        let rect = zone_rects(&nodes)[0].1;
        let glyphs: Vec<Pos2> = nodes
            .iter()
            .filter_map(|n| match n {
                RenderNode::Room { pos, .. } => Some(*pos),
                _ => None,
            })
            .collect();
        assert_eq!(glyphs.len(), MAX_GLYPHS_PER_ZONE);
        assert!(glyphs.iter().all(|p| rect.expand(0.01).contains(*p)));
    }

    #[test]
    fn test_no_room_glyphs_at_low_zoom() {
        let zones = vec![zone(1, Pos2::ZERO, 10)];
        let nodes = build_nodes(&zones, 0.1);
        assert!(nodes.iter().all(RenderNode::is_zone));
    }
}
