//! Spatial indexing for hover and click
//!
//! Two indexes with different jobs:
//! - [`ZoneIndex`]: per-zone bounding boxes, hit-tested by linear scan
//!   (zones number in the hundreds, rooms in the tens of thousands).
//! - [`RoomIndex`]: R-tree (via `rstar`) over room glyph rectangles, used for
//!   culling and click resolution.

use super::types::ZoneId;
use egui::{Pos2, Rect, Vec2};
use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};
use std::collections::HashMap;

/// Rooms sampled when estimating the extent of a very large world
pub const BOUNDS_SAMPLE_LIMIT: usize = 1000;

// =============================================================================
// ZONE BOUNDS
// =============================================================================

/// Axis-aligned extent of one zone in world pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBounds {
    pub zone_id: ZoneId,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub room_count: usize,
}

impl ZoneBounds {
    fn seed(zone_id: ZoneId, p: Pos2) -> Self {
        Self {
            zone_id,
            min_x: p.x,
            max_x: p.x,
            min_y: p.y,
            max_y: p.y,
            center_x: p.x,
            center_y: p.y,
            room_count: 1,
        }
    }

    fn include(&mut self, p: Pos2) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
        self.room_count += 1;
    }

    /// Grow each axis to at least `min_extent`, keeping the center fixed,
    /// then refresh the center fields.
    fn finish(&mut self, min_extent: Vec2) {
        let cx = (self.min_x + self.max_x) / 2.0;
        let cy = (self.min_y + self.max_y) / 2.0;
        if self.max_x - self.min_x < min_extent.x {
            self.min_x = cx - min_extent.x / 2.0;
            self.max_x = cx + min_extent.x / 2.0;
        }
        if self.max_y - self.min_y < min_extent.y {
            self.min_y = cy - min_extent.y / 2.0;
            self.max_y = cy + min_extent.y / 2.0;
        }
        self.center_x = cx;
        self.center_y = cy;
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_max(
            Pos2::new(self.min_x, self.min_y),
            Pos2::new(self.max_x, self.max_y),
        )
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(self.center_x, self.center_y)
    }

    pub fn contains(&self, p: Pos2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Per-zone bounds over every room, in order of first appearance.
///
/// Boxes narrower than `min_extent` on an axis are padded symmetrically so
/// single-room zones still have area.
pub fn compute_zone_bounds(
    rooms: impl IntoIterator<Item = (ZoneId, Pos2)>,
    min_extent: Vec2,
) -> Vec<ZoneBounds> {
    let mut order: HashMap<ZoneId, usize> = HashMap::new();
    let mut bounds: Vec<ZoneBounds> = Vec::new();
    for (zone_id, p) in rooms {
        match order.get(&zone_id) {
            Some(&i) => bounds[i].include(p),
            None => {
                order.insert(zone_id, bounds.len());
                bounds.push(ZoneBounds::seed(zone_id, p));
            }
        }
    }
    for b in &mut bounds {
        b.finish(min_extent);
    }
    bounds
}

/// Approximate world extent from at most `limit` evenly strided points.
///
/// Only used to center the first view; everything else uses exact bounds.
pub fn sampled_bounds(points: &[Pos2], limit: usize, min_extent: Vec2) -> Option<Rect> {
    if points.is_empty() || limit == 0 {
        return None;
    }
    let stride = points.len().div_ceil(limit).max(1);
    let mut iter = points.iter().step_by(stride);
    let first = *iter.next()?;
    let mut rect = Rect::from_min_max(first, first);
    for p in iter {
        rect.extend_with(*p);
    }
    // The last point often closes the extent of grid-ordered data
    if let Some(last) = points.last() {
        rect.extend_with(*last);
    }
    Some(pad_rect(rect, min_extent))
}

/// Exact world extent of all points
pub fn exact_bounds(points: &[Pos2], min_extent: Vec2) -> Option<Rect> {
    let first = *points.first()?;
    let rect = points
        .iter()
        .fold(Rect::from_min_max(first, first), |mut r, p| {
            r.extend_with(*p);
            r
        });
    Some(pad_rect(rect, min_extent))
}

fn pad_rect(rect: Rect, min_extent: Vec2) -> Rect {
    let size = Vec2::new(
        rect.width().max(min_extent.x),
        rect.height().max(min_extent.y),
    );
    Rect::from_center_size(rect.center(), size)
}

// =============================================================================
// ZONE INDEX
// =============================================================================

/// Zone boxes for hover hit-testing
#[derive(Debug, Clone, Default)]
pub struct ZoneIndex {
    bounds: Vec<ZoneBounds>,
    by_id: HashMap<ZoneId, usize>,
}

impl ZoneIndex {
    pub fn new(bounds: Vec<ZoneBounds>) -> Self {
        let by_id = bounds
            .iter()
            .enumerate()
            .map(|(i, b)| (b.zone_id, i))
            .collect();
        Self { bounds, by_id }
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn get(&self, zone_id: ZoneId) -> Option<&ZoneBounds> {
        self.by_id.get(&zone_id).map(|&i| &self.bounds[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneBounds> {
        self.bounds.iter()
    }

    /// First zone whose box contains the world point
    pub fn hit_test(&self, world: Pos2) -> Option<ZoneId> {
        self.bounds
            .iter()
            .find(|b| b.contains(world))
            .map(|b| b.zone_id)
    }
}

// =============================================================================
// ROOM INDEX
// =============================================================================

/// Room glyph rectangle in world space, tagged with its input index
#[derive(Debug, Clone)]
pub struct RoomEntry {
    pub index: usize,
    bounds: AABB<[f32; 2]>,
}

impl RoomEntry {
    pub fn new(index: usize, center: Pos2, half_size: Vec2) -> Self {
        Self {
            index,
            bounds: AABB::from_corners(
                [center.x - half_size.x, center.y - half_size.y],
                [center.x + half_size.x, center.y + half_size.y],
            ),
        }
    }
}

impl RTreeObject for RoomEntry {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

impl PointDistance for RoomEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        Envelope::distance_2(&self.bounds, point)
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        Envelope::contains_point(&self.bounds, point)
    }
}

/// R-tree over room glyphs
#[derive(Clone, Default)]
pub struct RoomIndex {
    tree: RTree<RoomEntry>,
    count: usize,
}

impl std::fmt::Debug for RoomIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomIndex")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl RoomIndex {
    /// Bulk-load from world-space glyph centers, all of one size
    pub fn from_centers(centers: impl Iterator<Item = Pos2>, half_size: Vec2) -> Self {
        let entries: Vec<_> = centers
            .enumerate()
            .map(|(i, c)| RoomEntry::new(i, c, half_size))
            .collect();
        let count = entries.len();
        Self {
            tree: RTree::bulk_load(entries),
            count,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Input indices of rooms intersecting `rect`, ascending
    pub fn query_rect(&self, rect: Rect) -> Vec<usize> {
        let envelope = AABB::from_corners([rect.min.x, rect.min.y], [rect.max.x, rect.max.y]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// First room (lowest input index) whose glyph contains the point
    pub fn hit_test(&self, world: Pos2) -> Option<usize> {
        self.tree
            .locate_all_at_point(&[world.x, world.y])
            .map(|e| e.index)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: Vec2 = Vec2::new(40.0, 40.0);

    #[test]
    fn test_zone_bounds_and_center() {
        let bounds = compute_zone_bounds(
            [
                (1, Pos2::new(0.0, 0.0)),
                (1, Pos2::new(40.0, 0.0)),
                (2, Pos2::new(400.0, 400.0)),
                (1, Pos2::new(40.0, 80.0)),
            ],
            CELL,
        );
        assert_eq!(bounds.len(), 2);
        let z1 = bounds[0];
        assert_eq!(z1.zone_id, 1);
        assert_eq!(z1.room_count, 3);
        assert_eq!((z1.min_x, z1.max_x, z1.min_y, z1.max_y), (0.0, 40.0, 0.0, 80.0));
        assert_eq!(z1.center(), Pos2::new(20.0, 40.0));
    }

    #[test]
    fn test_single_room_zone_is_padded() {
        let bounds = compute_zone_bounds([(7, Pos2::new(100.0, 100.0))], CELL);
        let b = bounds[0];
        assert_eq!(b.rect().width(), 40.0);
        assert_eq!(b.rect().height(), 40.0);
        assert_eq!(b.center(), Pos2::new(100.0, 100.0));
    }

    #[test]
    fn test_zone_hit_test_first_match() {
        let index = ZoneIndex::new(compute_zone_bounds(
            [
                (1, Pos2::new(0.0, 0.0)),
                (1, Pos2::new(200.0, 200.0)),
                (2, Pos2::new(100.0, 100.0)),
            ],
            CELL,
        ));
        // Zone 2 sits inside zone 1; zone 1 comes first
        assert_eq!(index.hit_test(Pos2::new(100.0, 100.0)), Some(1));
        assert_eq!(index.hit_test(Pos2::new(-100.0, 0.0)), None);
        assert_eq!(index.get(2).map(|b| b.room_count), Some(1));
    }

    #[test]
    fn test_sampled_bounds_approximates_exact() {
        let points: Vec<Pos2> = (0..50_000)
            .map(|i| Pos2::new((i % 250) as f32 * 40.0, (i / 250) as f32 * 40.0))
            .collect();
        let exact = exact_bounds(&points, CELL).unwrap();
        let sampled = sampled_bounds(&points, BOUNDS_SAMPLE_LIMIT, CELL).unwrap();
        assert!(exact.contains_rect(sampled));
        assert!(sampled.width() >= exact.width() * 0.9);
        assert!(sampled.height() >= exact.height() * 0.9);
    }

    #[test]
    fn test_sampled_bounds_empty() {
        assert!(sampled_bounds(&[], BOUNDS_SAMPLE_LIMIT, CELL).is_none());
        assert!(exact_bounds(&[], CELL).is_none());
    }

    #[test]
    fn test_room_index_query_and_hit() {
        let centers = [
            Pos2::new(0.0, 0.0),
            Pos2::new(40.0, 0.0),
            Pos2::new(40.0, 0.0),
            Pos2::new(400.0, 400.0),
        ];
        let index = RoomIndex::from_centers(centers.into_iter(), Vec2::splat(14.0));
        assert_eq!(index.len(), 4);

        let visible = index.query_rect(Rect::from_min_max(
            Pos2::new(-10.0, -10.0),
            Pos2::new(100.0, 100.0),
        ));
        assert_eq!(visible, vec![0, 1, 2]);

        // Duplicates at one spot resolve to the first
        assert_eq!(index.hit_test(Pos2::new(45.0, 5.0)), Some(1));
        assert_eq!(index.hit_test(Pos2::new(20.0, 0.0)), None);
    }
}
