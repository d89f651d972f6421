//! World model - the explicit recompute step
//!
//! Everything derived from room/zone data lives here and is rebuilt in one
//! pass whenever new data arrives: layout, world positions, zone bounds, the
//! room R-tree and generator input. Nothing here depends on the viewport.

use super::camera::CellSize;
use super::colors;
use super::layout::{auto_layout, LayoutResult};
use super::nodes::ZoneData;
use super::spatial::{
    compute_zone_bounds, sampled_bounds, RoomIndex, ZoneIndex, BOUNDS_SAMPLE_LIMIT,
};
use super::types::{Room, WorldData, Zone, ZoneId};
use crate::config::MapConfig;
use egui::{Color32, Pos2, Rect, Vec2};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Share of a cell covered by a room glyph
pub const GLYPH_FILL: f32 = 0.7;

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub rooms: usize,
    pub zones: usize,
    /// Rooms whose coordinate came from auto-layout
    pub derived: usize,
    pub conflicts: usize,
    pub detached_groups: u32,
}

/// Validated world plus everything derived from it
#[derive(Debug, Clone)]
pub struct WorldModel {
    /// Unique per build; consumers compare it to detect new data
    pub revision: u64,
    pub cell: CellSize,
    rooms: Vec<Room>,
    zones: HashMap<ZoneId, Zone>,
    layout: LayoutResult,
    positions: Vec<Pos2>,
    zone_index: ZoneIndex,
    room_index: RoomIndex,
    zone_data: Vec<ZoneData>,
    /// Dominant-sector tint over each zone's full room set
    zone_colors: HashMap<ZoneId, Color32>,
    stats: WorldStats,
}

impl WorldModel {
    pub fn build(data: WorldData, config: &MapConfig) -> Self {
        let cell = CellSize::new(config.cell_width, config.cell_height);
        let WorldData { zones, rooms } = data;

        let layout = auto_layout(&rooms, None);
        let positions: Vec<Pos2> = layout.iter().map(|p| cell.to_world(p.pos)).collect();

        let bounds = compute_zone_bounds(
            rooms
                .iter()
                .zip(&positions)
                .map(|(room, p)| (room.key.zone_id, *p)),
            cell.as_vec2(),
        );

        let zones: HashMap<ZoneId, Zone> = zones.into_iter().map(|z| (z.id, z)).collect();

        let mut members: HashMap<ZoneId, Vec<usize>> = HashMap::new();
        for (i, room) in rooms.iter().enumerate() {
            members.entry(room.key.zone_id).or_default().push(i);
        }
        let zone_data = bounds
            .iter()
            .map(|b| ZoneData {
                zone_id: b.zone_id,
                label: zone_label(&zones, b.zone_id),
                bounds: *b,
                rooms: members
                    .get(&b.zone_id)
                    .into_iter()
                    .flatten()
                    .map(|&i| (rooms[i].key, positions[i]))
                    .collect(),
            })
            .collect();

        let zone_colors = members
            .iter()
            .map(|(&zone_id, indices)| {
                let dominant = colors::dominant_sector(indices.iter().map(|&i| rooms[i].sector));
                (zone_id, colors::zone_color(zone_id, dominant))
            })
            .collect();

        let half = cell.as_vec2() * GLYPH_FILL / 2.0;
        let room_index = RoomIndex::from_centers(positions.iter().copied(), half);
        let zone_index = ZoneIndex::new(bounds);

        let stats = WorldStats {
            rooms: rooms.len(),
            zones: zone_index.len(),
            derived: layout.derived_count(),
            conflicts: layout.conflicts,
            detached_groups: layout.detached_groups,
        };
        let revision = NEXT_REVISION.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            "world model r{}: {} rooms in {} zones ({} derived, {} conflicts, {} detached groups)",
            revision,
            stats.rooms,
            stats.zones,
            stats.derived,
            stats.conflicts,
            stats.detached_groups
        );

        Self {
            revision,
            cell,
            rooms,
            zones,
            layout,
            positions,
            zone_index,
            room_index,
            zone_data,
            zone_colors,
            stats,
        }
    }

    /// Model with no rooms (load failure, before first load)
    pub fn empty(config: &MapConfig) -> Self {
        Self::build(WorldData::default(), config)
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    /// World-space centers, indexed like [`rooms`](Self::rooms)
    pub fn positions(&self) -> &[Pos2] {
        &self.positions
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn zone_index(&self) -> &ZoneIndex {
        &self.zone_index
    }

    pub fn room_index(&self) -> &RoomIndex {
        &self.room_index
    }

    pub fn zone_data(&self) -> &[ZoneData] {
        &self.zone_data
    }

    pub fn zone(&self, zone_id: ZoneId) -> Option<&Zone> {
        self.zones.get(&zone_id)
    }

    pub fn zone_name(&self, zone_id: ZoneId) -> String {
        zone_label(&self.zones, zone_id)
    }

    /// Zone tint over all of the zone's rooms
    pub fn zone_color(&self, zone_id: ZoneId) -> Color32 {
        self.zone_colors
            .get(&zone_id)
            .copied()
            .unwrap_or_else(|| colors::zone_color(zone_id, None))
    }

    /// World-space glyph size
    pub fn glyph_size(&self) -> Vec2 {
        self.cell.as_vec2() * GLYPH_FILL
    }

    /// Extent used to fit the whole world on screen (sampled for big worlds)
    pub fn fit_extent(&self) -> Option<Rect> {
        sampled_bounds(&self.positions, BOUNDS_SAMPLE_LIMIT, self.cell.as_vec2())
    }

    /// First room whose glyph contains the world point
    pub fn room_at(&self, world: Pos2) -> Option<usize> {
        self.room_index.hit_test(world)
    }
}

fn zone_label(zones: &HashMap<ZoneId, Zone>, zone_id: ZoneId) -> String {
    zones
        .get(&zone_id)
        .map(|z| z.name.clone())
        .unwrap_or_else(|| format!("Zone {zone_id}"))
}
