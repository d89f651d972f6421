//! Auto-layout - grid placement for rooms without persisted coordinates
//!
//! Rooms are placed by breadth-first expansion over exits from a start room:
//! each newly reached room sits one cell from its predecessor in the exit's
//! direction. Rooms the expansion never reaches are grouped into connected
//! components and parked on an outward square spiral around the main layout.
//!
//! # Guarantees
//! - Persisted coordinates are never changed.
//! - Same input order → same output (no hashing order leaks into placement).
//! - Two rooms landing on one cell are both flagged `is_overlapping`;
//!   neither is dropped.
//! - An exit whose endpoints are not one step apart in its direction (paths
//!   that converge inconsistently) flags both endpoints when either one was
//!   derived.

use super::types::{Direction, GridPos, Room, RoomKey};
use std::collections::{HashMap, HashSet, VecDeque};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Empty cells kept between spiral slots
const DETACHED_GAP: i32 = 4;

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Which layout a placement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutGroup {
    /// Persisted, or reached from the start room
    #[default]
    Primary,
    /// Disconnected component, numbered from 1 in input order
    Detached(u32),
}

/// Effective coordinate of one room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub pos: GridPos,
    pub group: LayoutGroup,
    /// True when the coordinate came from auto-layout rather than storage
    pub derived: bool,
    pub is_overlapping: bool,
}

/// Placements for a room set, indexed like the input slice
#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    placements: Vec<Placement>,
    index: HashMap<RoomKey, usize>,
    /// Cell collisions plus exits left non-adjacent by derived placement
    pub conflicts: usize,
    /// Number of detached components parked on the spiral
    pub detached_groups: u32,
}

impl LayoutResult {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Placement by input index
    pub fn get(&self, index: usize) -> Option<&Placement> {
        self.placements.get(index)
    }

    pub fn placement(&self, key: &RoomKey) -> Option<&Placement> {
        self.index.get(key).and_then(|&i| self.placements.get(i))
    }

    pub fn position(&self, key: &RoomKey) -> Option<GridPos> {
        self.placement(key).map(|p| p.pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter()
    }

    pub fn derived_count(&self) -> usize {
        self.placements.iter().filter(|p| p.derived).count()
    }
}

// =============================================================================
// SQUARE SPIRAL
// =============================================================================

/// Integer square spiral around the origin: (0,0), (1,0), (1,1), (0,1), (-1,1) …
///
/// Every step visits a new cell, so consecutive slots never coincide.
#[derive(Debug, Clone)]
pub struct SquareSpiral {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
}

impl Default for SquareSpiral {
    fn default() -> Self {
        Self::new()
    }
}

impl SquareSpiral {
    pub fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            dx: 0,
            dy: -1,
        }
    }
}

impl Iterator for SquareSpiral {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        let current = (self.x, self.y);
        let (x, y) = current;
        if x == y || (x < 0 && x == -y) || (x > 0 && x == 1 - y) {
            let (dx, dy) = (-self.dy, self.dx);
            self.dx = dx;
            self.dy = dy;
        }
        self.x += self.dx;
        self.y += self.dy;
        Some(current)
    }
}

// =============================================================================
// LAYOUT ENGINE
// =============================================================================

/// Grid placement engine. Stateless; holds only the input lookup.
pub struct AutoLayout<'a> {
    rooms: &'a [Room],
    index: HashMap<RoomKey, usize>,
}

/// Per-run mutable state
struct PlacementState {
    placements: Vec<Option<Placement>>,
    occupied: HashMap<GridPos, usize>,
    conflicts: usize,
}

impl PlacementState {
    /// Record a placement, flagging both rooms if the cell is taken
    fn place(&mut self, index: usize, placement: Placement) {
        let mut placement = placement;
        if let Some(&other) = self.occupied.get(&placement.pos) {
            if other != index {
                placement.is_overlapping = true;
                if let Some(existing) = self.placements[other].as_mut() {
                    existing.is_overlapping = true;
                }
                self.conflicts += 1;
            }
        } else {
            self.occupied.insert(placement.pos, index);
        }
        self.placements[index] = Some(placement);
    }
}

impl<'a> AutoLayout<'a> {
    pub fn new(rooms: &'a [Room]) -> Self {
        let index = rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key, i))
            .collect();
        Self { rooms, index }
    }

    /// Pick the start room: the first room carrying persisted coordinates, so
    /// derived rooms grow out of the stored map; otherwise the first room.
    pub fn default_start(&self) -> Option<RoomKey> {
        self.rooms
            .iter()
            .find(|r| r.position.is_some())
            .or_else(|| self.rooms.first())
            .map(|r| r.key)
    }

    /// Assign a coordinate to every room.
    ///
    /// `start` falls back to [`default_start`](Self::default_start) when
    /// absent or unknown.
    pub fn run(&self, start: Option<RoomKey>) -> LayoutResult {
        let mut state = PlacementState {
            placements: vec![None; self.rooms.len()],
            occupied: HashMap::new(),
            conflicts: 0,
        };

        // Persisted rooms first, in input order
        for (i, room) in self.rooms.iter().enumerate() {
            if let Some(pos) = room.position {
                state.occupied.entry(pos).or_insert(i);
                state.placements[i] = Some(Placement {
                    pos,
                    group: LayoutGroup::Primary,
                    derived: false,
                    is_overlapping: false,
                });
            }
        }

        let start_index = start
            .and_then(|key| self.index.get(&key).copied())
            .or_else(|| self.default_start().and_then(|k| self.index.get(&k).copied()));

        if let Some(start_index) = start_index {
            self.expand_primary(start_index, &mut state);
        }

        let detached_groups = self.place_detached(&mut state);

        // Every room is placed by now; the fallback only guards the type
        let mut placements: Vec<Placement> = state
            .placements
            .into_iter()
            .map(|p| {
                p.unwrap_or(Placement {
                    pos: GridPos::ORIGIN,
                    group: LayoutGroup::Primary,
                    derived: true,
                    is_overlapping: false,
                })
            })
            .collect();
        state.conflicts += self.flag_misaligned_exits(&mut placements);

        if state.conflicts > 0 {
            tracing::debug!(
                "auto-layout: {} cell conflicts among {} rooms",
                state.conflicts,
                self.rooms.len()
            );
        }

        LayoutResult {
            placements,
            index: self.index.clone(),
            conflicts: state.conflicts,
            detached_groups,
        }
    }

    /// Breadth-first expansion along outgoing exits
    fn expand_primary(&self, start: usize, state: &mut PlacementState) {
        if state.placements[start].is_none() {
            state.place(
                start,
                Placement {
                    pos: GridPos::ORIGIN,
                    group: LayoutGroup::Primary,
                    derived: true,
                    is_overlapping: false,
                },
            );
        }

        let mut visited = vec![false; self.rooms.len()];
        let mut queue = VecDeque::new();
        visited[start] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let Some(origin) = state.placements[current].map(|p| p.pos) else {
                continue;
            };
            for exit in &self.rooms[current].exits {
                let Some(&next) = self.index.get(&exit.to) else {
                    continue;
                };
                if visited[next] {
                    continue;
                }
                visited[next] = true;
                if state.placements[next].is_none() {
                    state.place(
                        next,
                        Placement {
                            pos: origin.step(exit.direction),
                            group: LayoutGroup::Primary,
                            derived: true,
                            is_overlapping: false,
                        },
                    );
                }
                queue.push_back(next);
            }
        }
    }

    /// Flag both ends of every exit that does not land one step away in its
    /// direction, unless both ends are persisted. Returns the number of room
    /// pairs flagged; a two-way exit pair counts once.
    fn flag_misaligned_exits(&self, placements: &mut [Placement]) -> usize {
        let mut flagged: HashSet<(usize, usize)> = HashSet::new();
        for (from, room) in self.rooms.iter().enumerate() {
            for exit in &room.exits {
                let Some(&to) = self.index.get(&exit.to) else {
                    continue;
                };
                if to == from || !(placements[from].derived || placements[to].derived) {
                    continue;
                }
                if placements[to].pos == placements[from].pos.step(exit.direction) {
                    continue;
                }
                if flagged.insert((from.min(to), from.max(to))) {
                    placements[from].is_overlapping = true;
                    placements[to].is_overlapping = true;
                }
            }
        }
        if !flagged.is_empty() {
            tracing::debug!("auto-layout: {} exits not adjacent after placement", flagged.len());
        }
        flagged.len()
    }

    /// Lay out unreached rooms component by component, then park each
    /// component in its own spiral slot around the main layout.
    fn place_detached(&self, state: &mut PlacementState) -> u32 {
        let unplaced: Vec<usize> = (0..self.rooms.len())
            .filter(|&i| state.placements[i].is_none())
            .collect();
        if unplaced.is_empty() {
            return 0;
        }

        // Undirected adjacency among unplaced rooms; reverse edges use the
        // opposite direction so positions stay consistent either way round.
        let mut adjacency: HashMap<usize, Vec<(usize, Direction)>> = HashMap::new();
        for &i in &unplaced {
            for exit in &self.rooms[i].exits {
                let Some(&j) = self.index.get(&exit.to) else {
                    continue;
                };
                if j == i || state.placements[j].is_some() {
                    continue;
                }
                adjacency.entry(i).or_default().push((j, exit.direction));
                adjacency
                    .entry(j)
                    .or_default()
                    .push((i, exit.direction.opposite()));
            }
        }

        // Local layouts, one per component
        let mut assigned = vec![false; self.rooms.len()];
        let mut components: Vec<Vec<(usize, GridPos)>> = Vec::new();
        for &seed in &unplaced {
            if assigned[seed] {
                continue;
            }
            assigned[seed] = true;
            let mut local = vec![(seed, GridPos::ORIGIN)];
            let mut queue = VecDeque::from([(seed, GridPos::ORIGIN)]);
            while let Some((current, pos)) = queue.pop_front() {
                for &(next, direction) in adjacency.get(&current).into_iter().flatten() {
                    if assigned[next] {
                        continue;
                    }
                    assigned[next] = true;
                    let next_pos = pos.step(direction);
                    local.push((next, next_pos));
                    queue.push_back((next, next_pos));
                }
            }
            components.push(local);
        }

        // Slot size: every layout (main and components) fits inside one slot
        let main_bounds = planar_bounds(state.placements.iter().flatten().map(|p| p.pos));
        let component_bounds: Vec<PlanarBounds> = components
            .iter()
            .map(|c| planar_bounds(c.iter().map(|(_, p)| *p)).unwrap_or_default())
            .collect();
        let max_extent = component_bounds
            .iter()
            .chain(main_bounds.iter())
            .map(|b| b.extent())
            .max()
            .unwrap_or(1);
        let slot = max_extent + i64::from(DETACHED_GAP);
        let (center_x, center_y) = main_bounds.map(|b| b.center()).unwrap_or((0, 0));

        let mut spiral = SquareSpiral::new();
        spiral.next(); // slot (0, 0) belongs to the main layout

        for (n, (local, bounds)) in components.iter().zip(&component_bounds).enumerate() {
            let (sx, sy) = spiral.next().unwrap_or((n as i32 + 1, 0));
            let (cx, cy) = bounds.center();
            let dx = center_x + i64::from(sx) * slot - cx;
            let dy = center_y + i64::from(sy) * slot - cy;
            let group = LayoutGroup::Detached(n as u32 + 1);
            for &(room, pos) in local {
                state.place(
                    room,
                    Placement {
                        pos: pos.translate(dx, dy),
                        group,
                        derived: true,
                        is_overlapping: false,
                    },
                );
            }
        }

        components.len() as u32
    }
}

/// Convenience wrapper: lay out `rooms` from `start`
pub fn auto_layout(rooms: &[Room], start: Option<RoomKey>) -> LayoutResult {
    AutoLayout::new(rooms).run(start)
}

// =============================================================================
// PLANAR BOUNDS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanarBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl PlanarBounds {
    /// Larger side length in cells (inclusive). Wide, since persisted
    /// coordinates may span the whole `i32` range.
    pub fn extent(&self) -> i64 {
        let width = i64::from(self.max_x) - i64::from(self.min_x) + 1;
        let height = i64::from(self.max_y) - i64::from(self.min_y) + 1;
        width.max(height)
    }

    pub fn center(&self) -> (i64, i64) {
        (
            (i64::from(self.min_x) + i64::from(self.max_x)).div_euclid(2),
            (i64::from(self.min_y) + i64::from(self.max_y)).div_euclid(2),
        )
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        (self.min_x..=self.max_x).contains(&pos.x) && (self.min_y..=self.max_y).contains(&pos.y)
    }
}

pub fn planar_bounds(positions: impl Iterator<Item = GridPos>) -> Option<PlanarBounds> {
    positions.fold(None, |acc: Option<PlanarBounds>, p| {
        Some(match acc {
            None => PlanarBounds {
                min_x: p.x,
                max_x: p.x,
                min_y: p.y,
                max_y: p.y,
            },
            Some(b) => PlanarBounds {
                min_x: b.min_x.min(p.x),
                max_x: b.max_x.max(p.x),
                min_y: b.min_y.min(p.y),
                max_y: b.max_y.max(p.y),
            },
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::Direction::*;

    fn key(id: i64) -> RoomKey {
        RoomKey::new(1, id)
    }

    /// 3x3 grid of rooms wired with two-way exits, ids 1..=9 row-major
    fn grid_world() -> Vec<Room> {
        let id = |x: i64, y: i64| y * 3 + x + 1;
        let mut rooms = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                let mut room = Room::new(1, id(x, y));
                if y > 0 {
                    room = room.with_exit(North, key(id(x, y - 1)));
                }
                if x < 2 {
                    room = room.with_exit(East, key(id(x + 1, y)));
                }
                if y < 2 {
                    room = room.with_exit(South, key(id(x, y + 1)));
                }
                if x > 0 {
                    room = room.with_exit(West, key(id(x - 1, y)));
                }
                rooms.push(room);
            }
        }
        rooms
    }

    #[test]
    fn test_spiral_visits_distinct_cells() {
        let cells: Vec<_> = SquareSpiral::new().take(25).collect();
        assert_eq!(cells[0], (0, 0));
        assert_eq!(cells[1], (1, 0));
        let unique: std::collections::HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), 25);
        // 25 steps fill exactly the 5x5 square
        assert!(cells.iter().all(|(x, y)| x.abs() <= 2 && y.abs() <= 2));
    }

    #[test]
    fn test_grid_layout_matches_directions() {
        let rooms = grid_world();
        let result = auto_layout(&rooms, Some(key(1)));

        assert_eq!(result.conflicts, 0);
        assert_eq!(result.position(&key(1)), Some(GridPos::ORIGIN));
        assert_eq!(result.position(&key(2)), Some(GridPos::new(1, 0, 0)));
        assert_eq!(result.position(&key(9)), Some(GridPos::new(2, 2, 0)));

        for room in &rooms {
            let from = result.position(&room.key).unwrap();
            for exit in &room.exits {
                let to = result.position(&exit.to).unwrap();
                assert_eq!(to, from.step(exit.direction), "exit {} -> {}", room.key, exit.to);
            }
        }
    }

    #[test]
    fn test_persisted_rooms_untouched() {
        let rooms = vec![
            Room::new(1, 1).at(10, 10, 0).with_exit(East, key(2)),
            Room::new(1, 2).with_exit(East, key(3)),
            Room::new(1, 3).at(50, 50, 2),
        ];
        let result = auto_layout(&rooms, None);

        assert_eq!(result.position(&key(1)), Some(GridPos::new(10, 10, 0)));
        assert_eq!(result.position(&key(2)), Some(GridPos::new(11, 10, 0)));
        assert_eq!(result.position(&key(3)), Some(GridPos::new(50, 50, 2)));
        assert!(!result.placement(&key(1)).unwrap().derived);
        assert!(result.placement(&key(2)).unwrap().derived);
        assert!(!result.placement(&key(3)).unwrap().derived);
    }

    #[test]
    fn test_up_down_change_level() {
        let rooms = vec![
            Room::new(1, 1).with_exit(Up, key(2)),
            Room::new(1, 2).with_exit(Down, key(1)),
        ];
        let result = auto_layout(&rooms, Some(key(1)));
        assert_eq!(result.position(&key(2)), Some(GridPos::new(0, 0, 1)));
    }

    #[test]
    fn test_conflict_flags_both_rooms() {
        // 1 -east-> 2, 1 -south-> 3, 2 -south-> 4, 3 -north-> (nothing)
        // 3 -east-> 5: both 4 and 5 want (1, 1)
        let rooms = vec![
            Room::new(1, 1).with_exit(East, key(2)).with_exit(South, key(3)),
            Room::new(1, 2).with_exit(South, key(4)),
            Room::new(1, 3).with_exit(East, key(5)),
            Room::new(1, 4),
            Room::new(1, 5),
        ];
        let result = auto_layout(&rooms, Some(key(1)));

        assert_eq!(result.conflicts, 1);
        assert_eq!(result.position(&key(4)), Some(GridPos::new(1, 1, 0)));
        assert_eq!(result.position(&key(5)), Some(GridPos::new(1, 1, 0)));
        assert!(result.placement(&key(4)).unwrap().is_overlapping);
        assert!(result.placement(&key(5)).unwrap().is_overlapping);
        assert!(!result.placement(&key(1)).unwrap().is_overlapping);
    }

    #[test]
    fn test_converging_paths_flag_misaligned_exit() {
        // 1 -east-> 2 puts 2 at (1, 0); 1 -south-> 3 -east-> 2 wants (1, 1)
        let rooms = vec![
            Room::new(1, 1).with_exit(East, key(2)).with_exit(South, key(3)),
            Room::new(1, 2),
            Room::new(1, 3).with_exit(East, key(2)),
        ];
        let result = auto_layout(&rooms, Some(key(1)));

        assert_eq!(result.position(&key(2)), Some(GridPos::new(1, 0, 0)));
        assert_eq!(result.position(&key(3)), Some(GridPos::new(0, 1, 0)));
        assert!(result.placement(&key(2)).unwrap().is_overlapping);
        assert!(result.placement(&key(3)).unwrap().is_overlapping);
        assert!(!result.placement(&key(1)).unwrap().is_overlapping);
        assert_eq!(result.conflicts, 1);
    }

    #[test]
    fn test_two_way_misaligned_exit_counts_once() {
        let rooms = vec![
            Room::new(1, 1).with_exit(East, key(2)).with_exit(South, key(3)),
            Room::new(1, 2).with_exit(West, key(3)),
            Room::new(1, 3).with_exit(East, key(2)),
        ];
        let result = auto_layout(&rooms, Some(key(1)));
        assert_eq!(result.conflicts, 1);
    }

    #[test]
    fn test_persisted_pair_is_never_flagged() {
        // Stored coordinates disagree with the exit; both are kept as stored
        let rooms = vec![
            Room::new(1, 1).at(0, 0, 0).with_exit(East, key(2)),
            Room::new(1, 2).at(5, 5, 0),
        ];
        let result = auto_layout(&rooms, None);
        assert!(!result.placement(&key(1)).unwrap().is_overlapping);
        assert!(!result.placement(&key(2)).unwrap().is_overlapping);
        assert_eq!(result.conflicts, 0);
    }

    #[test]
    fn test_extreme_persisted_coordinates_do_not_overflow() {
        let rooms = vec![
            Room::new(1, 1).at(-2_000_000_000, 0, 0),
            Room::new(1, 2).at(2_000_000_000, 0, 0),
            Room::new(1, 3),
        ];
        let result = auto_layout(&rooms, None);

        let main = planar_bounds(rooms[..2].iter().filter_map(|r| r.position)).unwrap();
        assert_eq!(main.extent(), 4_000_000_001);
        assert_eq!(main.center(), (0, 0));

        let lonely = result.placement(&key(3)).unwrap();
        assert_eq!(lonely.group, LayoutGroup::Detached(1));
        assert!(!main.contains(lonely.pos));
        assert_eq!(result.position(&key(1)), Some(GridPos::new(-2_000_000_000, 0, 0)));
        assert_eq!(result.position(&key(2)), Some(GridPos::new(2_000_000_000, 0, 0)));
    }

    #[test]
    fn test_derived_room_colliding_with_persisted_is_flagged() {
        let rooms = vec![
            Room::new(1, 1).at(0, 0, 0).with_exit(East, key(2)),
            Room::new(1, 2),
            Room::new(1, 3).at(1, 0, 0),
        ];
        let result = auto_layout(&rooms, Some(key(1)));
        assert!(result.placement(&key(2)).unwrap().is_overlapping);
        assert!(result.placement(&key(3)).unwrap().is_overlapping);
        assert_eq!(result.position(&key(3)), Some(GridPos::new(1, 0, 0)));
    }

    #[test]
    fn test_disconnected_room_outside_main_bounds() {
        let mut rooms = grid_world();
        rooms.push(Room::new(1, 100));
        let result = auto_layout(&rooms, Some(key(1)));

        let main = planar_bounds(
            rooms
                .iter()
                .filter(|r| r.key.room_id != 100)
                .map(|r| result.position(&r.key).unwrap()),
        )
        .unwrap();
        let lonely = result.placement(&key(100)).unwrap();
        assert!(!main.contains(lonely.pos));
        assert_eq!(lonely.group, LayoutGroup::Detached(1));
        assert_eq!(result.detached_groups, 1);
        assert_eq!(result.placement(&key(5)).unwrap().group, LayoutGroup::Primary);
    }

    #[test]
    fn test_detached_components_keep_shape_and_do_not_collide() {
        let mut rooms = grid_world();
        // Component A: 20 -east-> 21 (one-way)
        rooms.push(Room::new(1, 20).with_exit(East, key(21)));
        rooms.push(Room::new(1, 21));
        // Component B: 31 only has the incoming edge from 30
        rooms.push(Room::new(1, 30).with_exit(South, key(31)));
        rooms.push(Room::new(1, 31));
        // Component C: single room
        rooms.push(Room::new(1, 40));

        let result = auto_layout(&rooms, Some(key(1)));
        assert_eq!(result.detached_groups, 3);
        assert_eq!(result.conflicts, 0);

        let a0 = result.position(&key(20)).unwrap();
        let a1 = result.position(&key(21)).unwrap();
        assert_eq!(a1, a0.step(East));
        let b0 = result.position(&key(30)).unwrap();
        let b1 = result.position(&key(31)).unwrap();
        assert_eq!(b1, b0.step(South));

        assert_eq!(result.placement(&key(20)).unwrap().group, LayoutGroup::Detached(1));
        assert_eq!(result.placement(&key(31)).unwrap().group, LayoutGroup::Detached(2));
        assert_eq!(result.placement(&key(40)).unwrap().group, LayoutGroup::Detached(3));

        let cells: std::collections::HashSet<_> =
            result.iter().map(|p| p.pos.planar()).collect();
        assert_eq!(cells.len(), rooms.len());
    }

    #[test]
    fn test_layout_is_deterministic() {
        let mut rooms = grid_world();
        rooms.push(Room::new(1, 50).with_exit(West, key(51)));
        rooms.push(Room::new(1, 51));
        rooms.push(Room::new(1, 60));

        let first = auto_layout(&rooms, Some(key(5)));
        let second = auto_layout(&rooms, Some(key(5)));
        let a: Vec<_> = first.iter().copied().collect();
        let b: Vec<_> = second.iter().copied().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_exits_to_unknown_rooms_ignored() {
        let rooms = vec![Room::new(1, 1).with_exit(North, RoomKey::new(99, 1))];
        let result = auto_layout(&rooms, None);
        assert_eq!(result.len(), 1);
        assert_eq!(result.position(&key(1)), Some(GridPos::ORIGIN));
        assert_eq!(result.detached_groups, 0);
    }

    #[test]
    fn test_empty_input() {
        let result = auto_layout(&[], None);
        assert!(result.is_empty());
        assert_eq!(result.detached_groups, 0);
    }
}
