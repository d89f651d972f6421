//! Validated world entities
//!
//! Everything in here has already passed ingestion: ids are present,
//! coordinates are either complete or absent, directions are known.

use std::fmt;
use std::str::FromStr;

pub type ZoneId = i64;
pub type RoomId = i64;

// =============================================================================
// IDENTITY
// =============================================================================

/// Room identity: rooms are addressed by (zone, room)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomKey {
    pub zone_id: ZoneId,
    pub room_id: RoomId,
}

impl RoomKey {
    pub fn new(zone_id: ZoneId, room_id: RoomId) -> Self {
        Self { zone_id, room_id }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.zone_id, self.room_id)
    }
}

// =============================================================================
// GRID
// =============================================================================

/// Integer layout coordinate (grid cells, not pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub const ORIGIN: GridPos = GridPos { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Neighbouring cell one step in `direction`; saturates at the grid edge
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy, dz) = direction.vector();
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.z.saturating_add(dz),
        )
    }

    /// Planar shift; deltas are wide so offsets spanning the whole grid fit.
    /// Results clamp to the `i32` range.
    pub fn translate(self, dx: i64, dy: i64) -> Self {
        let shift = |v: i32, d: i64| {
            (i64::from(v) + d).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        };
        Self::new(shift(self.x, dx), shift(self.y, dy), self.z)
    }

    /// Planar cell, ignoring level (what the 2-D map actually draws)
    pub fn planar(self) -> (i32, i32) {
        (self.x, self.y)
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Direction {
    /// Unit step on the grid. North is screen-up (y - 1).
    pub fn vector(self) -> (i32, i32, i32) {
        match self {
            Direction::North => (0, -1, 0),
            Direction::East => (1, 0, 0),
            Direction::South => (0, 1, 0),
            Direction::West => (-1, 0, 0),
            Direction::Up => (0, 0, 1),
            Direction::Down => (0, 0, -1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Legacy world-file exit index (0 = north … 5 = down)
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Direction::North),
            1 => Some(Direction::East),
            2 => Some(Direction::South),
            3 => Some(Direction::West),
            4 => Some(Direction::Up),
            5 => Some(Direction::Down),
            _ => None,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<i64>() {
            return Self::from_index(index).ok_or_else(|| format!("unknown direction {s}"));
        }
        match s.to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "east" | "e" => Ok(Direction::East),
            "south" | "s" => Ok(Direction::South),
            "west" | "w" => Ok(Direction::West),
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            _ => Err(format!("unknown direction {s}")),
        }
    }
}

// =============================================================================
// SECTOR
// =============================================================================

/// Terrain tag of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Sector {
    Inside,
    City,
    Field,
    Forest,
    Hills,
    Mountain,
    WaterSwim,
    WaterNoSwim,
    Underwater,
    Flying,
    Desert,
    Road,
    #[default]
    Unknown,
}

impl Sector {
    /// Legacy numeric sector code
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Sector::Inside,
            1 => Sector::City,
            2 => Sector::Field,
            3 => Sector::Forest,
            4 => Sector::Hills,
            5 => Sector::Mountain,
            6 => Sector::WaterSwim,
            7 => Sector::WaterNoSwim,
            8 => Sector::Underwater,
            9 => Sector::Flying,
            10 => Sector::Desert,
            11 => Sector::Road,
            _ => Sector::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Inside => "inside",
            Sector::City => "city",
            Sector::Field => "field",
            Sector::Forest => "forest",
            Sector::Hills => "hills",
            Sector::Mountain => "mountain",
            Sector::WaterSwim => "water_swim",
            Sector::WaterNoSwim => "water_noswim",
            Sector::Underwater => "underwater",
            Sector::Flying => "flying",
            Sector::Desert => "desert",
            Sector::Road => "road",
            Sector::Unknown => "unknown",
        }
    }
}

impl FromStr for Sector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i64>() {
            return Ok(Self::from_code(code));
        }
        Ok(
            match s.to_uppercase().replace(['-', ' '], "_").as_str() {
                "INSIDE" | "INDOORS" => Self::Inside,
                "CITY" | "TOWN" => Self::City,
                "FIELD" | "PLAINS" => Self::Field,
                "FOREST" => Self::Forest,
                "HILLS" => Self::Hills,
                "MOUNTAIN" | "MOUNTAINS" => Self::Mountain,
                "WATER_SWIM" | "SHALLOW_WATER" => Self::WaterSwim,
                "WATER_NOSWIM" | "WATER_NO_SWIM" | "DEEP_WATER" => Self::WaterNoSwim,
                "UNDERWATER" => Self::Underwater,
                "FLYING" | "AIR" => Self::Flying,
                "DESERT" => Self::Desert,
                "ROAD" => Self::Road,
                _ => Self::Unknown,
            },
        )
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub direction: Direction,
    pub to: RoomKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub key: RoomKey,
    pub name: String,
    pub sector: Sector,
    /// Persisted layout coordinate; `None` until auto-layout derives one
    pub position: Option<GridPos>,
    pub exits: Vec<Exit>,
}

impl Room {
    pub fn new(zone_id: ZoneId, room_id: RoomId) -> Self {
        Self {
            key: RoomKey::new(zone_id, room_id),
            name: format!("Room {room_id}"),
            sector: Sector::Unknown,
            position: None,
            exits: Vec::new(),
        }
    }

    pub fn at(mut self, x: i32, y: i32, z: i32) -> Self {
        self.position = Some(GridPos::new(x, y, z));
        self
    }

    pub fn with_exit(mut self, direction: Direction, to: RoomKey) -> Self {
        self.exits.push(Exit { direction, to });
        self
    }

    pub fn with_sector(mut self, sector: Sector) -> Self {
        self.sector = sector;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub climate: Option<String>,
}

impl Zone {
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            climate: None,
        }
    }
}

/// The validated world as handed to the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldData {
    pub zones: Vec<Zone>,
    pub rooms: Vec<Room>,
}

impl WorldData {
    pub fn new(zones: Vec<Zone>, rooms: Vec<Room>) -> Self {
        Self { zones, rooms }
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
