//! Ingestion - wire rows to validated world entities
//!
//! The content API delivers loosely typed rows. This is the only place they
//! are inspected: rows that cannot be identified are rejected, everything
//! else is defaulted, and the engine only ever sees [`WorldData`].

use crate::error::{WorldMapError, WorldMapResult};
use crate::graph::types::{Direction, Exit, GridPos, Room, RoomKey, WorldData, Zone, ZoneId};
use std::collections::HashSet;
use worldmap_types::{RawExit, RawRoom, RawZone, WorldPayload};

/// Outcome of one ingestion pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub world: WorldData,
    pub rejected_zones: usize,
    pub rejected_rooms: usize,
    pub rejected_exits: usize,
    /// Fields replaced by a default (name, sector, bad coordinates, exit zone)
    pub defaulted_fields: usize,
    /// Zones referenced by rooms but absent from the zone list
    pub synthesized_zones: usize,
}

impl IngestReport {
    pub fn has_problems(&self) -> bool {
        self.rejected_zones + self.rejected_rooms + self.rejected_exits > 0
    }
}

/// Validate a whole payload. Never fails; problems are counted and logged.
pub fn ingest_world(payload: WorldPayload) -> IngestReport {
    let mut report = IngestReport::default();

    let mut zones: Vec<Zone> = Vec::with_capacity(payload.zones.len());
    let mut zone_ids: HashSet<ZoneId> = HashSet::new();
    for raw in &payload.zones {
        match validate_zone(raw) {
            Ok((zone, defaulted)) => {
                if zone_ids.insert(zone.id) {
                    report.defaulted_fields += defaulted;
                    zones.push(zone);
                } else {
                    report.rejected_zones += 1;
                }
            }
            Err(e) => {
                tracing::debug!("{}", e);
                report.rejected_zones += 1;
            }
        }
    }

    let mut rooms: Vec<Room> = Vec::with_capacity(payload.rooms.len());
    let mut room_keys: HashSet<RoomKey> = HashSet::new();
    for raw in &payload.rooms {
        match validate_room(raw) {
            Ok(checked) => {
                if !room_keys.insert(checked.room.key) {
                    tracing::debug!("duplicate room {}", checked.room.key);
                    report.rejected_rooms += 1;
                    continue;
                }
                report.defaulted_fields += checked.defaulted;
                report.rejected_exits += checked.rejected_exits;
                rooms.push(checked.room);
            }
            Err(e) => {
                tracing::debug!("{}", e);
                report.rejected_rooms += 1;
            }
        }
    }

    // Zones only known through their rooms
    let mut synthesized: HashSet<ZoneId> = HashSet::new();
    for room in &rooms {
        let zone_id = room.key.zone_id;
        if !zone_ids.contains(&zone_id) && synthesized.insert(zone_id) {
            zones.push(Zone::new(zone_id, format!("Zone {zone_id}")));
        }
    }
    report.synthesized_zones = synthesized.len();

    if report.has_problems() || report.synthesized_zones > 0 {
        tracing::warn!(
            "ingest: {} rooms kept; rejected {} rooms, {} zones, {} exits; {} defaulted fields; {} zones synthesized",
            rooms.len(),
            report.rejected_rooms,
            report.rejected_zones,
            report.rejected_exits,
            report.defaulted_fields,
            report.synthesized_zones
        );
    }

    report.world = WorldData::new(zones, rooms);
    report
}

fn validate_zone(raw: &RawZone) -> WorldMapResult<(Zone, usize)> {
    let id = raw.id().ok_or_else(|| WorldMapError::InvalidRow {
        kind: "zone",
        reason: format!("missing or non-numeric id: {:?}", raw.id),
    })?;
    let mut defaulted = 0;
    let name = match raw.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            defaulted += 1;
            format!("Zone {id}")
        }
    };
    Ok((
        Zone {
            id,
            name,
            climate: raw.climate(),
        },
        defaulted,
    ))
}

/// A room that passed validation, with its repair counts
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedRoom {
    pub room: Room,
    pub defaulted: usize,
    pub rejected_exits: usize,
}

/// Validate one room row
pub fn validate_room(raw: &RawRoom) -> WorldMapResult<CheckedRoom> {
    let room_id = raw.id().ok_or_else(|| WorldMapError::InvalidRow {
        kind: "room",
        reason: format!("missing or non-numeric id: {:?}", raw.id),
    })?;
    let zone_id = raw.zone_id().ok_or_else(|| WorldMapError::InvalidRow {
        kind: "room",
        reason: format!("room {room_id} has no zone id"),
    })?;

    let mut room = Room::new(zone_id, room_id);
    let mut defaulted = 0;

    match raw.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => room.name = name.to_string(),
        _ => defaulted += 1,
    }

    match raw.sector() {
        Some(tag) => room.sector = tag.parse().unwrap_or_default(),
        None => defaulted += 1,
    }

    room.position = grid_position(raw);
    let any_coordinate = raw.layout_x.is_some() || raw.layout_y.is_some();
    if room.position.is_none() && any_coordinate {
        // Partial or malformed triple: let auto-layout place it
        defaulted += 1;
    }

    let mut rejected_exits = 0;
    for raw_exit in raw.exits() {
        match validate_exit(raw_exit, zone_id) {
            Some((exit, zone_defaulted)) => {
                if zone_defaulted {
                    defaulted += 1;
                }
                room.exits.push(exit);
            }
            None => rejected_exits += 1,
        }
    }

    Ok(CheckedRoom {
        room,
        defaulted,
        rejected_exits,
    })
}

fn grid_position(raw: &RawRoom) -> Option<GridPos> {
    let (x, y, z) = raw.layout()?;
    Some(GridPos::new(
        i32::try_from(x).ok()?,
        i32::try_from(y).ok()?,
        i32::try_from(z).ok()?,
    ))
}

/// Exit with a known direction and target; a missing target zone means the
/// exit stays inside the room's own zone.
fn validate_exit(raw: &RawExit, own_zone: ZoneId) -> Option<(Exit, bool)> {
    let direction: Direction = raw.direction()?.parse().ok()?;
    let to_room = raw.to_room_id()?;
    let (to_zone, defaulted) = match raw.to_zone_id() {
        Some(zone) => (zone, false),
        None => (own_zone, true),
    };
    Some((
        Exit {
            direction,
            to: RoomKey::new(to_zone, to_room),
        },
        defaulted,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::Sector;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> WorldPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_clean_payload() {
        let report = ingest_world(payload(json!({
            "zones": [{ "id": 30, "name": "Northern Midgaard", "climate": "temperate" }],
            "rooms": [
                {
                    "id": 3001, "zoneId": 30, "name": "The Temple", "sector": "INSIDE",
                    "layoutX": 0, "layoutY": 0, "layoutZ": 0,
                    "exits": [{ "direction": "north", "toZoneId": 30, "toRoomId": 3002 }]
                },
                { "id": 3002, "zoneId": 30, "name": "Altar", "sector": "inside" }
            ]
        })));

        assert!(!report.has_problems());
        assert_eq!(report.synthesized_zones, 0);
        let temple = &report.world.rooms[0];
        assert_eq!(temple.key, RoomKey::new(30, 3001));
        assert_eq!(temple.position, Some(GridPos::ORIGIN));
        assert_eq!(temple.sector, Sector::Inside);
        assert_eq!(
            temple.exits,
            vec![Exit {
                direction: Direction::North,
                to: RoomKey::new(30, 3002)
            }]
        );
        assert_eq!(report.world.rooms[1].position, None);
        assert_eq!(report.world.zones[0].climate.as_deref(), Some("temperate"));
    }

    #[test]
    fn test_rows_without_identity_rejected() {
        let report = ingest_world(payload(json!({
            "zones": [{ "name": "no id" }],
            "rooms": [
                { "zoneId": 1 },
                { "id": 5 },
                { "id": "abc", "zoneId": 1 },
                { "id": "7", "zoneId": "1" },
                { "id": 7, "zoneId": 1 }
            ]
        })));
        assert_eq!(report.rejected_zones, 1);
        // Three unidentifiable rows plus one duplicate of 1:7
        assert_eq!(report.rejected_rooms, 4);
        assert_eq!(report.world.rooms.len(), 1);
        assert_eq!(report.world.rooms[0].name, "Room 7");
        assert_eq!(report.world.rooms[0].sector, Sector::Unknown);
    }

    #[test]
    fn test_bad_coordinates_become_absent() {
        let report = ingest_world(payload(json!({
            "rooms": [
                { "id": 1, "zoneId": 1, "layoutX": 3, "layoutY": null },
                { "id": 2, "zoneId": 1, "layoutX": "east", "layoutY": 2 },
                { "id": 3, "zoneId": 1, "layoutX": "4", "layoutY": 5.0 },
                { "id": 4, "zoneId": 1, "layoutX": 1, "layoutY": 1, "layoutZ": "up" },
                { "id": 5, "zoneId": 1, "layoutX": 1e12, "layoutY": 1 }
            ]
        })));
        let positions: Vec<_> = report.world.rooms.iter().map(|r| r.position).collect();
        assert_eq!(
            positions,
            vec![None, None, Some(GridPos::new(4, 5, 0)), None, None]
        );
    }

    #[test]
    fn test_exit_validation() {
        let report = ingest_world(payload(json!({
            "rooms": [{
                "id": 1, "zoneId": 2,
                "exits": [
                    { "direction": 1, "toRoomId": 2 },
                    { "direction": "sideways", "toRoomId": 3 },
                    { "direction": "s" },
                    { "direction": "UP", "toZoneId": 9, "toRoomId": 4 }
                ]
            }]
        })));
        assert_eq!(report.rejected_exits, 2);
        let exits = &report.world.rooms[0].exits;
        assert_eq!(exits.len(), 2);
        assert_eq!(exits[0].direction, Direction::East);
        assert_eq!(exits[0].to, RoomKey::new(2, 2));
        assert_eq!(exits[1].direction, Direction::Up);
        assert_eq!(exits[1].to, RoomKey::new(9, 4));
    }

    #[test]
    fn test_missing_zones_synthesized() {
        let report = ingest_world(payload(json!({
            "zones": [{ "id": 1, "name": "Known" }],
            "rooms": [
                { "id": 1, "zoneId": 1 },
                { "id": 2, "zoneId": 8 },
                { "id": 3, "zoneId": 8 }
            ]
        })));
        assert_eq!(report.synthesized_zones, 1);
        let names: Vec<_> = report.world.zones.iter().map(|z| z.name.as_str()).collect();
        assert_eq!(names, vec!["Known", "Zone 8"]);
    }

    #[test]
    fn test_numeric_sector_codes() {
        let legacy_order = [
            Sector::Inside,
            Sector::City,
            Sector::Field,
            Sector::Forest,
            Sector::Hills,
            Sector::Mountain,
            Sector::WaterSwim,
            Sector::WaterNoSwim,
            Sector::Underwater,
            Sector::Flying,
            Sector::Desert,
            Sector::Road,
        ];
        for (code, sector) in legacy_order.into_iter().enumerate() {
            let report = ingest_world(payload(json!({
                "rooms": [{ "id": 1, "zoneId": 1, "sector": code }]
            })));
            assert_eq!(report.world.rooms[0].sector, sector);
        }
    }

    #[test]
    fn test_invalid_row_error() {
        let err = validate_room(&RawRoom::default()).unwrap_err();
        assert!(matches!(err, WorldMapError::InvalidRow { kind: "room", .. }));
    }
}
