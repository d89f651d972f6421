//! Shared wire types for the world map
//!
//! This crate is the SINGLE SOURCE OF TRUTH for the data crossing the
//! boundary between the content database and the map engine.
//!
//! ## Boundary
//!
//! ```text
//! ┌──────────────────┐         ┌──────────────────┐
//! │  Content API     │  JSON   │  Map engine      │
//! │  (zones, rooms)  │ ──────► │  (egui)          │
//! └──────────────────┘         └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Everything here is lenient: rows are accepted as the API sends them.
//!    Validation happens once, at ingestion, in the engine.
//! 2. Field names are camelCase on the wire.
//! 3. Numeric ids and coordinates may arrive as numbers or numeric strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// ZONES
// ============================================================================

/// Zone row as delivered by the content API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawZone {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub climate: Option<Value>,
}

impl RawZone {
    /// Zone id, if present and integral
    pub fn id(&self) -> Option<i64> {
        self.id.as_ref().and_then(value_as_i64)
    }

    /// Climate tag rendered as a string (numbers are stringified)
    pub fn climate(&self) -> Option<String> {
        self.climate.as_ref().and_then(value_as_tag)
    }
}

// ============================================================================
// ROOMS
// ============================================================================

/// Room row as delivered by the content API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoom {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub zone_id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub layout_x: Option<Value>,
    #[serde(default)]
    pub layout_y: Option<Value>,
    #[serde(default)]
    pub layout_z: Option<Value>,
    /// Terrain tag - name ("forest") or numeric sector code
    #[serde(default)]
    pub sector: Option<Value>,
    #[serde(default)]
    pub exits: Option<Vec<RawExit>>,
}

impl RawRoom {
    pub fn id(&self) -> Option<i64> {
        self.id.as_ref().and_then(value_as_i64)
    }

    pub fn zone_id(&self) -> Option<i64> {
        self.zone_id.as_ref().and_then(value_as_i64)
    }

    /// Persisted layout triple. Returns `None` unless x and y are both valid;
    /// a missing z defaults to ground level.
    pub fn layout(&self) -> Option<(i64, i64, i64)> {
        let x = self.layout_x.as_ref().and_then(value_as_i64)?;
        let y = self.layout_y.as_ref().and_then(value_as_i64)?;
        let z = match self.layout_z.as_ref() {
            None | Some(Value::Null) => 0,
            Some(v) => value_as_i64(v)?,
        };
        Some((x, y, z))
    }

    pub fn sector(&self) -> Option<String> {
        self.sector.as_ref().and_then(value_as_tag)
    }

    pub fn exits(&self) -> &[RawExit] {
        self.exits.as_deref().unwrap_or(&[])
    }
}

/// Exit row nested in a room
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExit {
    /// Direction name ("north", "n") or numeric index (0 = north)
    #[serde(default)]
    pub direction: Option<Value>,
    #[serde(default)]
    pub to_zone_id: Option<Value>,
    #[serde(default)]
    pub to_room_id: Option<Value>,
}

impl RawExit {
    pub fn direction(&self) -> Option<String> {
        self.direction.as_ref().and_then(value_as_tag)
    }

    pub fn to_zone_id(&self) -> Option<i64> {
        self.to_zone_id.as_ref().and_then(value_as_i64)
    }

    pub fn to_room_id(&self) -> Option<i64> {
        self.to_room_id.as_ref().and_then(value_as_i64)
    }
}

// ============================================================================
// PAYLOAD
// ============================================================================

/// Complete world read: all zones and all rooms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldPayload {
    #[serde(default)]
    pub zones: Vec<RawZone>,
    #[serde(default)]
    pub rooms: Vec<RawRoom>,
}

impl WorldPayload {
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty() && self.rooms.is_empty()
    }
}

// ============================================================================
// LENIENT VALUE HELPERS
// ============================================================================

/// Interpret a JSON value as an integer.
///
/// Accepts integers, integral floats and numeric strings. Rejects
/// fractional, non-finite and non-numeric values.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Interpret a JSON value as a free-form tag (strings as-is, numbers stringified)
pub fn value_as_tag(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
