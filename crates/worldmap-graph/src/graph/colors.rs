//! Color palettes for the world map
//!
//! Terrain colors for room glyphs, dominant-sector zone tints and a stable
//! hash hue for zones whose terrain is unknown.

use egui::ecolor::Hsva;
use egui::Color32;

use super::types::{Sector, ZoneId};

// =============================================================================
// FRAME
// =============================================================================

pub const BACKGROUND: Color32 = Color32::from_rgb(14, 17, 23);
pub const LABEL_TEXT: Color32 = Color32::from_rgb(230, 232, 236);
pub const LABEL_PLATE: Color32 = Color32::from_rgba_premultiplied(10, 12, 16, 200);
pub const TOOLTIP_PLATE: Color32 = Color32::from_rgba_premultiplied(24, 28, 36, 235);
pub const OVERLAP_RING: Color32 = Color32::from_rgb(239, 68, 68);
pub const EXIT_LINE: Color32 = Color32::from_rgb(120, 130, 150);
pub const HOVER_OUTLINE: Color32 = Color32::from_rgb(250, 204, 21);

// =============================================================================
// TERRAIN
// =============================================================================

/// Base color for a terrain tag; `None` for unknown terrain
pub fn sector_color(sector: Sector) -> Option<Color32> {
    let color = match sector {
        Sector::Inside => Color32::from_rgb(161, 136, 127), // Warm grey
        Sector::City => Color32::from_rgb(176, 190, 197),   // Slate
        Sector::Field => Color32::from_rgb(139, 195, 74),   // Light green
        Sector::Forest => Color32::from_rgb(46, 125, 50),   // Dark green
        Sector::Hills => Color32::from_rgb(141, 110, 99),   // Brown
        Sector::Mountain => Color32::from_rgb(120, 120, 130),
        Sector::WaterSwim => Color32::from_rgb(79, 195, 247), // Light blue
        Sector::WaterNoSwim => Color32::from_rgb(25, 118, 210), // Deep blue
        Sector::Underwater => Color32::from_rgb(13, 71, 161),
        Sector::Flying => Color32::from_rgb(225, 245, 254), // Sky
        Sector::Desert => Color32::from_rgb(255, 213, 79),  // Sand
        Sector::Road => Color32::from_rgb(188, 170, 164),
        Sector::Unknown => return None,
    };
    Some(color)
}

/// Glyph base color: terrain, or neutral grey when unknown
pub fn terrain_color(sector: Sector) -> Color32 {
    sector_color(sector).unwrap_or(Color32::from_rgb(110, 110, 110))
}

// =============================================================================
// ZONES
// =============================================================================

/// Most frequent known terrain; ties go to the first one encountered.
pub fn dominant_sector(sectors: impl IntoIterator<Item = Sector>) -> Option<Sector> {
    // (sector, count) in first-seen order; at most 12 distinct entries
    let mut counts: Vec<(Sector, usize)> = Vec::new();
    for sector in sectors {
        if sector == Sector::Unknown {
            continue;
        }
        match counts.iter_mut().find(|(s, _)| *s == sector) {
            Some((_, n)) => *n += 1,
            None => counts.push((sector, 1)),
        }
    }
    let mut best: Option<(Sector, usize)> = None;
    for (sector, n) in counts {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((sector, n));
        }
    }
    best.map(|(s, _)| s)
}

/// Stable hue in `[0, 1)` for a zone id (FNV-1a over the id bytes)
pub fn zone_hue(zone_id: ZoneId) -> f32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in zone_id.to_le_bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    (hash % 360) as f32 / 360.0
}

/// Zone tint: dominant terrain color, else the zone's hash hue
pub fn zone_color(zone_id: ZoneId, dominant: Option<Sector>) -> Color32 {
    dominant
        .and_then(sector_color)
        .unwrap_or_else(|| Hsva::new(zone_hue(zone_id), 0.55, 0.8, 1.0).into())
}

// =============================================================================
// HELPERS
// =============================================================================

/// Scale a color's alpha (and premultiplied channels) by `opacity`
pub fn apply_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

/// Linear blend in gamma space, `t = 0` gives `a`
pub fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_premultiplied(
        mix(a.r(), b.r()),
        mix(a.g(), b.g()),
        mix(a.b(), b.b()),
        mix(a.a(), b.a()),
    )
}
