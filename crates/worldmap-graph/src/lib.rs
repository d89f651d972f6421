//! World Map Graph Widget
//!
//! Zoomable, pannable map of a MUD world: zones and their rooms on a grid.
//! This crate owns the engine, the egui widget and the data loading seam;
//! the host decides what a zone click means.

pub mod api;
pub mod bridge;
pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod loader;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use api::ApiClient;
pub use bridge::JsBridge;
pub use config::{LayerToggles, MapConfig};
pub use error::{WorldMapError, WorldMapResult};
pub use graph::{
    // Core types
    Direction,
    GridPos,
    // Host surface
    MapEvent,
    Room,
    RoomKey,
    Sector,
    ViewMode,
    ViewportController,
    WorldData,
    WorldMapWidget,
    WorldModel,
    Zone,
};
pub use ingest::{ingest_world, IngestReport};
pub use loader::{load_world, LoadedWorld, WorldSource};
