//! World loading
//!
//! A [`WorldSource`] delivers raw rows; [`load_world`] fetches, ingests and
//! reports loading state to the host. Failures never escape: they are logged
//! and the host receives an empty world.

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::error::{WorldMapError, WorldMapResult};
use crate::graph::controller::MapEvent;
use crate::graph::types::WorldData;
use crate::ingest::{ingest_world, IngestReport};
use worldmap_types::WorldPayload;

/// Anything that can produce the full set of zones and rooms
#[async_trait(?Send)]
pub trait WorldSource {
    /// Short label for logs
    fn describe(&self) -> String;

    async fn fetch_world(&self) -> WorldMapResult<WorldPayload>;
}

#[async_trait(?Send)]
impl WorldSource for ApiClient {
    fn describe(&self) -> String {
        self.base_url().to_string()
    }

    async fn fetch_world(&self) -> WorldMapResult<WorldPayload> {
        self.get_world().await
    }
}

/// JSON file holding a `{ "zones": [...], "rooms": [...] }` payload
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileSource {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl WorldSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_world(&self) -> WorldMapResult<WorldPayload> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| WorldMapError::Fetch(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&text).map_err(|e| WorldMapError::Decode(e.to_string()))
    }
}

/// Result of one load
#[derive(Debug, Clone, Default)]
pub struct LoadedWorld {
    pub data: WorldData,
    /// Row-level problems found during ingestion (zeroed on failure)
    pub rejected_rooms: usize,
    pub rejected_exits: usize,
    pub error: Option<WorldMapError>,
}

impl LoadedWorld {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Fetch and ingest a world.
///
/// `emit` receives `LoadingChanged(true)` before the fetch starts and
/// `LoadingChanged(false)` once it has finished, on every path.
pub async fn load_world<S, F>(source: &S, mut emit: F) -> LoadedWorld
where
    S: WorldSource + ?Sized,
    F: FnMut(MapEvent),
{
    emit(MapEvent::LoadingChanged(true));
    tracing::info!("loading world from {}", source.describe());

    let result = fetch_and_ingest(source).await;
    emit(MapEvent::LoadingChanged(false));

    match result {
        Ok(report) => LoadedWorld {
            rejected_rooms: report.rejected_rooms,
            rejected_exits: report.rejected_exits,
            data: report.world,
            error: None,
        },
        Err(e) => {
            match &e {
                WorldMapError::EmptyWorld => {
                    tracing::warn!("{} returned no usable rooms", source.describe())
                }
                _ => tracing::error!("failed to load world from {}: {}", source.describe(), e),
            }
            LoadedWorld {
                error: Some(e),
                ..LoadedWorld::default()
            }
        }
    }
}

async fn fetch_and_ingest<S: WorldSource + ?Sized>(source: &S) -> WorldMapResult<IngestReport> {
    let payload = source.fetch_world().await?;
    let report = ingest_world(payload);
    if report.world.rooms.is_empty() {
        return Err(WorldMapError::EmptyWorld);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct FakeSource(WorldMapResult<serde_json::Value>);

    #[async_trait(?Send)]
    impl WorldSource for FakeSource {
        fn describe(&self) -> String {
            "fake".into()
        }

        async fn fetch_world(&self) -> WorldMapResult<WorldPayload> {
            match &self.0 {
                Ok(value) => serde_json::from_value(value.clone())
                    .map_err(|e| WorldMapError::Decode(e.to_string())),
                Err(e) => Err(e.clone()),
            }
        }
    }

    fn run(source: &FakeSource) -> (LoadedWorld, Vec<MapEvent>) {
        let mut events = Vec::new();
        let loaded = pollster::block_on(load_world(source, |e| events.push(e)));
        (loaded, events)
    }

    #[test]
    fn test_successful_load() {
        let source = FakeSource(Ok(json!({
            "zones": [{ "id": 1, "name": "Midgaard" }],
            "rooms": [
                { "id": 10, "zoneId": 1, "exits": [{ "direction": "nowhere", "toRoomId": 11 }] },
                { "zoneId": 1 }
            ]
        })));
        let (loaded, events) = run(&source);
        assert!(loaded.is_ok());
        assert_eq!(loaded.data.rooms.len(), 1);
        assert_eq!(loaded.rejected_rooms, 1);
        assert_eq!(loaded.rejected_exits, 1);
        assert_eq!(
            events,
            vec![MapEvent::LoadingChanged(true), MapEvent::LoadingChanged(false)]
        );
    }

    #[test]
    fn test_fetch_failure_yields_empty_world() {
        let (loaded, events) = run(&FakeSource(Err(WorldMapError::Http(502))));
        assert!(loaded.data.is_empty());
        assert!(matches!(loaded.error, Some(WorldMapError::Http(502))));
        assert_eq!(
            events,
            vec![MapEvent::LoadingChanged(true), MapEvent::LoadingChanged(false)]
        );
    }

    #[test]
    fn test_no_rooms_is_empty_world_error() {
        let (loaded, events) = run(&FakeSource(Ok(json!({ "zones": [{ "id": 1 }] }))));
        assert!(matches!(loaded.error, Some(WorldMapError::EmptyWorld)));
        assert!(loaded.data.is_empty());
        assert_eq!(events.last(), Some(&MapEvent::LoadingChanged(false)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_source_missing_file() {
        let source = FileSource::new("/nonexistent/world.json");
        let mut events = Vec::new();
        let loaded = pollster::block_on(load_world(&source, |e| events.push(e)));
        assert!(matches!(loaded.error, Some(WorldMapError::Fetch(_))));
        assert_eq!(events.len(), 2);
    }
}
