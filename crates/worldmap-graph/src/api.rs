//! API client for world data
//!
//! Uses shared wire types from worldmap-types for API responses.
//! Uses web-sys fetch for WASM, reqwest for native.

use serde::de::DeserializeOwned;

use crate::error::{WorldMapError, WorldMapResult};
use worldmap_types::{RawRoom, RawZone, WorldPayload};

pub const ZONES_PATH: &str = "/api/world/zones";
pub const ROOMS_PATH: &str = "/api/world/rooms";

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> WorldMapResult<T> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Request, RequestInit, RequestMode, Response};

        let url = self.url(path);

        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(&url, &opts)
            .map_err(|e| WorldMapError::Fetch(format!("request error: {:?}", e)))?;

        let window = web_sys::window().ok_or_else(|| WorldMapError::Fetch("no window".into()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| WorldMapError::Fetch(format!("{:?}", e)))?;

        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| WorldMapError::Fetch("response is not a Response".into()))?;

        if !resp.ok() {
            return Err(WorldMapError::Http(resp.status()));
        }

        let json = JsFuture::from(
            resp.json()
                .map_err(|e| WorldMapError::Decode(format!("json promise error: {:?}", e)))?,
        )
        .await
        .map_err(|e| WorldMapError::Decode(format!("{:?}", e)))?;

        serde_wasm_bindgen::from_value(json).map_err(|e| WorldMapError::Decode(e.to_string()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> WorldMapResult<T> {
        let url = self.url(path);

        let response = reqwest::get(&url)
            .await
            .map_err(|e| WorldMapError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WorldMapError::Http(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WorldMapError::Decode(e.to_string()))
    }

    /// Fetch every zone and every room
    pub async fn get_world(&self) -> WorldMapResult<WorldPayload> {
        let zones: Vec<RawZone> = self.get(ZONES_PATH).await?;
        let rooms: Vec<RawRoom> = self.get(ROOMS_PATH).await?;
        tracing::debug!(
            "fetched {} zones, {} rooms from {}",
            zones.len(),
            rooms.len(),
            self.base_url
        );
        Ok(WorldPayload { zones, rooms })
    }
}
