//! JS Bridge for WASM → host page notifications
//!
//! Map events are re-dispatched as CustomEvents on `window` so the page
//! hosting the canvas can navigate (open a zone) or show a spinner.
//! On native builds events are only logged.

use crate::graph::controller::MapEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use web_sys::{CustomEvent, CustomEventInit, Window};

pub const ZONE_CLICKED_EVENT: &str = "worldmap-zone-clicked";
pub const LOADING_EVENT: &str = "worldmap-loading";
pub const VIEW_MODE_EVENT: &str = "worldmap-view-mode";
pub const READY_EVENT: &str = "worldmap-ready";

/// Event name and detail payload for a map event
pub fn event_payload(event: &MapEvent) -> (&'static str, String) {
    match event {
        MapEvent::ZoneClicked(zone_id) => (ZONE_CLICKED_EVENT, zone_id.to_string()),
        MapEvent::LoadingChanged(loading) => (LOADING_EVENT, loading.to_string()),
        MapEvent::ViewModeChanged(mode) => (VIEW_MODE_EVENT, mode.label().to_string()),
    }
}

/// Bridge between the map and the page hosting it
pub struct JsBridge {
    #[cfg(target_arch = "wasm32")]
    window: Option<Window>,
}

impl JsBridge {
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let window = web_sys::window();
            if window.is_none() {
                tracing::warn!("JsBridge: no window, events will be dropped");
            }
            Self { window }
        }

        #[cfg(not(target_arch = "wasm32"))]
        Self {}
    }

    /// Forward one map event to the host
    pub fn emit(&self, event: &MapEvent) {
        let (name, detail) = event_payload(event);

        #[cfg(target_arch = "wasm32")]
        {
            let Some(window) = &self.window else {
                return;
            };
            let init = CustomEventInit::new();
            init.set_detail(&JsValue::from_str(&detail));
            if let Ok(event) = CustomEvent::new_with_event_init_dict(name, &init) {
                let _ = window.dispatch_event(&event);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tracing::debug!("{}: {}", name, detail);
        }
    }

    /// Map is mounted and listening
    pub fn emit_ready(&self) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = &self.window {
                if let Ok(event) = CustomEvent::new(READY_EVENT) {
                    let _ = window.dispatch_event(&event);
                }
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tracing::debug!("{}", READY_EVENT);
        }
    }
}

impl Default for JsBridge {
    fn default() -> Self {
        Self::new()
    }
}
