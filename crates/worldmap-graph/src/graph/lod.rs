//! View-mode state machine
//!
//! Maps continuous zoom to one of three detail modes. Thresholds depend on
//! the current mode, so a zoom hovering near a boundary does not flap:
//!
//! | from         | to WorldMap | to ZoneOverview | to RoomDetail |
//! |--------------|-------------|-----------------|---------------|
//! | WorldMap     | -           | zoom ≥ 0.25     | zoom ≥ 1.2    |
//! | ZoneOverview | zoom < 0.05 | -               | zoom ≥ 1.2    |
//! | RoomDetail   | zoom < 0.1  | zoom < 1.2      | -             |
//!
//! Commits are debounced (a candidate must hold for [`COMMIT_DELAY_SECS`])
//! and, during continuous interaction, evaluated at most once per
//! [`EVAL_INTERVAL_SECS`].

/// Candidate must be stable this long before it is committed
pub const COMMIT_DELAY_SECS: f64 = 0.1;

/// Minimum spacing between evaluations while the user is interacting
pub const EVAL_INTERVAL_SECS: f64 = 0.3;

const ENTER_ZONE_OVERVIEW: f32 = 0.25;
const ENTER_ROOM_DETAIL: f32 = 1.2;
const LEAVE_ZONE_OVERVIEW: f32 = 0.05;
const LEAVE_ROOM_DETAIL_TO_WORLD: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    /// Zone aggregates only
    #[default]
    WorldMap,
    /// Zones with their room glyphs
    ZoneOverview,
    /// Full room glyphs with exits and names
    RoomDetail,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::WorldMap => "World",
            ViewMode::ZoneOverview => "Zones",
            ViewMode::RoomDetail => "Rooms",
        }
    }
}

/// Transition function: next mode for `zoom` given the `current` mode
pub fn next_mode(zoom: f32, current: ViewMode) -> ViewMode {
    match current {
        ViewMode::WorldMap => {
            if zoom >= ENTER_ROOM_DETAIL {
                ViewMode::RoomDetail
            } else if zoom >= ENTER_ZONE_OVERVIEW {
                ViewMode::ZoneOverview
            } else {
                ViewMode::WorldMap
            }
        }
        ViewMode::ZoneOverview => {
            if zoom < LEAVE_ZONE_OVERVIEW {
                ViewMode::WorldMap
            } else if zoom >= ENTER_ROOM_DETAIL {
                ViewMode::RoomDetail
            } else {
                ViewMode::ZoneOverview
            }
        }
        ViewMode::RoomDetail => {
            if zoom < LEAVE_ROOM_DETAIL_TO_WORLD {
                ViewMode::WorldMap
            } else if zoom < ENTER_ROOM_DETAIL {
                ViewMode::ZoneOverview
            } else {
                ViewMode::RoomDetail
            }
        }
    }
}

/// Mode reached from a fresh start (WorldMap) at `zoom`
pub fn settle(zoom: f32) -> ViewMode {
    next_mode(zoom, ViewMode::WorldMap)
}

/// Debounced, throttled wrapper around [`next_mode`]
#[derive(Debug, Clone, Default)]
pub struct ViewModeMachine {
    current: ViewMode,
    /// Candidate mode and the time it first appeared
    pending: Option<(ViewMode, f64)>,
    last_eval: Option<f64>,
}

impl ViewModeMachine {
    pub fn new(initial: ViewMode) -> Self {
        Self {
            current: initial,
            ..Default::default()
        }
    }

    pub fn current(&self) -> ViewMode {
        self.current
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Jump straight to the settled mode for `zoom` (new world, refit)
    pub fn reset(&mut self, zoom: f32) {
        self.current = settle(zoom);
        self.pending = None;
        self.last_eval = None;
    }

    /// Feed the latest zoom. Returns the newly committed mode, if any.
    pub fn observe(&mut self, zoom: f32, now: f64, interacting: bool) -> Option<ViewMode> {
        let throttled = interacting
            && self
                .last_eval
                .is_some_and(|last| now - last < EVAL_INTERVAL_SECS);

        if !throttled {
            self.last_eval = Some(now);
            let candidate = next_mode(zoom, self.current);
            if candidate == self.current {
                self.pending = None;
            } else if self.pending.map(|(mode, _)| mode) != Some(candidate) {
                self.pending = Some((candidate, now));
            }
        }

        match self.pending {
            Some((mode, since)) if now - since >= COMMIT_DELAY_SECS => {
                self.current = mode;
                self.pending = None;
                tracing::debug!("view mode -> {:?} at zoom {:.3}", mode, zoom);
                Some(mode)
            }
            _ => None,
        }
    }
}
