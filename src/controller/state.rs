//! Ephemeral controller state.
//!
//! Everything here is invalidated by `bind()` and `reset()`. Both the
//! command API and the surface event pump mutate this bag, so every
//! transition re-checks these guards to decide whether an event is still
//! relevant.

use crate::core::camera::Padding;
use crate::core::geo::GeoPoint;
use crate::surface::MapSurface;
use std::sync::Arc;
use tokio::task::AbortHandle;

/// Set when the controller itself initiates a move; cleared on idle or on a
/// user gesture. Distinguishes "our idle" from "the user's idle", which the
/// engine reports identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgrammaticTarget {
    pub target: GeoPoint,
    pub zoom: f64,
}

/// At most one pending recenter, created when a padding update arrives while
/// a programmatic animation is in flight. Replayed on the next idle event,
/// then discarded. A second padding update replaces it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedRecenter {
    pub target: GeoPoint,
    pub zoom: f64,
}

pub(crate) struct ControllerState {
    pub surface: Option<Arc<dyn MapSurface>>,
    /// dp-to-px scale delivered by `bind()`
    pub density: f64,
    /// Viewport size in physical pixels; feeds the bounds-inset clamp
    pub map_size: Option<(f64, f64)>,
    pub programmatic: Option<ProgrammaticTarget>,
    pub queued_recenter: Option<QueuedRecenter>,
    /// Padding the UI wants
    pub desired_padding: Padding,
    /// Padding the surface currently renders with
    pub applied_padding: Padding,
    /// Next idle event is a padding sync; skip the marker republish
    pub silent_padding_sync: bool,
    /// The engine reported motion that has not settled yet
    pub surface_moving: bool,
    /// The single outstanding animation task
    pub animation: Option<AbortHandle>,
    /// Surface event pump, one per bind
    pub pump: Option<AbortHandle>,
}

impl ControllerState {
    pub fn new() -> Self {
        Self {
            surface: None,
            density: 1.0,
            map_size: None,
            programmatic: None,
            queued_recenter: None,
            desired_padding: Padding::ZERO,
            applied_padding: Padding::ZERO,
            silent_padding_sync: false,
            surface_moving: false,
            animation: None,
            pump: None,
        }
    }

    /// Aborts the outstanding animation task, if any. Cancellation is
    /// expected control flow: the superseded task stops at its suspension
    /// point inside the surface primitive.
    pub fn cancel_animation(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.abort();
        }
    }

    pub fn cancel_pump(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }

    /// Drops every per-binding ephemeral so stale events from a previous
    /// surface can never drive the state machine.
    pub fn invalidate(&mut self) {
        self.cancel_animation();
        self.cancel_pump();
        self.programmatic = None;
        self.queued_recenter = None;
        self.silent_padding_sync = false;
        self.surface_moving = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_clears_guards() {
        let mut state = ControllerState::new();
        state.programmatic = Some(ProgrammaticTarget {
            target: GeoPoint::new(41.31, 69.28),
            zoom: 15.0,
        });
        state.queued_recenter = Some(QueuedRecenter {
            target: GeoPoint::new(41.32, 69.29),
            zoom: 16.0,
        });
        state.silent_padding_sync = true;
        state.surface_moving = true;

        state.invalidate();

        assert!(state.programmatic.is_none());
        assert!(state.queued_recenter.is_none());
        assert!(!state.silent_padding_sync);
        assert!(!state.surface_moving);
        assert!(state.animation.is_none());
        assert!(state.pump.is_none());
    }
}
