//! Native map surface contract
//!
//! Two structurally different map engines sit behind one trait: the
//! controller's state machine is written once against [`MapSurface`], and
//! only the adapters in [`gl`] and [`tile`] are engine-specific. Engine
//! callbacks are bridged into a broadcast stream so the controller can
//! consume them as messages rather than re-entrant callbacks.

pub mod gl;
pub mod tile;

use crate::core::camera::{CameraPosition, CameraUpdate, Padding};
use crate::core::geo::GeoBounds;
use async_trait::async_trait;
use std::any::Any;
use std::time::Duration;
use tokio::sync::broadcast;

pub use gl::{GlCall, GlMapHandle, GlSurface};
pub use tile::{TileCall, TileMapHandle, TileSurface};

/// Why the camera is about to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveReason {
    /// A touch gesture owns the camera
    UserGesture,
    /// Application code issued a camera command
    Application,
}

/// Events reported by the live camera object. The engine reports `Idle`
/// identically for gesture- and command-driven motion; attribution is the
/// controller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    WillMove { reason: MoveReason },
    Idle,
}

/// The underlying map engine's live camera object.
///
/// `animate_to`, `jump_to` and `animate_to_bounds` suspend until the engine
/// reports that the motion settled; cancelling the calling task abandons the
/// wait and leaves the engine camera wherever the next idle event finds it.
#[async_trait]
pub trait MapSurface: Send + Sync {
    /// Current live camera pose
    fn pose(&self) -> CameraPosition;

    /// Instantaneous move; still produces an idle event
    async fn jump_to(&self, update: CameraUpdate) -> crate::Result<()>;

    /// Eased move over `duration`
    async fn animate_to(&self, update: CameraUpdate, duration: Duration) -> crate::Result<()>;

    /// Frames `bounds` within the viewport minus `inset` (physical pixels).
    /// `duration` of `None` jumps instead of easing.
    async fn animate_to_bounds(
        &self,
        bounds: GeoBounds,
        inset: Padding,
        duration: Option<Duration>,
    ) -> crate::Result<()>;

    /// Padding-only camera update; target and zoom are left untouched
    async fn apply_padding(&self, padding: Padding) -> crate::Result<()>;

    /// Interrupts any in-flight native animation
    fn stop(&self);

    /// Stream of gesture/idle events from the engine
    fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent>;

    fn as_any(&self) -> &dyn Any;
}

impl dyn MapSurface {
    /// Engine-specific accessor. Panics when this surface is backed by the
    /// other engine: that is a wiring error, not a runtime condition.
    pub fn as_gl(&self) -> &GlSurface {
        match self.as_any().downcast_ref() {
            Some(surface) => surface,
            None => panic!("surface is not backed by the GL engine"),
        }
    }

    /// Engine-specific accessor. Panics when this surface is backed by the
    /// other engine: that is a wiring error, not a runtime condition.
    pub fn as_tile(&self) -> &TileSurface {
        match self.as_any().downcast_ref() {
            Some(surface) => surface,
            None => panic!("surface is not backed by the tile engine"),
        }
    }
}

/// Capacity of the per-surface event stream
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_reason_distinguishes_gesture() {
        assert_ne!(MoveReason::UserGesture, MoveReason::Application);
        let event = SurfaceEvent::WillMove {
            reason: MoveReason::UserGesture,
        };
        assert!(matches!(
            event,
            SurfaceEvent::WillMove {
                reason: MoveReason::UserGesture
            }
        ));
    }
}
