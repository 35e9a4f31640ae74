//! Adapter for the GL map engine.
//!
//! This engine exposes a single combined ease-camera primitive, a native
//! bounds-fit call, and first-class camera padding. The adapter's only job
//! is translating [`CameraUpdate`]s into the engine's call vocabulary and
//! bridging the binding's callbacks into the shared event stream.

use crate::core::camera::{CameraPosition, CameraUpdate, Padding};
use crate::core::geo::GeoBounds;
use crate::surface::{MapSurface, MoveReason, SurfaceEvent, EVENT_CHANNEL_CAPACITY};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Call vocabulary of the GL engine binding
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    EaseCamera {
        update: CameraUpdate,
        duration_ms: u64,
    },
    JumpCamera {
        update: CameraUpdate,
    },
    FitBounds {
        bounds: GeoBounds,
        inset: Padding,
        duration_ms: u64,
    },
    SetPadding {
        padding: Padding,
    },
    Stop,
}

/// Sink through which calls reach the live GL map. In production this is the
/// engine binding; tests substitute a recorder.
pub trait GlMapHandle: Send + Sync {
    fn submit(&self, call: GlCall) -> crate::Result<()>;

    /// Current live camera
    fn camera(&self) -> CameraPosition;
}

/// Live GL camera object behind the uniform [`MapSurface`] contract
pub struct GlSurface {
    handle: Arc<dyn GlMapHandle>,
    events: broadcast::Sender<SurfaceEvent>,
    idle_seq: watch::Sender<u64>,
}

impl GlSurface {
    pub fn new(handle: Arc<dyn GlMapHandle>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (idle_seq, _) = watch::channel(0);
        Self {
            handle,
            events,
            idle_seq,
        }
    }

    /// Called by the engine binding when the camera is about to move
    pub fn notify_move_started(&self, reason: MoveReason) {
        let _ = self.events.send(SurfaceEvent::WillMove { reason });
    }

    /// Called by the engine binding when camera motion has settled
    pub fn notify_idle(&self) {
        self.idle_seq.send_modify(|seq| *seq += 1);
        let _ = self.events.send(SurfaceEvent::Idle);
    }

    /// Submits a call and suspends until the next idle notification.
    /// Subscribing before submitting closes the settled-before-wait race.
    async fn submit_and_settle(&self, call: GlCall) -> crate::Result<()> {
        let mut settled = self.idle_seq.subscribe();
        self.handle.submit(call)?;
        let _ = settled.changed().await;
        Ok(())
    }
}

#[async_trait]
impl MapSurface for GlSurface {
    fn pose(&self) -> CameraPosition {
        self.handle.camera()
    }

    async fn jump_to(&self, update: CameraUpdate) -> crate::Result<()> {
        self.submit_and_settle(GlCall::JumpCamera { update }).await
    }

    async fn animate_to(&self, update: CameraUpdate, duration: Duration) -> crate::Result<()> {
        self.submit_and_settle(GlCall::EaseCamera {
            update,
            duration_ms: duration.as_millis() as u64,
        })
        .await
    }

    async fn animate_to_bounds(
        &self,
        bounds: GeoBounds,
        inset: Padding,
        duration: Option<Duration>,
    ) -> crate::Result<()> {
        self.submit_and_settle(GlCall::FitBounds {
            bounds,
            inset,
            duration_ms: duration.map(|d| d.as_millis() as u64).unwrap_or(0),
        })
        .await
    }

    async fn apply_padding(&self, padding: Padding) -> crate::Result<()> {
        // Padding-only update; settles through the shared idle stream
        self.handle.submit(GlCall::SetPadding { padding })
    }

    fn stop(&self) {
        if let Err(err) = self.handle.submit(GlCall::Stop) {
            log::debug!("stop dropped, GL binding gone: {err}");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.events.subscribe()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::GeoPoint;
    use std::sync::Mutex;

    struct RecordingHandle {
        calls: Mutex<Vec<GlCall>>,
        camera: Mutex<CameraPosition>,
    }

    impl RecordingHandle {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                camera: Mutex::new(CameraPosition::default()),
            }
        }
    }

    impl GlMapHandle for RecordingHandle {
        fn submit(&self, call: GlCall) -> crate::Result<()> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }

        fn camera(&self) -> CameraPosition {
            *self.camera.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn test_animate_translates_to_ease_call() {
        let handle = Arc::new(RecordingHandle::new());
        let surface = Arc::new(GlSurface::new(handle.clone()));

        let driver = surface.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            driver.notify_idle();
        });

        let update = CameraUpdate::new()
            .with_target(GeoPoint::new(41.31, 69.28))
            .with_zoom(16.0);
        surface
            .animate_to(update, Duration::from_millis(450))
            .await
            .unwrap();

        let calls = handle.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            GlCall::EaseCamera {
                update,
                duration_ms: 450
            }
        );
    }

    #[tokio::test]
    async fn test_zero_duration_bounds_fit_jumps() {
        let handle = Arc::new(RecordingHandle::new());
        let surface = Arc::new(GlSurface::new(handle.clone()));

        let driver = surface.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            driver.notify_idle();
        });

        let bounds = GeoBounds::new(GeoPoint::new(41.30, 69.27), GeoPoint::new(41.32, 69.29));
        surface
            .animate_to_bounds(bounds, Padding::all(48.0), None)
            .await
            .unwrap();

        let calls = handle.calls.lock().unwrap();
        assert!(matches!(
            calls[0],
            GlCall::FitBounds { duration_ms: 0, .. }
        ));
    }

    #[test]
    fn test_apply_padding_does_not_wait_for_idle() {
        let handle = Arc::new(RecordingHandle::new());
        let surface = GlSurface::new(handle.clone());

        // No idle is ever notified; the call must still return
        let result = futures_executor(surface.apply_padding(Padding::all(12.0)));
        assert!(result.is_ok());
        let calls = handle.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            GlCall::SetPadding {
                padding: Padding::all(12.0)
            }
        );
    }

    fn futures_executor<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }
}
