//! Map camera controller.
//!
//! Binds to exactly one live [`MapSurface`] at a time and reconciles user
//! gestures with programmatic animations and viewport padding updates.
//! Commands and engine callbacks are two independent event producers driving
//! one state machine, so every mutation point re-checks the
//! [`ProgrammaticTarget`]/[`QueuedRecenter`] guards to decide whether an
//! event is still relevant.

pub mod state;

use crate::core::camera::{CameraPosition, CameraUpdate, MarkerState, Padding};
use crate::core::config::CameraOptions;
use crate::core::constants;
use crate::core::geo::{GeoBounds, GeoPoint};
use crate::surface::{MapSurface, MoveReason, SurfaceEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch};

pub use self::state::{ProgrammaticTarget, QueuedRecenter};
use self::state::ControllerState;

struct Shared {
    state: Mutex<ControllerState>,
    options: CameraOptions,
    position_tx: watch::Sender<CameraPosition>,
    marker_tx: watch::Sender<MarkerState>,
    ready_tx: watch::Sender<bool>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_event(shared: &Arc<Shared>, event: SurfaceEvent) {
        match event {
            SurfaceEvent::WillMove { reason } => {
                let mut state = shared.state();
                state.surface_moving = true;
                let by_user = reason == MoveReason::UserGesture;
                if by_user {
                    // A user touch always overrides in-flight programmatic
                    // intent, including a pending silent padding sync
                    state.programmatic = None;
                    state.queued_recenter = None;
                    state.silent_padding_sync = false;
                }
                let point = state.surface.as_ref().map(|surface| surface.pose().target);
                drop(state);

                if let Some(point) = point {
                    shared
                        .marker_tx
                        .send_replace(MarkerState::moving(point, by_user));
                }
            }
            SurfaceEvent::Idle => Self::handle_idle(shared),
        }
    }

    /// Reconciles published state once the engine settles. The engine
    /// reports idle identically for gesture- and command-driven motion.
    fn handle_idle(shared: &Arc<Shared>) {
        let mut state = shared.state();
        state.surface_moving = false;
        let Some(surface) = state.surface.clone() else {
            return;
        };
        let pose = surface.pose();

        if let Some(recenter) = state.queued_recenter.take() {
            // A padding change that landed mid-flight could not be merged
            // into the running animation; replay it now with the padding
            // that displaced it
            state.cancel_animation();
            let update = CameraUpdate::new()
                .with_target(recenter.target)
                .with_zoom(recenter.zoom)
                .with_padding(state.desired_padding);
            state.applied_padding = state.desired_padding;
            let duration = shared.options.recenter_duration();
            let replay_surface = Arc::clone(&surface);
            let task = tokio::spawn(async move {
                if let Err(err) = replay_surface.animate_to(update, duration).await {
                    log::debug!("recenter replay dropped: {err}");
                }
            });
            state.animation = Some(task.abort_handle());
            state.programmatic = None;
            let padding = state.desired_padding;
            drop(state);

            shared
                .position_tx
                .send_replace(CameraPosition { padding, ..pose });
            return;
        }

        state.programmatic = None;
        let silent = std::mem::take(&mut state.silent_padding_sync);
        drop(state);

        shared.position_tx.send_replace(pose);
        if !silent {
            shared
                .marker_tx
                .send_replace(MarkerState::settled(pose.target));
        }
    }
}

/// Drives one interactive map camera through a uniform command API and
/// publishes its observable state. Created once per map screen; commands
/// are issued by a single logical owner, while engine callbacks may arrive
/// at arbitrary times relative to command issuance.
pub struct CameraController {
    shared: Arc<Shared>,
}

impl CameraController {
    pub fn new(options: CameraOptions) -> Self {
        let (position_tx, _) = watch::channel(options.default_position());
        let (marker_tx, _) = watch::channel(MarkerState::INITIAL);
        let (ready_tx, _) = watch::channel(false);

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ControllerState::new()),
                options,
                position_tx,
                marker_tx,
                ready_tx,
            }),
        }
    }

    /// Observable committed camera pose
    pub fn camera_position(&self) -> watch::Receiver<CameraPosition> {
        self.shared.position_tx.subscribe()
    }

    /// Observable marker/target state
    pub fn marker_state(&self) -> watch::Receiver<MarkerState> {
        self.shared.marker_tx.subscribe()
    }

    /// True while a live surface is bound
    pub fn ready(&self) -> watch::Receiver<bool> {
        self.shared.ready_tx.subscribe()
    }

    /// Latest committed camera pose
    pub fn current_position(&self) -> CameraPosition {
        *self.shared.position_tx.borrow()
    }

    /// Binds the controller to a live surface. Cancels any prior animation,
    /// clears all ephemeral state, snapshots the surface's padding as
    /// applied, and starts the event pump. Must be called on the runtime.
    pub fn bind(&self, surface: Arc<dyn MapSurface>, density: f64) {
        let mut events = surface.subscribe();
        {
            let mut state = self.shared.state();
            if let Some(previous) = state.surface.as_ref() {
                previous.stop();
            }
            state.invalidate();
            state.density = density;
            state.applied_padding = surface.pose().padding;
            state.surface = Some(Arc::clone(&surface));
        }

        let shared = Arc::clone(&self.shared);
        let pump = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => Shared::handle_event(&shared, event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        log::warn!("surface event stream lagged, {missed} events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.shared.state().pump = Some(pump.abort_handle());
        self.shared.ready_tx.send_replace(true);
    }

    /// Feeds the bounds-inset clamp; width and height in physical pixels
    pub fn set_map_size(&self, width: f64, height: f64) {
        self.shared.state().map_size = Some((width, height));
    }

    /// Jumps the camera to `target` at `zoom` (clamped)
    pub async fn move_to(&self, target: GeoPoint, zoom: f64) {
        let zoom = self.shared.options.clamp_zoom(zoom);
        self.drive(
            target,
            CameraUpdate::new().with_target(target).with_zoom(zoom),
            None,
        )
        .await;
    }

    /// Eases the camera to `target` at `zoom` (clamped) over `duration_ms`
    pub async fn animate_to(&self, target: GeoPoint, zoom: f64, duration_ms: u64) {
        let zoom = self.shared.options.clamp_zoom(zoom);
        self.drive(
            target,
            CameraUpdate::new().with_target(target).with_zoom(zoom),
            Some(Duration::from_millis(duration_ms)),
        )
        .await;
    }

    /// Eased move that also rotates and tilts the camera
    pub async fn animate_to_with_bearing(
        &self,
        target: GeoPoint,
        zoom: f64,
        bearing: f64,
        tilt: f64,
        duration_ms: u64,
    ) {
        let zoom = self.shared.options.clamp_zoom(zoom);
        self.drive(
            target,
            CameraUpdate::new()
                .with_target(target)
                .with_zoom(zoom)
                .with_bearing(bearing)
                .with_tilt(tilt),
            Some(Duration::from_millis(duration_ms)),
        )
        .await;
    }

    /// Frames `points` within the viewport. The ZERO sentinel and duplicate
    /// coordinates are dropped; zero remaining points is a no-op and a
    /// single point degrades to a move at the current zoom. `padding` is an
    /// extra symmetric inset in device-independent units.
    pub async fn fit_bounds(&self, points: &[GeoPoint], padding: f64, animate: bool) {
        let distinct = GeoPoint::distinct(points);
        match distinct.as_slice() {
            [] => {
                log::debug!("fit_bounds dropped, no usable points");
            }
            [point] => {
                let zoom = {
                    let state = self.shared.state();
                    let Some(surface) = state.surface.as_ref() else {
                        log::debug!("fit_bounds dropped, no surface bound");
                        return;
                    };
                    surface.pose().zoom
                };
                let update = CameraUpdate::new().with_target(*point).with_zoom(zoom);
                let duration = animate.then(|| self.shared.options.fit_duration());
                self.drive(*point, update, duration).await;
            }
            _ => {
                let Some(bounds) = GeoBounds::from_points(&distinct) else {
                    return;
                };
                let task = {
                    let mut state = self.shared.state();
                    let Some(surface) = state.surface.clone() else {
                        log::debug!("fit_bounds dropped, no surface bound");
                        return;
                    };
                    // Bounds fit is authoritative: nothing queued survives it
                    state.queued_recenter = None;
                    state.programmatic = None;
                    state.cancel_animation();
                    let inset = clamped_fit_inset(&state, &self.shared.options, padding);
                    state.applied_padding = state.desired_padding;
                    let duration = animate.then(|| self.shared.options.fit_duration());
                    let task = tokio::spawn(async move {
                        if let Err(err) = surface.animate_to_bounds(bounds, inset, duration).await
                        {
                            log::debug!("fit_bounds dropped: {err}");
                        }
                    });
                    state.animation = Some(task.abort_handle());
                    task
                };
                let _ = task.await;
            }
        }
    }

    /// Animates to `zoom` (clamped) at the current target; no-op when the
    /// clamped zoom equals the current zoom
    pub async fn set_zoom(&self, zoom: f64) {
        let (target, clamped) = {
            let state = self.shared.state();
            let Some(surface) = state.surface.as_ref() else {
                log::debug!("set_zoom dropped, no surface bound");
                return;
            };
            let pose = surface.pose();
            let clamped = self.shared.options.clamp_zoom(zoom);
            if (clamped - pose.zoom).abs() < constants::ZOOM_EPSILON {
                return;
            }
            (pose.target, clamped)
        };
        self.drive(
            target,
            CameraUpdate::new().with_target(target).with_zoom(clamped),
            Some(self.shared.options.zoom_duration()),
        )
        .await;
    }

    pub async fn zoom_in(&self) {
        self.step_zoom(self.shared.options.zoom_delta).await;
    }

    pub async fn zoom_out(&self) {
        self.step_zoom(-self.shared.options.zoom_delta).await;
    }

    /// Updates the viewport padding. If a programmatic animation is in
    /// flight the recenter is deferred to the next idle event; otherwise the
    /// padding is applied to the current pose without animating target or
    /// zoom, and the resulting idle is treated as a silent sync.
    pub async fn update_padding(&self, padding: Padding) {
        enum FollowUp {
            None,
            ForceIdle,
            Apply(Arc<dyn MapSurface>),
        }

        let (publish, follow_up) = {
            let mut state = self.shared.state();
            if state.desired_padding == padding && state.applied_padding == padding {
                return;
            }
            state.desired_padding = padding;
            let publish = state.applied_padding != padding;

            let follow_up = if let Some(programmatic) = state.programmatic {
                // Cannot merge padding into a running animation; defer
                state.queued_recenter = Some(QueuedRecenter {
                    target: programmatic.target,
                    zoom: programmatic.zoom,
                });
                if state.surface_moving {
                    FollowUp::None
                } else {
                    // Not mid-motion: reconcile now or the recenter strands
                    FollowUp::ForceIdle
                }
            } else if let Some(surface) = state.surface.clone() {
                state.applied_padding = padding;
                state.silent_padding_sync = true;
                FollowUp::Apply(surface)
            } else {
                FollowUp::None
            };
            (publish, follow_up)
        };

        if publish {
            let mut position = *self.shared.position_tx.borrow();
            position.padding = padding;
            self.shared.position_tx.send_replace(position);
        }

        match follow_up {
            FollowUp::None => {}
            FollowUp::ForceIdle => Shared::handle_idle(&self.shared),
            FollowUp::Apply(surface) => {
                if let Err(err) = surface.apply_padding(padding).await {
                    log::debug!("padding update dropped: {err}");
                }
            }
        }
    }

    /// Non-suspending variant for layout-only resize callbacks; records the
    /// target padding without touching the camera
    pub fn set_desired_padding(&self, padding: Padding) {
        self.shared.state().desired_padding = padding;
    }

    /// Cancels any animation, clears all ephemeral state and republishes the
    /// default camera and marker
    pub fn reset(&self) {
        {
            let mut state = self.shared.state();
            if let Some(surface) = state.surface.take() {
                surface.stop();
            }
            state.invalidate();
            state.desired_padding = Padding::ZERO;
            state.applied_padding = Padding::ZERO;
        }
        self.shared.ready_tx.send_replace(false);
        self.shared
            .position_tx
            .send_replace(self.shared.options.default_position());
        self.shared.marker_tx.send_replace(MarkerState::INITIAL);
    }

    async fn step_zoom(&self, delta: f64) {
        let zoom = {
            let state = self.shared.state();
            let Some(surface) = state.surface.as_ref() else {
                log::debug!("zoom step dropped, no surface bound");
                return;
            };
            surface.pose().zoom + delta
        };
        self.set_zoom(zoom).await;
    }

    /// Common path for every targeted camera command: cancel the previous
    /// animation task (last command wins), arm the programmatic guard
    /// before the surface call so a concurrent idle is attributed
    /// correctly, then suspend until the engine settles or a newer command
    /// aborts the wait.
    async fn drive(&self, target: GeoPoint, update: CameraUpdate, duration: Option<Duration>) {
        let task = {
            let mut state = self.shared.state();
            let Some(surface) = state.surface.clone() else {
                log::debug!("camera command dropped, no surface bound");
                return;
            };
            state.cancel_animation();
            let zoom = update.zoom.unwrap_or_else(|| surface.pose().zoom);
            state.programmatic = Some(ProgrammaticTarget { target, zoom });
            let update = update.with_padding(state.desired_padding);
            state.applied_padding = state.desired_padding;

            let task = tokio::spawn(async move {
                let result = match duration {
                    None => surface.jump_to(update).await,
                    Some(duration) => surface.animate_to(update, duration).await,
                };
                if let Err(err) = result {
                    log::debug!("camera move dropped: {err}");
                }
            });
            state.animation = Some(task.abort_handle());
            task
        };
        // A newer command aborting this task is expected control flow
        let _ = task.await;
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraOptions::default())
    }
}

/// Total bounds-fit inset in physical pixels: desired padding plus the
/// caller's extra plus the fixed margin, each side capped at half the
/// viewport's shorter dimension
fn clamped_fit_inset(state: &ControllerState, options: &CameraOptions, extra: f64) -> Padding {
    let inset = state
        .desired_padding
        .grown(extra.max(0.0))
        .grown(options.fit_inset)
        .scaled(state.density);

    match state.map_size {
        Some((width, height)) => inset.capped(width.min(height) / 2.0),
        None => {
            log::debug!("viewport size unknown, fit inset not clamped");
            inset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_fit_inset_caps_at_half_short_dimension() {
        let mut state = ControllerState::new();
        state.density = 2.0;
        state.map_size = Some((400.0, 600.0));
        state.desired_padding = Padding::ZERO;

        let options = CameraOptions::default();
        let inset = clamped_fit_inset(&state, &options, 1000.0);

        assert_eq!(inset, Padding::all(200.0));
    }

    #[test]
    fn test_clamped_fit_inset_includes_desired_padding_and_margin() {
        let mut state = ControllerState::new();
        state.density = 1.0;
        state.map_size = Some((1000.0, 1000.0));
        state.desired_padding = Padding::new(10.0, 20.0, 30.0, 40.0);

        let options = CameraOptions::default();
        let inset = clamped_fit_inset(&state, &options, 6.0);

        let margin = options.fit_inset + 6.0;
        assert_eq!(
            inset,
            Padding::new(10.0 + margin, 20.0 + margin, 30.0 + margin, 40.0 + margin)
        );
    }

    #[test]
    fn test_negative_caller_padding_is_ignored() {
        let mut state = ControllerState::new();
        state.map_size = Some((1000.0, 1000.0));

        let options = CameraOptions::default();
        let inset = clamped_fit_inset(&state, &options, -50.0);
        assert_eq!(inset, Padding::all(options.fit_inset));
    }
}
