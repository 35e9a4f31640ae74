//! Adapter for the tile map engine.
//!
//! This engine only offers per-property primitives: no combined ease, no
//! native bounds-fit, no camera padding. The adapter computes fitted poses
//! client-side over the Web Mercator projection and emulates padding by
//! offsetting the engine center so the visual target sits at the center of
//! the padded area.

use crate::core::camera::{CameraPosition, CameraUpdate, Padding};
use crate::core::geo::{GeoBounds, GeoPoint};
use crate::surface::{MapSurface, MoveReason, SurfaceEvent, EVENT_CHANNEL_CAPACITY};
use async_trait::async_trait;
use std::any::Any;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Call vocabulary of the tile engine binding
#[derive(Debug, Clone, PartialEq)]
pub enum TileCall {
    SetView {
        center: GeoPoint,
        zoom: f64,
        duration_ms: u64,
    },
    SetBearing {
        bearing: f64,
        duration_ms: u64,
    },
    SetTilt {
        tilt: f64,
    },
    Stop,
}

/// Sink through which calls reach the live tile map
pub trait TileMapHandle: Send + Sync {
    fn submit(&self, call: TileCall) -> crate::Result<()>;

    fn center(&self) -> GeoPoint;
    fn zoom(&self) -> f64;
    fn bearing(&self) -> f64;
    fn tilt(&self) -> f64;
}

/// Live tile-engine camera behind the uniform [`MapSurface`] contract
pub struct TileSurface {
    handle: Arc<dyn TileMapHandle>,
    events: broadcast::Sender<SurfaceEvent>,
    idle_seq: watch::Sender<u64>,
    /// Viewport size in physical pixels; required for bounds fitting
    viewport: Mutex<(f64, f64)>,
    /// Emulated camera padding (device-independent units)
    padding: Mutex<Padding>,
    /// dp-to-px scale of the hosting view
    density: Mutex<f64>,
    zoom_range: (f64, f64),
}

impl TileSurface {
    pub fn new(handle: Arc<dyn TileMapHandle>, zoom_range: (f64, f64)) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (idle_seq, _) = watch::channel(0);
        Self {
            handle,
            events,
            idle_seq,
            viewport: Mutex::new((0.0, 0.0)),
            padding: Mutex::new(Padding::ZERO),
            density: Mutex::new(1.0),
            zoom_range,
        }
    }

    /// Called by the hosting view on layout changes
    pub fn set_viewport_size(&self, width: f64, height: f64) {
        *self.viewport.lock().unwrap() = (width, height);
    }

    /// Called by the hosting view when the display scale is known
    pub fn set_density(&self, density: f64) {
        *self.density.lock().unwrap() = density.max(0.1);
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

    fn padding_offset_px(&self) -> (f64, f64) {
        let padding = *self.padding.lock().unwrap();
        let density = *self.density.lock().unwrap();
        (
            padding.offset_x() * density,
            padding.offset_y() * density,
        )
    }

    async fn settle_after<F>(&self, submit: F) -> crate::Result<()>
    where
        F: FnOnce() -> crate::Result<()>,
    {
        let mut settled = self.idle_seq.subscribe();
        submit()?;
        let _ = settled.changed().await;
        Ok(())
    }

    fn submit_view(&self, update: CameraUpdate, duration_ms: u64) -> crate::Result<()> {
        if let Some(padding) = update.padding {
            *self.padding.lock().unwrap() = padding;
        }

        let zoom = update.zoom.unwrap_or_else(|| self.handle.zoom());
        let target = update.target.unwrap_or_else(|| self.pose().target);
        let (offset_x, offset_y) = self.padding_offset_px();
        let center = engine_center_for(target, zoom, offset_x, offset_y);

        self.handle.submit(TileCall::SetView {
            center,
            zoom,
            duration_ms,
        })?;
        if let Some(bearing) = update.bearing {
            self.handle.submit(TileCall::SetBearing {
                bearing,
                duration_ms,
            })?;
        }
        if let Some(tilt) = update.tilt {
            self.handle.submit(TileCall::SetTilt { tilt })?;
        }
        Ok(())
    }
}

#[async_trait]
impl MapSurface for TileSurface {
    fn pose(&self) -> CameraPosition {
        let zoom = self.handle.zoom();
        let (offset_x, offset_y) = self.padding_offset_px();
        let (center_x, center_y) = self.handle.center().to_world_pixel(zoom);
        let target = GeoPoint::from_world_pixel(center_x + offset_x, center_y + offset_y, zoom);

        CameraPosition {
            target,
            zoom,
            bearing: self.handle.bearing(),
            tilt: self.handle.tilt(),
            padding: *self.padding.lock().unwrap(),
        }
    }

    async fn jump_to(&self, update: CameraUpdate) -> crate::Result<()> {
        self.settle_after(|| self.submit_view(update, 0)).await
    }

    async fn animate_to(&self, update: CameraUpdate, duration: Duration) -> crate::Result<()> {
        self.settle_after(|| self.submit_view(update, duration.as_millis() as u64))
            .await
    }

    async fn animate_to_bounds(
        &self,
        bounds: GeoBounds,
        inset: Padding,
        duration: Option<Duration>,
    ) -> crate::Result<()> {
        let (width, height) = *self.viewport.lock().unwrap();
        if width <= 0.0 || height <= 0.0 {
            log::warn!("bounds fit dropped, viewport size unknown");
            return Ok(());
        }

        let usable_w = (width - inset.left - inset.right).max(1.0);
        let usable_h = (height - inset.top - inset.bottom).max(1.0);
        let zoom = fit_zoom(&bounds, usable_w, usable_h, self.zoom_range);

        let (center_x, center_y) = bounds.center().to_world_pixel(zoom);
        let center = GeoPoint::from_world_pixel(
            center_x - inset.offset_x(),
            center_y - inset.offset_y(),
            zoom,
        );

        let duration_ms = duration.map(|d| d.as_millis() as u64).unwrap_or(0);
        self.settle_after(|| {
            self.handle.submit(TileCall::SetView {
                center,
                zoom,
                duration_ms,
            })
        })
        .await
    }

    async fn apply_padding(&self, padding: Padding) -> crate::Result<()> {
        let target = self.pose().target;
        *self.padding.lock().unwrap() = padding;

        let zoom = self.handle.zoom();
        let (offset_x, offset_y) = self.padding_offset_px();
        let center = engine_center_for(target, zoom, offset_x, offset_y);

        // Re-center under the new padding without touching zoom
        self.handle.submit(TileCall::SetView {
            center,
            zoom,
            duration_ms: 0,
        })
    }

    fn stop(&self) {
        if let Err(err) = self.handle.submit(TileCall::Stop) {
            log::debug!("stop dropped, tile binding gone: {err}");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.events.subscribe()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Engine center that shows `target` at the center of the padded area
fn engine_center_for(target: GeoPoint, zoom: f64, offset_x: f64, offset_y: f64) -> GeoPoint {
    let (target_x, target_y) = target.to_world_pixel(zoom);
    GeoPoint::from_world_pixel(target_x - offset_x, target_y - offset_y, zoom)
}

/// Highest integer zoom at which the projected bounds fit the usable
/// viewport, clamped to `zoom_range`
fn fit_zoom(bounds: &GeoBounds, usable_w: f64, usable_h: f64, zoom_range: (f64, f64)) -> f64 {
    let (min_zoom, max_zoom) = zoom_range;
    let mut best = min_zoom;
    let mut level = min_zoom.ceil() as i32;

    while (level as f64) <= max_zoom {
        let zoom = level as f64;
        let nw = GeoPoint::new(bounds.north_east.lat, bounds.south_west.lng);
        let se = GeoPoint::new(bounds.south_west.lat, bounds.north_east.lng);
        let (nw_x, nw_y) = nw.to_world_pixel(zoom);
        let (se_x, se_y) = se.to_world_pixel(zoom);

        let bounds_w = (se_x - nw_x).abs();
        let bounds_h = (se_y - nw_y).abs();
        if bounds_w <= usable_w && bounds_h <= usable_h {
            best = zoom;
        } else {
            break;
        }
        level += 1;
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city_bounds() -> GeoBounds {
        GeoBounds::new(GeoPoint::new(41.20, 69.15), GeoPoint::new(41.40, 69.40))
    }

    #[test]
    fn test_fit_zoom_within_range() {
        let zoom = fit_zoom(&city_bounds(), 800.0, 600.0, (2.0, 20.0));
        assert!(zoom >= 2.0 && zoom <= 20.0);

        // A city-sized box on a desktop viewport lands in the 9-12 band
        assert!(zoom >= 9.0 && zoom <= 12.0, "unexpected fit zoom {zoom}");
    }

    #[test]
    fn test_fit_zoom_shrinks_with_viewport() {
        let large = fit_zoom(&city_bounds(), 1600.0, 1200.0, (2.0, 20.0));
        let small = fit_zoom(&city_bounds(), 200.0, 150.0, (2.0, 20.0));
        assert!(large > small);
    }

    #[test]
    fn test_fit_zoom_clamps_to_min() {
        // A hemisphere never fits a phone screen above the minimum zoom
        let bounds = GeoBounds::new(GeoPoint::new(-60.0, -170.0), GeoPoint::new(60.0, 170.0));
        let zoom = fit_zoom(&bounds, 300.0, 500.0, (2.0, 20.0));
        assert_eq!(zoom, 2.0);
    }

    #[test]
    fn test_engine_center_round_trip() {
        let target = GeoPoint::new(41.311081, 69.280737);
        let center = engine_center_for(target, 14.0, 60.0, -40.0);

        // Shifting the engine center back by the offset recovers the target
        let (cx, cy) = center.to_world_pixel(14.0);
        let back = GeoPoint::from_world_pixel(cx + 60.0, cy - 40.0, 14.0);
        assert!((back.lat - target.lat).abs() < 1e-9);
        assert!((back.lng - target.lng).abs() < 1e-9);
    }

    #[test]
    fn test_engine_center_no_offset_is_identity() {
        let target = GeoPoint::new(41.31, 69.28);
        let center = engine_center_for(target, 15.0, 0.0, 0.0);
        assert!((center.lat - target.lat).abs() < 1e-9);
        assert!((center.lng - target.lng).abs() < 1e-9);
    }
}
