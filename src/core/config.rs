//! Configuration for camera behavior tuning
//!
//! Animation timings and zoom limits are the knobs product teams tune most
//! often, so they are grouped here and can be loaded from a JSON profile.

use crate::core::camera::CameraPosition;
use crate::core::constants;
use crate::core::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    /// Camera target published until a real fix arrives
    pub default_center: GeoPoint,
    pub default_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Step used by `zoom_in`/`zoom_out`
    pub zoom_delta: f64,
    pub animate_duration_ms: u64,
    pub zoom_duration_ms: u64,
    pub recenter_duration_ms: u64,
    pub fit_duration_ms: u64,
    /// Extra inset added to every bounds fit, in device-independent units
    pub fit_inset: f64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        let (lat, lng) = constants::DEFAULT_CENTER;
        Self {
            default_center: GeoPoint::new(lat, lng),
            default_zoom: constants::DEFAULT_ZOOM,
            min_zoom: constants::MIN_ZOOM,
            max_zoom: constants::MAX_ZOOM,
            zoom_delta: constants::ZOOM_DELTA,
            animate_duration_ms: constants::ANIMATE_DURATION_MS,
            zoom_duration_ms: constants::ZOOM_DURATION_MS,
            recenter_duration_ms: constants::RECENTER_DURATION_MS,
            fit_duration_ms: constants::FIT_DURATION_MS,
            fit_inset: constants::FIT_INSET,
        }
    }
}

impl CameraOptions {
    /// Loads a tuning profile from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// The pose published before any surface is bound and after `reset()`
    pub fn default_position(&self) -> CameraPosition {
        CameraPosition::new(self.default_center, self.default_zoom)
    }

    pub fn animate_duration(&self) -> Duration {
        Duration::from_millis(self.animate_duration_ms)
    }

    pub fn zoom_duration(&self) -> Duration {
        Duration::from_millis(self.zoom_duration_ms)
    }

    pub fn recenter_duration(&self) -> Duration {
        Duration::from_millis(self.recenter_duration_ms)
    }

    pub fn fit_duration(&self) -> Duration {
        Duration::from_millis(self.fit_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CameraOptions::default();
        assert_eq!(options.min_zoom, constants::MIN_ZOOM);
        assert_eq!(options.max_zoom, constants::MAX_ZOOM);
        assert_eq!(options.recenter_duration_ms, 300);
        assert_eq!(options.default_position().zoom, constants::DEFAULT_ZOOM);
    }

    #[test]
    fn test_clamp_zoom() {
        let options = CameraOptions::default();
        assert_eq!(options.clamp_zoom(25.0), options.max_zoom);
        assert_eq!(options.clamp_zoom(-3.0), options.min_zoom);
        assert_eq!(options.clamp_zoom(14.0), 14.0);
    }

    #[test]
    fn test_from_json_partial_profile() {
        let options = CameraOptions::from_json(r#"{"max_zoom": 18.0, "fit_inset": 32.0}"#).unwrap();
        assert_eq!(options.max_zoom, 18.0);
        assert_eq!(options.fit_inset, 32.0);
        // untouched fields keep their defaults
        assert_eq!(options.min_zoom, constants::MIN_ZOOM);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(CameraOptions::from_json("not json").is_err());
    }
}
