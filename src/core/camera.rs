use crate::core::geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// Reserved viewport margin, in device-independent units, that the engine
/// keeps clear of camera content when centering
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Padding {
    pub const ZERO: Padding = Padding {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Uniform padding on all four sides
    pub fn all(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Horizontal offset of the padded area's center from the viewport center
    pub fn offset_x(&self) -> f64 {
        (self.left - self.right) / 2.0
    }

    /// Vertical offset of the padded area's center from the viewport center
    pub fn offset_y(&self) -> f64 {
        (self.top - self.bottom) / 2.0
    }

    /// Returns padding with every side scaled (dp to px conversion)
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.left * factor,
            self.top * factor,
            self.right * factor,
            self.bottom * factor,
        )
    }

    /// Returns padding with every side grown by `amount`
    pub fn grown(&self, amount: f64) -> Self {
        Self::new(
            self.left + amount,
            self.top + amount,
            self.right + amount,
            self.bottom + amount,
        )
    }

    /// Returns padding with every side capped at `limit`
    pub fn capped(&self, limit: f64) -> Self {
        Self::new(
            self.left.min(limit),
            self.top.min(limit),
            self.right.min(limit),
            self.bottom.min(limit),
        )
    }
}

/// The camera pose published by the controller. Updated only by the
/// controller, never mutated by UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub target: GeoPoint,
    pub zoom: f64,
    pub bearing: f64,
    pub tilt: f64,
    pub padding: Padding,
}

impl CameraPosition {
    pub fn new(target: GeoPoint, zoom: f64) -> Self {
        Self {
            target,
            zoom,
            bearing: 0.0,
            tilt: 0.0,
            padding: Padding::ZERO,
        }
    }
}

impl Default for CameraPosition {
    fn default() -> Self {
        Self::new(GeoPoint::ZERO, 0.0)
    }
}

/// Camera-target state while it is being dragged or animated, independent of
/// the committed CameraPosition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerState {
    pub point: GeoPoint,
    pub is_moving: bool,
    pub is_by_user: bool,
}

impl MarkerState {
    pub const INITIAL: MarkerState = MarkerState {
        point: GeoPoint::ZERO,
        is_moving: false,
        is_by_user: false,
    };

    pub fn moving(point: GeoPoint, by_user: bool) -> Self {
        Self {
            point,
            is_moving: true,
            is_by_user: by_user,
        }
    }

    pub fn settled(point: GeoPoint) -> Self {
        Self {
            point,
            is_moving: false,
            is_by_user: false,
        }
    }
}

impl Default for MarkerState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Partial camera pose handed to the surface primitives. Unset fields keep
/// their current engine value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraUpdate {
    pub target: Option<GeoPoint>,
    pub zoom: Option<f64>,
    pub bearing: Option<f64>,
    pub tilt: Option<f64>,
    pub padding: Option<Padding>,
}

impl CameraUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: GeoPoint) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = Some(bearing);
        self
    }

    pub fn with_tilt(mut self, tilt: f64) -> Self {
        self.tilt = Some(tilt);
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Resolves this update against the current pose
    pub fn applied_to(&self, pose: CameraPosition) -> CameraPosition {
        CameraPosition {
            target: self.target.unwrap_or(pose.target),
            zoom: self.zoom.unwrap_or(pose.zoom),
            bearing: self.bearing.unwrap_or(pose.bearing),
            tilt: self.tilt.unwrap_or(pose.tilt),
            padding: self.padding.unwrap_or(pose.padding),
        }
    }
}
