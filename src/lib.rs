//! # mapcam
//!
//! Provider-agnostic camera controller for interactive map surfaces.
//!
//! The controller drives one native map engine's camera through a uniform
//! command API (move, animate, fit bounds, zoom, padding) and publishes a
//! uniform observable state (camera pose, marker state, readiness),
//! reconciling user gestures, programmatic animations and padding updates
//! into a single consistent stream. Two structurally different engines are
//! supported behind one surface contract.

pub mod controller;
pub mod core;
pub mod prelude;
pub mod provider;
pub mod surface;

pub use crate::core::constants;

// Re-export public API
pub use controller::CameraController;
pub use core::{
    camera::{CameraPosition, CameraUpdate, MarkerState, Padding},
    config::CameraOptions,
    geo::{GeoBounds, GeoPoint},
};
pub use provider::{EngineHandle, MapEngine, MapProvider};
pub use surface::{MapSurface, MoveReason, SurfaceEvent};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, CameraError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// The engine binding behind a surface is gone
    #[error("map surface is gone: {0}")]
    SurfaceGone(String),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = CameraError;
