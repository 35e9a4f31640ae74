//! Prelude module for common mapcam types and traits
//!
//! Re-exports the most commonly used types for easy importing with
//! `use mapcam::prelude::*;`

pub use crate::core::{
    camera::{CameraPosition, CameraUpdate, MarkerState, Padding},
    config::CameraOptions,
    constants,
    geo::{GeoBounds, GeoPoint},
};

pub use crate::controller::{CameraController, ProgrammaticTarget, QueuedRecenter};

pub use crate::surface::{
    GlCall, GlMapHandle, GlSurface, MapSurface, MoveReason, SurfaceEvent, TileCall, TileMapHandle,
    TileSurface,
};

pub use crate::provider::{EngineHandle, MapEngine, MapProvider};

pub use crate::{CameraError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
