//! Engine selection.
//!
//! The provider is the controller's creator: given the configured engine
//! and the live engine binding, it assembles the matching surface adapter
//! and a controller tuned with the shared [`CameraOptions`].

use crate::controller::CameraController;
use crate::core::config::CameraOptions;
use crate::surface::{GlMapHandle, GlSurface, MapSurface, TileMapHandle, TileSurface};
use std::sync::Arc;

/// The two supported native map engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEngine {
    Gl,
    Tile,
}

/// Live engine binding, matching one of the [`MapEngine`] variants
pub enum EngineHandle {
    Gl(Arc<dyn GlMapHandle>),
    Tile(Arc<dyn TileMapHandle>),
}

pub struct MapProvider {
    engine: MapEngine,
    options: CameraOptions,
}

impl MapProvider {
    pub fn new(engine: MapEngine, options: CameraOptions) -> Self {
        Self { engine, options }
    }

    pub fn engine(&self) -> MapEngine {
        self.engine
    }

    pub fn options(&self) -> &CameraOptions {
        &self.options
    }

    /// Builds the surface/controller pair for the configured engine.
    ///
    /// Panics when `handle` belongs to the other engine: that is incorrect
    /// wiring, not a runtime condition.
    pub fn create(&self, handle: EngineHandle) -> (CameraController, Arc<dyn MapSurface>) {
        let surface: Arc<dyn MapSurface> = match (self.engine, handle) {
            (MapEngine::Gl, EngineHandle::Gl(handle)) => Arc::new(GlSurface::new(handle)),
            (MapEngine::Tile, EngineHandle::Tile(handle)) => Arc::new(TileSurface::new(
                handle,
                (self.options.min_zoom, self.options.max_zoom),
            )),
            (engine, _) => panic!("engine handle does not match configured engine {engine:?}"),
        };
        (CameraController::new(self.options.clone()), surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::CameraPosition;
    use crate::core::geo::GeoPoint;
    use crate::surface::{GlCall, TileCall};

    struct NullGlHandle;

    impl GlMapHandle for NullGlHandle {
        fn submit(&self, _call: GlCall) -> crate::Result<()> {
            Ok(())
        }

        fn camera(&self) -> CameraPosition {
            CameraPosition::default()
        }
    }

    struct NullTileHandle;

    impl TileMapHandle for NullTileHandle {
        fn submit(&self, _call: TileCall) -> crate::Result<()> {
            Ok(())
        }

        fn center(&self) -> GeoPoint {
            GeoPoint::ZERO
        }

        fn zoom(&self) -> f64 {
            0.0
        }

        fn bearing(&self) -> f64 {
            0.0
        }

        fn tilt(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_creates_matching_pair() {
        let provider = MapProvider::new(MapEngine::Gl, CameraOptions::default());
        let (_, surface) = provider.create(EngineHandle::Gl(Arc::new(NullGlHandle)));
        // Downcast succeeds for the configured engine
        let _ = surface.as_gl();
    }

    #[test]
    #[should_panic(expected = "does not match configured engine")]
    fn test_mismatched_handle_panics() {
        let provider = MapProvider::new(MapEngine::Gl, CameraOptions::default());
        let _ = provider.create(EngineHandle::Tile(Arc::new(NullTileHandle)));
    }

    #[test]
    #[should_panic(expected = "not backed by the GL engine")]
    fn test_wrong_engine_downcast_panics() {
        let provider = MapProvider::new(MapEngine::Tile, CameraOptions::default());
        let (_, surface) = provider.create(EngineHandle::Tile(Arc::new(NullTileHandle)));
        let _ = surface.as_gl();
    }
}
