//! Engine-wide magic numbers shared by both map engine adapters.
//! Keeping them in a single place makes it easier to tweak controller-wide defaults.

/// Lowest zoom any programmatic command may request.
pub const MIN_ZOOM: f64 = 2.0;

/// Highest zoom any programmatic command may request.
pub const MAX_ZOOM: f64 = 20.0;

/// Zoom used until a real location fix arrives.
pub const DEFAULT_ZOOM: f64 = 15.0;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const ZOOM_DELTA: f64 = 1.0;

/// Zoom deltas below this are treated as no motion.
pub const ZOOM_EPSILON: f64 = 0.001;

/// Default camera target until a location fix arrives (Tashkent).
pub const DEFAULT_CENTER: (f64, f64) = (41.311081, 69.280737);

/// Standard programmatic ease duration.
pub const ANIMATE_DURATION_MS: u64 = 450;

/// Duration of a `zoom_in`/`zoom_out` step.
pub const ZOOM_DURATION_MS: u64 = 250;

/// Duration of the deferred recenter replayed after a mid-flight padding change.
pub const RECENTER_DURATION_MS: u64 = 300;

/// Duration of an animated bounds fit.
pub const FIT_DURATION_MS: u64 = 400;

/// Extra inset, in device-independent units, always added when framing a
/// set of points.
pub const FIT_INSET: f64 = 24.0;
