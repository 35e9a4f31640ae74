use crate::prelude::HashSet;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web Mercator projection constants
const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.0511287798;

/// Pixel width of the world at zoom 0.
const WORLD_PIXELS: f64 = 256.0;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Sentinel for "no fix yet". Must be filtered out of any multi-point
    /// calculation (bounds, distinct-by-coordinate).
    pub const ZERO: GeoPoint = GeoPoint { lat: 0.0, lng: 0.0 };

    /// Creates a new GeoPoint coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether this is the "no fix" sentinel
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Calculates the distance to another point in meters (Haversine)
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the Web Mercator range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Projects to world pixel coordinates at the given zoom level (EPSG:3857)
    pub fn to_world_pixel(&self, zoom: f64) -> (f64, f64) {
        let scale = WORLD_PIXELS * 2_f64.powf(zoom);

        let x = self.lng.to_radians() * EARTH_RADIUS;
        let y = ((PI / 4.0 + Self::clamp_lat(self.lat).to_radians() / 2.0).tan().ln())
            * EARTH_RADIUS;

        let pixel_x = (x + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;
        let pixel_y = (-y + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;

        (pixel_x, pixel_y)
    }

    /// Creates a GeoPoint from world pixel coordinates at the given zoom level
    pub fn from_world_pixel(pixel_x: f64, pixel_y: f64, zoom: f64) -> Self {
        let scale = WORLD_PIXELS * 2_f64.powf(zoom);

        let x = (pixel_x / scale) * (2.0 * PI * EARTH_RADIUS) - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel_y / scale) * (2.0 * PI * EARTH_RADIUS);

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Self::new(lat, lng)
    }

    /// Filters out the ZERO sentinel and duplicate coordinates, preserving
    /// first-seen order
    pub fn distinct(points: &[GeoPoint]) -> Vec<GeoPoint> {
        let mut seen: HashSet<(u64, u64)> = HashSet::default();
        points
            .iter()
            .filter(|p| !p.is_zero())
            .filter(|p| seen.insert((p.lat.to_bits(), p.lng.to_bits())))
            .copied()
            .collect()
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    pub fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Builds the smallest bounds containing every usable point.
    /// The ZERO sentinel is ignored; returns None if nothing remains.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let mut iter = points.iter().filter(|p| !p.is_zero());
        let first = iter.next()?;
        let mut bounds = Self::new(*first, *first);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &GeoPoint) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Gets the span of the bounds
    pub fn span(&self) -> GeoPoint {
        GeoPoint::new(
            self.north_east.lat - self.south_west.lat,
            self.north_east.lng - self.south_west.lng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_creation() {
        let coord = GeoPoint::new(41.311081, 69.280737);
        assert_eq!(coord.lat, 41.311081);
        assert_eq!(coord.lng, 69.280737);
        assert!(coord.is_valid());
        assert!(!coord.is_zero());
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(GeoPoint::ZERO.is_zero());
        assert!(GeoPoint::default().is_zero());
        assert!(!GeoPoint::new(0.0, 0.1).is_zero());
    }

    #[test]
    fn test_distance() {
        let tashkent = GeoPoint::new(41.311081, 69.280737);
        let samarkand = GeoPoint::new(39.654388, 66.975643);
        let distance = tashkent.distance_to(&samarkand);

        // Roughly 265 km apart
        assert!((distance - 265_000.0).abs() < 10_000.0);
    }

    #[test]
    fn test_world_pixel_round_trip() {
        let point = GeoPoint::new(41.311081, 69.280737);
        let (x, y) = point.to_world_pixel(12.0);
        let back = GeoPoint::from_world_pixel(x, y, 12.0);

        assert!((back.lat - point.lat).abs() < 1e-6);
        assert!((back.lng - point.lng).abs() < 1e-6);
    }

    #[test]
    fn test_distinct_filters_zero_and_duplicates() {
        let a = GeoPoint::new(41.31, 69.28);
        let b = GeoPoint::new(41.32, 69.29);
        let distinct = GeoPoint::distinct(&[a, GeoPoint::ZERO, b, a, b]);
        assert_eq!(distinct, vec![a, b]);
    }

    #[test]
    fn test_bounds_from_points() {
        let a = GeoPoint::new(41.30, 69.27);
        let b = GeoPoint::new(41.32, 69.29);
        let bounds = GeoBounds::from_points(&[a, b, GeoPoint::ZERO]).unwrap();

        assert_eq!(bounds.south_west, a);
        assert_eq!(bounds.north_east, b);
        assert!(bounds.contains(&GeoPoint::new(41.31, 69.28)));
    }

    #[test]
    fn test_bounds_from_no_usable_points() {
        assert!(GeoBounds::from_points(&[]).is_none());
        assert!(GeoBounds::from_points(&[GeoPoint::ZERO]).is_none());
    }

    #[test]
    fn test_wrap_lng() {
        assert_eq!(GeoPoint::wrap_lng(190.0), -170.0);
        assert_eq!(GeoPoint::wrap_lng(-190.0), 170.0);
        assert_eq!(GeoPoint::wrap_lng(69.28), 69.28);
    }
}
