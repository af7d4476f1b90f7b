//! Geographic coordinate type and great-circle distance.
//!
//! Centroids are stored as `f64`.  Zone counts are small (hundreds to a few
//! thousand per city), so the precision costs nothing and distances feed
//! straight into the sampler's travel-distance field.

/// A WGS-84 geographic coordinate (zone centroid).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Mean Earth radius, kilometres.
    pub const EARTH_RADIUS_KM: f64 = 6_371.0;

    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Self::EARTH_RADIUS_KM * c
    }

    /// Arithmetic mean of a set of points, or `None` for an empty slice.
    ///
    /// Adequate for city zones, which are small enough that the planar mean
    /// of the boundary coordinates lies inside (or very near) the polygon.
    pub fn mean_of(points: &[GeoPoint]) -> Option<GeoPoint> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (lat, lon) = points
            .iter()
            .fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lon));
        Some(GeoPoint::new(lat / n, lon / n))
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
