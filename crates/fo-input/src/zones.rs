//! Zone geometry summary: opaque zone keys and their centroids.

use std::collections::HashMap;

use fo_core::{GeoPoint, ZoneId};

use crate::{InputError, InputResult};

/// The set of zones of one city.
///
/// Zones are stored sorted by their external key; the position of a zone in
/// that order is its [`ZoneId`], i.e. its row in every simulation tensor.
/// The set is fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTable {
    keys:      Vec<u32>,
    centroids: Vec<GeoPoint>,
}

impl ZoneTable {
    /// Build a table from `(zone_key, centroid)` rows in any order.
    ///
    /// # Errors
    ///
    /// [`InputError::DuplicateZone`] if a key appears twice.
    pub fn new<I>(rows: I) -> InputResult<Self>
    where
        I: IntoIterator<Item = (u32, GeoPoint)>,
    {
        let mut rows: Vec<(u32, GeoPoint)> = rows.into_iter().collect();
        rows.sort_by_key(|(key, _)| *key);
        if let Some(w) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(InputError::DuplicateZone(w[0].0));
        }
        let (keys, centroids) = rows.into_iter().unzip();
        Ok(Self { keys, centroids })
    }

    /// Build a table from zone boundary coordinates, using the mean of each
    /// zone's boundary points as its centroid.
    ///
    /// Zones with an empty boundary are skipped.
    pub fn from_polygons(boundaries: &HashMap<u32, Vec<GeoPoint>>) -> InputResult<Self> {
        Self::new(
            boundaries
                .iter()
                .filter_map(|(&key, pts)| GeoPoint::mean_of(pts).map(|c| (key, c))),
        )
    }

    /// Number of zones (`number_zones`).
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The dense `ZoneId` of an external zone key.
    pub fn zone_id(&self, key: u32) -> Option<ZoneId> {
        self.keys
            .binary_search(&key)
            .ok()
            .map(|i| ZoneId(i as u32))
    }

    /// The external key of `zone`.
    ///
    /// # Panics
    ///
    /// Panics if `zone` is out of range.
    #[inline]
    pub fn key(&self, zone: ZoneId) -> u32 {
        self.keys[zone.index()]
    }

    #[inline]
    pub fn centroid(&self, zone: ZoneId) -> GeoPoint {
        self.centroids[zone.index()]
    }

    /// All external keys, in `ZoneId` order.
    #[inline]
    pub fn keys(&self) -> &[u32] {
        &self.keys
    }

    /// All centroids, in `ZoneId` order.
    #[inline]
    pub fn centroids(&self) -> &[GeoPoint] {
        &self.centroids
    }

    /// Iterate `(ZoneId, key, centroid)` in `ZoneId` order.
    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, u32, GeoPoint)> + '_ {
        self.keys
            .iter()
            .zip(&self.centroids)
            .enumerate()
            .map(|(i, (&k, &c))| (ZoneId(i as u32), k, c))
    }
}
