//! Normalized per-zone occupancy maps.

use std::fmt;

use ndarray::Array1;

/// Which of the three occupancy maps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKind {
    Parking,
    Driving,
    Charging,
}

impl MapKind {
    pub const ALL: [MapKind; 3] = [MapKind::Parking, MapKind::Driving, MapKind::Charging];

    pub fn as_str(self) -> &'static str {
        match self {
            MapKind::Parking => "parking_map",
            MapKind::Driving => "driving_map",
            MapKind::Charging => "charging_map",
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The final product of a run: three zone-indexed distributions, each
/// non-negative and summing to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyMaps {
    pub parking:  Array1<f64>,
    pub driving:  Array1<f64>,
    pub charging: Array1<f64>,
}

impl OccupancyMaps {
    #[inline]
    pub fn get(&self, kind: MapKind) -> &Array1<f64> {
        match kind {
            MapKind::Parking => &self.parking,
            MapKind::Driving => &self.driving,
            MapKind::Charging => &self.charging,
        }
    }

    pub fn number_zones(&self) -> usize {
        self.parking.len()
    }
}
