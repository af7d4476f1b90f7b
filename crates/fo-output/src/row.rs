//! Plain data row types written by output backends.

use serde::Serialize;

use fo_core::TimeGrid;
use fo_input::ZoneTable;
use fo_model::{DataTensors, OccupancyMaps};

/// Vehicles parked in one zone at the end of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateRow {
    pub zone_id:  u32,
    pub step:     usize,
    pub hour:     u32,
    pub minute:   u32,
    pub vehicles: u64,
}

/// The sampled transition of one zone during one step.  Only cells with
/// departures produce a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionRow {
    pub zone_id:         u32,
    pub step:            usize,
    pub driving:         u64,
    pub dest_id:         u32,
    /// Seconds.
    pub travel_time:     f64,
    /// Kilometres.
    pub travel_distance: f64,
}

/// One zone of the three occupancy maps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapRow {
    pub zone_id:      u32,
    pub zone_lat:     f64,
    pub zone_long:    f64,
    pub parking_map:  f64,
    pub driving_map:  f64,
    pub charging_map: f64,
}

/// State rows of step `t`, one per zone.
pub fn state_rows(zones: &ZoneTable, grid: TimeGrid, tensors: &DataTensors, t: usize) -> Vec<StateRow> {
    let (hour, minute) = grid.clock_of(t);
    zones
        .iter()
        .map(|(zone, key, _)| StateRow {
            zone_id: key,
            step: t,
            hour,
            minute,
            vehicles: tensors.state[[zone.index(), t]],
        })
        .collect()
}

/// Transition rows of step `t` for every zone with departures.
pub fn transition_rows(zones: &ZoneTable, tensors: &DataTensors, t: usize) -> Vec<TransitionRow> {
    zones
        .iter()
        .filter_map(|(zone, key, _)| {
            let cell = tensors.transition[[zone.index(), t]];
            cell.is_committed().then(|| TransitionRow {
                zone_id:         key,
                step:            t,
                driving:         cell.driving,
                dest_id:         zones.key(cell.destination),
                travel_time:     cell.travel_time,
                travel_distance: cell.travel_distance,
            })
        })
        .collect()
}

/// One row per zone of the occupancy maps.
pub fn map_rows(zones: &ZoneTable, maps: &OccupancyMaps) -> Vec<MapRow> {
    zones
        .iter()
        .map(|(zone, key, centroid)| {
            let i = zone.index();
            MapRow {
                zone_id:      key,
                zone_lat:     centroid.lat,
                zone_long:    centroid.lon,
                parking_map:  maps.parking[i],
                driving_map:  maps.driving[i],
                charging_map: maps.charging[i],
            }
        })
        .collect()
}
