//! Unit tests for fo-model.

use fo_core::{GeoPoint, SimConfig, ZoneId};
use fo_input::{OdStatistics, OdTable, ZoneTable};

use crate::{TrafficSystem, TrafficSystemBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `n` zones 0.01° apart along the equator, keys 100, 101, ...
fn line_zones(n: u32) -> ZoneTable {
    ZoneTable::new((0..n).map(|i| (100 + i, GeoPoint::new(0.0, 0.01 * f64::from(i))))).unwrap()
}

/// Every pair observed every hour with the same mean.
fn uniform_tables(zones: &ZoneTable, value: f64) -> Vec<OdTable> {
    let mut table = OdTable::new();
    for &s in zones.keys() {
        for &d in zones.keys() {
            table.insert(s, d, value);
        }
    }
    vec![table; 24]
}

fn uniform_od(zones: &ZoneTable, mean: f64) -> OdStatistics {
    OdStatistics::new(uniform_tables(zones, mean), None)
}

fn system(n: u32) -> TrafficSystem {
    let zones = line_zones(n);
    let od = uniform_od(&zones, 600.0);
    TrafficSystemBuilder::new(zones).od_statistics(od).build().unwrap()
}

// ── Distances ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod distances {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{INTRA_ZONE_DISTANCE_KM, compute_od_distances};

    #[test]
    fn square_symmetric_unit_diagonal() {
        let d = compute_od_distances(&line_zones(5));
        assert_eq!(d.dim(), (5, 5));
        for a in 0..5 {
            assert_eq!(d[[a, a]], INTRA_ZONE_DISTANCE_KM);
            for b in 0..5 {
                assert_eq!(d[[a, b]], d[[b, a]]);
                if a != b {
                    assert!(d[[a, b]] > 0.0);
                }
            }
        }
    }

    #[test]
    fn neighbour_distance_is_great_circle() {
        // 0.01° of longitude at the equator ≈ 1.112 km
        let d = compute_od_distances(&line_zones(2));
        assert_relative_eq!(d[[0, 1]], 1.112, epsilon = 0.01);
    }

    #[test]
    fn coincident_centroids_get_floor() {
        let zones = ZoneTable::new([(1, GeoPoint::new(1.0, 1.0)), (2, GeoPoint::new(1.0, 1.0))]).unwrap();
        let d = compute_od_distances(&zones);
        assert_eq!(d[[0, 1]], INTRA_ZONE_DISTANCE_KM);
    }

    #[test]
    fn distances_available_without_od() {
        let tfs = TrafficSystemBuilder::new(line_zones(3)).build().unwrap();
        assert_eq!(tfs.od_distances().dim(), (3, 3));
        assert_eq!(tfs.number_zones(), 3);
    }
}

// ── Builder validation ────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::*;
    use crate::ModelError;

    #[test]
    fn rejects_empty_zone_table() {
        let zones = ZoneTable::new(std::iter::empty()).unwrap();
        let err = TrafficSystemBuilder::new(zones).build().unwrap_err();
        assert!(matches!(err, ModelError::NoZones));
    }

    #[test]
    fn rejects_wrong_table_count() {
        let zones = line_zones(3);
        let mut mean = uniform_tables(&zones, 10.0);
        mean.pop();
        let err = TrafficSystemBuilder::new(zones)
            .od_statistics(OdStatistics::new(mean, None))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 24, got: 23, .. }));
    }

    #[test]
    fn rejects_std_count_mismatch() {
        let zones = line_zones(3);
        let mean = uniform_tables(&zones, 10.0);
        let mut std = uniform_tables(&zones, 1.0);
        std.truncate(12);
        let err = TrafficSystemBuilder::new(zones)
            .od_statistics(OdStatistics::new(mean, Some(std)))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 24, got: 12, .. }));
    }

    #[test]
    fn rejects_std_key_mismatch() {
        let zones = line_zones(3);
        let mean = uniform_tables(&zones, 10.0);
        let mut std = uniform_tables(&zones, 1.0);
        std[5] = OdTable::new();
        let err = TrafficSystemBuilder::new(zones)
            .od_statistics(OdStatistics::new(mean, Some(std)))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::KeyMismatch { hour: 5 }));
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn rejects_zone_key_absent_from_zone_table() {
        let zones = line_zones(3);
        let mut mean = uniform_tables(&zones, 10.0);
        mean[0].insert(100, 999, 10.0);
        let err = TrafficSystemBuilder::new(zones)
            .od_statistics(OdStatistics::new(mean, None))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::ZoneKeyMismatch { hour: 0, key: 999 }));
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn rejects_negative_travel_time() {
        let zones = line_zones(3);
        let mut mean = uniform_tables(&zones, 10.0);
        mean[3].insert(100, 101, -1.0);
        let err = TrafficSystemBuilder::new(zones)
            .od_statistics(OdStatistics::new(mean, None))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidTravelTime { hour: 3, origin: 100, dest: 101, .. }));
        assert!(!err.is_shape_mismatch());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = SimConfig { fleet_size: 0, ..SimConfig::default() };
        let err = TrafficSystemBuilder::new(line_zones(2)).config(config).build().unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn finer_grid_sets_total_steps() {
        let config = SimConfig { steps_per_hour: 4, ..SimConfig::default() };
        let tfs = TrafficSystemBuilder::new(line_zones(2)).config(config).build().unwrap();
        assert_eq!(tfs.total_steps(), 96);
    }
}

// ── Tensor lifecycle ──────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;
    use crate::{ModelError, Stage};

    #[test]
    fn tensors_uninitialized_before_create() {
        let mut tfs = system(3);
        assert_eq!(tfs.stage(), Stage::Empty);
        assert!(matches!(tfs.tensors(), Err(ModelError::Uninitialized(_))));
        assert!(tfs.tensors_mut().is_err());
    }

    #[test]
    fn create_allocates_zeroed_shapes() {
        let mut tfs = system(4);
        tfs.create_datatensors().unwrap();
        assert_eq!(tfs.stage(), Stage::Allocated);
        assert!(!tfs.has_pending_od());

        let t = tfs.tensors().unwrap();
        assert_eq!(t.p_drive.dim(), (4, 24));
        assert_eq!(t.p_dest.dim(), (4, 4, 24));
        assert_eq!(t.p_joint.dim(), (4, 4, 24));
        assert_eq!(t.transition.dim(), (4, 24));
        assert_eq!(t.state.dim(), (4, 24));
        assert!(t.state.iter().all(|&v| v == 0));
        assert!(t.p_drive.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn distance_only_model_cannot_create_tensors() {
        let mut tfs = TrafficSystemBuilder::new(line_zones(2))
            .od_statistics(OdStatistics::default())
            .build()
            .unwrap();
        assert!(matches!(tfs.create_datatensors(), Err(ModelError::NoOdStatistics)));
    }

    #[test]
    fn second_create_resets_everything() {
        let mut tfs = system(3);
        tfs.create_datatensors().unwrap();
        {
            let mut view = tfs.tensors_mut().unwrap();
            view.tensors.state[[0, 0]] = 7;
            view.tensors.p_drive[[1, 2]] = 0.5;
            view.tensors.record_driving(ZoneId(0), 0, 3).unwrap();
        }
        tfs.mark_stage(Stage::Sampled);

        tfs.create_datatensors().unwrap();
        let t = tfs.tensors().unwrap();
        assert_eq!(tfs.stage(), Stage::Allocated);
        assert_eq!(t.state[[0, 0]], 0);
        assert_eq!(t.p_drive[[1, 2]], 0.0);
        assert_eq!(t.transition[[0, 0]], crate::Transition::default());
    }

    #[test]
    fn replaced_statistics_apply_on_next_create() {
        let mut tfs = system(2);
        tfs.create_datatensors().unwrap();
        let h = ZoneId(0);
        assert_eq!(tfs.travel_times().unwrap().mean(h, ZoneId(1), 0), Some(600.0));

        let od = uniform_od(tfs.zones(), 90.0);
        tfs.replace_od_statistics(od).unwrap();
        assert!(tfs.has_pending_od());
        // old statistics until the tensors are recreated
        assert_eq!(tfs.travel_times().unwrap().mean(h, ZoneId(1), 0), Some(600.0));

        tfs.create_datatensors().unwrap();
        assert_eq!(tfs.travel_times().unwrap().mean(h, ZoneId(1), 0), Some(90.0));
    }

    #[test]
    fn mark_stage_needs_tensors() {
        let mut tfs = system(2);
        tfs.mark_stage(Stage::Sampled);
        assert_eq!(tfs.stage(), Stage::Empty);
    }

    #[test]
    fn nothing_in_transit_before_sampling() {
        let mut tfs = system(2);
        tfs.create_datatensors().unwrap();
        assert_eq!(tfs.vehicles_in_transit(0), 0);
    }
}

// ── Transition cells ──────────────────────────────────────────────────────────

#[cfg(test)]
mod transitions {
    use super::*;
    use crate::{CellPhase, DataTensors, ModelError};

    #[test]
    fn departed_cell_walks_all_phases() {
        let mut t = DataTensors::zeroed(2, 24);
        t.record_driving(ZoneId(0), 3, 5).unwrap();
        assert_eq!(t.transition[[0, 3]].phase, CellPhase::Departed);
        t.record_destination(ZoneId(0), 3, ZoneId(1)).unwrap();
        assert_eq!(t.transition[[0, 3]].phase, CellPhase::Routed);
        t.record_travel(ZoneId(0), 3, 120.0, 2.5).unwrap();

        let cell = t.transition[[0, 3]];
        assert!(cell.is_committed());
        assert_eq!(cell.driving, 5);
        assert_eq!(cell.destination, ZoneId(1));
        assert_eq!(cell.travel_time, 120.0);
        assert_eq!(cell.travel_distance, 2.5);
        assert_eq!(t.departures(3), 5);
    }

    #[test]
    fn zero_departures_park_the_cell() {
        let mut t = DataTensors::zeroed(1, 24);
        t.record_driving(ZoneId(0), 0, 0).unwrap();
        assert_eq!(t.transition[[0, 0]].phase, CellPhase::Parked);
        let err = t.record_destination(ZoneId(0), 0, ZoneId(0)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::OutOfOrder { expected: CellPhase::Departed, found: CellPhase::Parked, .. }
        ));
    }

    #[test]
    fn fields_are_written_once_in_order() {
        let mut t = DataTensors::zeroed(1, 24);
        assert!(t.record_travel(ZoneId(0), 0, 1.0, 1.0).is_err());
        t.record_driving(ZoneId(0), 0, 2).unwrap();
        assert!(t.record_driving(ZoneId(0), 0, 4).is_err());
        assert_eq!(t.transition[[0, 0]].driving, 2);
    }

    #[test]
    fn travel_is_clamped_non_negative() {
        let mut t = DataTensors::zeroed(1, 24);
        t.record_driving(ZoneId(0), 0, 1).unwrap();
        t.record_destination(ZoneId(0), 0, ZoneId(0)).unwrap();
        t.record_travel(ZoneId(0), 0, -30.0, -0.1).unwrap();
        assert_eq!(t.transition[[0, 0]].travel_time, 0.0);
        assert_eq!(t.transition[[0, 0]].travel_distance, 0.0);
    }

    #[test]
    fn vehicles_parked_sums_zones() {
        let mut t = DataTensors::zeroed(3, 24);
        t.state[[0, 4]] = 2;
        t.state[[2, 4]] = 5;
        assert_eq!(t.vehicles_parked(4), 7);
        assert_eq!(t.vehicles_parked(5), 0);
    }
}

// ── Travel times ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod travel_times {
    use super::*;
    use crate::TravelTimeSpread;

    fn sparse_system(with_std: bool) -> TrafficSystem {
        let zones = line_zones(3);
        let mut mean = vec![OdTable::new(); 24];
        let mut std = vec![OdTable::new(); 24];
        mean[8].insert(100, 102, 300.0);
        mean[8].insert(100, 101, 200.0);
        std[8].insert(100, 102, 30.0);
        std[8].insert(100, 101, 20.0);
        let od = OdStatistics::new(mean, with_std.then_some(std));
        let mut tfs = TrafficSystemBuilder::new(zones).od_statistics(od).build().unwrap();
        tfs.create_datatensors().unwrap();
        tfs
    }

    #[test]
    fn keys_map_to_dense_ids() {
        let tfs = sparse_system(true);
        let tt = tfs.travel_times().unwrap();
        assert_eq!(tt.mean(ZoneId(0), ZoneId(2), 8), Some(300.0));
        assert_eq!(tt.std(ZoneId(0), ZoneId(2), 8), 30.0);
        assert_eq!(tt.mean(ZoneId(2), ZoneId(0), 8), None);
        assert_eq!(tt.mean(ZoneId(0), ZoneId(2), 9), None);
    }

    #[test]
    fn observed_destinations_counts_pairs() {
        let tfs = sparse_system(false);
        let tt = tfs.travel_times().unwrap();
        assert_eq!(tt.observed_destinations(ZoneId(0), 8), 2);
        assert_eq!(tt.observed_destinations(ZoneId(1), 8), 0);
        let dsts: Vec<_> = tt.observed_from(ZoneId(0), 8).map(|(d, _)| d).collect();
        assert_eq!(dsts, vec![ZoneId(1), ZoneId(2)]);
    }

    #[test]
    fn absent_std_is_deterministic() {
        let tfs = sparse_system(false);
        let tt = tfs.travel_times().unwrap();
        assert_eq!(*tt.spread(), TravelTimeSpread::Deterministic);
        assert_eq!(tt.std(ZoneId(0), ZoneId(2), 8), 0.0);
    }
}
