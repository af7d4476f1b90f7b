//! Unit tests for fo-sample.

use fo_core::{GeoPoint, SimConfig, SimRng, ZoneId};
use fo_input::{OdStatistics, OdTable, ZoneTable};
use fo_model::{
    CellPhase, INTRA_ZONE_DISTANCE_KM, ModelError, Stage, TrafficSystem, TrafficSystemBuilder,
};
use fo_prob::calc_prob_dists;

use crate::{NoopObserver, SampleError, SampleObserver, sample_traffic};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn line_zones(n: u32) -> ZoneTable {
    ZoneTable::new((0..n).map(|i| (i, GeoPoint::new(0.0, 0.01 * f64::from(i))))).unwrap()
}

fn uniform_tables(n: u32, value: f64) -> Vec<OdTable> {
    let mut table = OdTable::new();
    for s in 0..n {
        for d in 0..n {
            table.insert(s, d, value);
        }
    }
    vec![table; 24]
}

/// `n` zones, every pair observed every hour, probabilities built.
fn ready_system(n: u32, od: OdStatistics, config: SimConfig) -> TrafficSystem {
    let mut tfs = TrafficSystemBuilder::new(line_zones(n))
        .od_statistics(od)
        .config(config)
        .build()
        .unwrap();
    tfs.create_datatensors().unwrap();
    calc_prob_dists(&mut tfs).unwrap();
    tfs
}

fn uniform_system(n: u32, mean: f64) -> TrafficSystem {
    ready_system(n, OdStatistics::new(uniform_tables(n, mean), None), SimConfig::default())
}

fn sampled(mut tfs: TrafficSystem, seed: u64) -> TrafficSystem {
    sample_traffic(&mut tfs, &mut SimRng::new(seed), &mut NoopObserver).unwrap();
    tfs
}

// ── Fleet allocation ──────────────────────────────────────────────────────────

#[cfg(test)]
mod allocation {
    use crate::stages::allocate_fleet;

    #[test]
    fn sums_to_fleet() {
        let counts = allocate_fleet(1_000, &[0.3, 0.3, 0.3]);
        assert_eq!(counts.iter().sum::<u64>(), 1_000);
        // 333.33 each; the lowest index takes the extra vehicle
        assert_eq!(counts, vec![334, 333, 333]);
    }

    #[test]
    fn proportional_to_weights() {
        assert_eq!(allocate_fleet(100, &[1.0, 3.0]), vec![25, 75]);
    }

    #[test]
    fn largest_remainder_wins() {
        // quotas 1.2, 2.7, 6.1 → floors 1, 2, 6; the one spare goes to 2.7
        assert_eq!(allocate_fleet(10, &[1.2, 2.7, 6.1]), vec![1, 3, 6]);
    }

    #[test]
    fn zero_weights_spread_evenly() {
        assert_eq!(allocate_fleet(7, &[0.0, 0.0]), vec![4, 3]);
    }

    #[test]
    fn no_zones_no_counts() {
        assert!(allocate_fleet(7, &[]).is_empty());
    }
}

// ── Initial value problem ─────────────────────────────────────────────────────

#[cfg(test)]
mod initial_value {
    use super::*;
    use crate::solve_initial_value_problem;

    #[test]
    fn requires_probabilities() {
        let mut tfs = TrafficSystemBuilder::new(line_zones(2))
            .od_statistics(OdStatistics::new(uniform_tables(2, 10.0), None))
            .build()
            .unwrap();
        tfs.create_datatensors().unwrap();
        let err = solve_initial_value_problem(&mut tfs).unwrap_err();
        assert!(matches!(err, SampleError::Model(ModelError::Uninitialized(_))));
    }

    #[test]
    fn fills_first_column_with_fleet() {
        let mut tfs = uniform_system(5, 10.0);
        solve_initial_value_problem(&mut tfs).unwrap();
        let t = tfs.tensors().unwrap();
        assert_eq!(t.vehicles_parked(0), 1_000);
        // uniform activity → equal split
        assert!(t.state_at(0).iter().all(|&n| n == 200));
        assert_eq!(t.vehicles_parked(1), 0);
    }
}

// ── Full run ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run {
    use super::*;

    #[test]
    fn first_and_last_state_differ_from_default() {
        let tfs = sampled(uniform_system(5, 10.0), 1);
        let t = tfs.tensors().unwrap();
        assert!(t.state_at(0).iter().any(|&n| n > 0));
        assert!(t.state_at(23).iter().any(|&n| n > 0));
        assert_eq!(tfs.stage(), Stage::Sampled);
    }

    #[test]
    fn final_state_holds_whole_fleet() {
        let tfs = sampled(uniform_system(5, 900.0), 2);
        let t = tfs.tensors().unwrap();
        assert_eq!(t.vehicles_parked(23), tfs.config().fleet_size);
        assert_eq!(tfs.vehicles_in_transit(23), 0);
    }

    #[test]
    fn every_cell_leaves_idle() {
        let tfs = sampled(uniform_system(4, 10.0), 3);
        let t = tfs.tensors().unwrap();
        for cell in t.transition.iter() {
            assert!(matches!(cell.phase, CellPhase::Parked | CellPhase::Committed));
            if cell.phase == CellPhase::Committed {
                assert!(cell.driving > 0);
                assert!(cell.destination.is_valid());
            }
        }
    }

    #[test]
    fn travel_fields_non_negative() {
        let n = 4;
        let od = OdStatistics::new(uniform_tables(n, 30.0), Some(uniform_tables(n, 600.0)));
        let tfs = sampled(ready_system(n, od, SimConfig::default()), 4);
        let t = tfs.tensors().unwrap();
        assert!(t.transition.iter().all(|c| c.travel_time >= 0.0 && c.travel_distance >= 0.0));
    }

    #[test]
    fn deterministic_travel_uses_mean() {
        let tfs = sampled(uniform_system(3, 10.0), 5);
        let t = tfs.tensors().unwrap();
        for ((z, _), cell) in t.transition.indexed_iter().filter(|(_, c)| c.is_committed()) {
            assert_eq!(cell.travel_time, 10.0);
            let table = tfs.od_distances()[[z, cell.destination.index()]];
            assert!((cell.travel_distance - table).abs() < 1e-12);
        }
    }

    #[test]
    fn perturbed_distance_scales_with_time() {
        let n = 3;
        let od = OdStatistics::new(uniform_tables(n, 600.0), Some(uniform_tables(n, 60.0)));
        let tfs = sampled(ready_system(n, od, SimConfig::default()), 6);
        let t = tfs.tensors().unwrap();
        for ((z, _), cell) in t.transition.indexed_iter().filter(|(_, c)| c.is_committed()) {
            let table = tfs.od_distances()[[z, cell.destination.index()]];
            let expected = (table * cell.travel_time / 600.0).max(INTRA_ZONE_DISTANCE_KM);
            assert!((cell.travel_distance - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn clamped_draws_keep_positive_distance() {
        // std far above the mean: many draws fall below zero
        let n = 2;
        let od = OdStatistics::new(uniform_tables(n, 60.0), Some(uniform_tables(n, 600.0)));
        let tfs = sampled(ready_system(n, od, SimConfig::default()), 7);
        let t = tfs.tensors().unwrap();

        let committed: Vec<_> = t.transition.iter().filter(|c| c.is_committed()).collect();
        assert!(committed.iter().any(|c| c.travel_time == 0.0));
        for cell in committed {
            assert!(cell.travel_distance >= INTRA_ZONE_DISTANCE_KM);
        }
    }

    #[test]
    fn idle_final_step_is_an_error() {
        // a single vehicle often stays parked through the last step
        let config = SimConfig { fleet_size: 1, ..SimConfig::default() };
        let mut stale = 0;
        for seed in 0..50 {
            let od = OdStatistics::new(uniform_tables(2, 600.0), None);
            let mut tfs = ready_system(2, od, config.clone());
            match sample_traffic(&mut tfs, &mut SimRng::new(seed), &mut NoopObserver) {
                Ok(()) => assert!(tfs.tensors().unwrap().departures(23) > 0),
                Err(SampleError::StaleFinalStep { step: 23, tensor: "transition" }) => {
                    stale += 1;
                    assert_ne!(tfs.stage(), Stage::Sampled);
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(stale > 0);
    }

    #[test]
    fn unperturbed_distance_is_table_value() {
        let n = 3;
        let od = OdStatistics::new(uniform_tables(n, 600.0), Some(uniform_tables(n, 60.0)));
        let config = SimConfig { perturb_distance: false, ..SimConfig::default() };
        let tfs = sampled(ready_system(n, od, config), 7);
        let t = tfs.tensors().unwrap();
        for ((z, _), cell) in t.transition.indexed_iter().filter(|(_, c)| c.is_committed()) {
            assert_eq!(cell.travel_distance, tfs.od_distances()[[z, cell.destination.index()]]);
        }
    }

    #[test]
    fn unobserved_pairs_use_fallback_speed() {
        // only hour 8 observed; every other hour routes by distance
        let mut mean = vec![OdTable::new(); 24];
        mean[8].insert(0, 1, 100.0);
        let config = SimConfig { fleet_size: 5_000, min_drive_probability: 0.3, ..SimConfig::default() };
        let tfs = sampled(ready_system(2, OdStatistics::new(mean, None), config.clone()), 8);
        let t = tfs.tensors().unwrap();
        let cell = t.transition[[0, 3]];
        assert!(cell.is_committed());
        let km = tfs.od_distances()[[0, cell.destination.index()]];
        let expected = km / config.fallback_speed_kmh * 3_600.0;
        assert!((cell.travel_time - expected).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_result() {
        let a = sampled(uniform_system(5, 900.0), 42);
        let b = sampled(uniform_system(5, 900.0), 42);
        assert_eq!(a.tensors().unwrap(), b.tensors().unwrap());
    }

    #[test]
    fn different_seed_different_result() {
        let a = sampled(uniform_system(5, 900.0), 1);
        let b = sampled(uniform_system(5, 900.0), 2);
        assert_ne!(a.tensors().unwrap().state, b.tensors().unwrap().state);
    }

    #[test]
    fn resampling_starts_from_scratch() {
        let mut tfs = sampled(uniform_system(4, 900.0), 9);
        sample_traffic(&mut tfs, &mut SimRng::new(9), &mut NoopObserver).unwrap();
        let again = sampled(uniform_system(4, 900.0), 9);
        assert_eq!(tfs.tensors().unwrap(), again.tensors().unwrap());
    }

    #[test]
    fn requires_probabilities() {
        let mut tfs = TrafficSystemBuilder::new(line_zones(2))
            .od_statistics(OdStatistics::new(uniform_tables(2, 10.0), None))
            .build()
            .unwrap();
        tfs.create_datatensors().unwrap();
        let err = sample_traffic(&mut tfs, &mut SimRng::new(0), &mut NoopObserver).unwrap_err();
        assert!(matches!(err, SampleError::Model(ModelError::Uninitialized(_))));
    }

    #[test]
    fn recreating_tensors_clears_samples() {
        let mut tfs = sampled(uniform_system(3, 10.0), 10);
        tfs.create_datatensors().unwrap();
        let t = tfs.tensors().unwrap();
        assert!(t.state.iter().all(|&n| n == 0));
        assert!(t.transition.iter().all(|c| c.phase == CellPhase::Idle));
        assert_eq!(tfs.stage(), Stage::Allocated);
    }
}

// ── Staged stepping ───────────────────────────────────────────────────────────

#[cfg(test)]
mod staged {
    use super::*;
    use crate::{
        destination_choice_sampling, driving_activity_sampling, propagate_occupancy,
        solve_initial_value_problem, traveltime_and_distance_sampling,
    };

    #[test]
    fn stages_in_order_commit_a_step() {
        let mut tfs = uniform_system(3, 10.0);
        let mut rng = SimRng::new(11);
        solve_initial_value_problem(&mut tfs).unwrap();
        driving_activity_sampling(&mut tfs, 0, &mut rng).unwrap();
        destination_choice_sampling(&mut tfs, 0, &mut rng).unwrap();
        traveltime_and_distance_sampling(&mut tfs, 0, &mut rng).unwrap();
        propagate_occupancy(&mut tfs, 0).unwrap();

        let t = tfs.tensors().unwrap();
        let departed = t.departures(0);
        assert_eq!(t.vehicles_parked(0) + departed, 1_000);
        // 10 s trips arrive one step later
        assert_eq!(t.vehicles_parked(1), 1_000);
    }

    #[test]
    fn destination_before_driving_is_rejected() {
        let mut tfs = uniform_system(2, 10.0);
        let err = destination_choice_sampling(&mut tfs, 0, &mut SimRng::new(0)).unwrap_err();
        assert!(matches!(
            err,
            SampleError::Model(ModelError::OutOfOrder { found: CellPhase::Idle, .. })
        ));
    }

    #[test]
    fn driving_twice_is_rejected() {
        let mut tfs = uniform_system(2, 10.0);
        let mut rng = SimRng::new(0);
        solve_initial_value_problem(&mut tfs).unwrap();
        driving_activity_sampling(&mut tfs, 0, &mut rng).unwrap();
        let err = driving_activity_sampling(&mut tfs, 0, &mut rng).unwrap_err();
        assert!(matches!(err, SampleError::Model(ModelError::OutOfOrder { .. })));
    }

    #[test]
    fn propagation_needs_committed_cells() {
        let mut tfs = uniform_system(2, 10.0);
        let err = propagate_occupancy(&mut tfs, 0).unwrap_err();
        assert!(matches!(
            err,
            SampleError::Model(ModelError::OutOfOrder { expected: CellPhase::Committed, .. })
        ));
    }

    #[test]
    fn step_outside_horizon() {
        let mut tfs = uniform_system(2, 10.0);
        let err = driving_activity_sampling(&mut tfs, 24, &mut SimRng::new(0)).unwrap_err();
        assert!(matches!(err, SampleError::StepOutOfRange { step: 24, steps: 24 }));
    }

    #[test]
    fn empty_zone_never_departs() {
        let mut tfs = uniform_system(2, 10.0);
        driving_activity_sampling(&mut tfs, 0, &mut SimRng::new(0)).unwrap();
        let t = tfs.tensors().unwrap();
        assert_eq!(t.transition[[0, 0]].phase, CellPhase::Parked);
        assert_eq!(t.transition[[1, 0]].driving, 0);
        assert_eq!(t.transition[[1, 0]].destination, ZoneId::INVALID);
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer {
    use super::*;
    use fo_model::DataTensors;

    #[derive(Default)]
    struct Recorder {
        started:    Option<(usize, usize)>,
        steps:      Vec<usize>,
        departures: Vec<u64>,
        ended:      bool,
    }

    impl SampleObserver for Recorder {
        fn on_run_start(&mut self, zones: usize, steps: usize) {
            self.started = Some((zones, steps));
        }
        fn on_step_start(&mut self, step: usize) {
            self.steps.push(step);
        }
        fn on_step_end(&mut self, step: usize, tensors: &DataTensors) {
            self.departures.push(tensors.departures(step));
        }
        fn on_run_end(&mut self, _tensors: &DataTensors) {
            self.ended = true;
        }
    }

    #[test]
    fn hooks_fire_every_step() {
        let mut tfs = uniform_system(3, 10.0);
        let mut rec = Recorder::default();
        sample_traffic(&mut tfs, &mut SimRng::new(12), &mut rec).unwrap();

        assert_eq!(rec.started, Some((3, 24)));
        assert_eq!(rec.steps, (0..24).collect::<Vec<_>>());
        assert!(rec.ended);
        let total: u64 = rec.departures.iter().sum();
        let t = tfs.tensors().unwrap();
        assert_eq!(total, (0..24).map(|s| t.departures(s)).sum::<u64>());
        assert!(total > 0);
    }
}
