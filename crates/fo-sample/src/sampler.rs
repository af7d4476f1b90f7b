//! The full sampling run and occupancy propagation.

use ndarray::s;
use tracing::{debug, info};

use fo_core::SimRng;
use fo_model::{CellPhase, DataTensors, Stage, TensorsMut, TrafficSystem};

use crate::stages::{check_step, out_of_order, require_probabilities};
use crate::{
    SampleError, SampleObserver, SampleResult, destination_choice_sampling,
    driving_activity_sampling, solve_initial_value_problem, traveltime_and_distance_sampling,
};

/// Sample the whole horizon from scratch.
///
/// ```text
/// reset transition and state tensors
/// solve_initial_value_problem
/// for t in 0..T:
///   ① driving_activity_sampling(t)
///   ② destination_choice_sampling(t)
///   ③ traveltime_and_distance_sampling(t)
///   ④ propagate_occupancy(t)
/// check the final step
/// ```
///
/// Moves the model to [`Stage::Sampled`] on success.
///
/// # Errors
///
/// - `ModelError::Uninitialized` if the tensors or probabilities are missing.
/// - [`SampleError::StaleFinalStep`] if the final step has no parked
///   vehicles or no departures, leaving its state or transitions unchanged.
/// - [`SampleError::Conservation`] if the final state does not hold the
///   whole fleet.
/// - Any stage error.
pub fn sample_traffic<O: SampleObserver>(
    tfs:      &mut TrafficSystem,
    rng:      &mut SimRng,
    observer: &mut O,
) -> SampleResult<()> {
    require_probabilities(tfs)?;
    tfs.mark_stage(Stage::Probabilities);
    {
        let TensorsMut { tensors, .. } = tfs.tensors_mut()?;
        tensors.reset_samples();
    }

    solve_initial_value_problem(tfs)?;

    let (zones, steps) = (tfs.number_zones(), tfs.total_steps());
    info!(zones, steps, fleet = tfs.config().fleet_size, "sampling started");
    observer.on_run_start(zones, steps);

    for t in 0..steps {
        observer.on_step_start(t);

        driving_activity_sampling(tfs, t, rng)?;
        destination_choice_sampling(tfs, t, rng)?;
        traveltime_and_distance_sampling(tfs, t, rng)?;
        propagate_occupancy(tfs, t)?;

        let tensors = tfs.tensors()?;
        debug!(
            step = t,
            departures = tensors.departures(t),
            parked = tensors.vehicles_parked(t),
            "step sampled"
        );
        observer.on_step_end(t, tensors);
    }

    check_final_step(tfs.tensors()?, tfs.config().fleet_size)?;
    tfs.mark_stage(Stage::Sampled);

    let tensors = tfs.tensors()?;
    info!(
        steps,
        departures = (0..steps).map(|t| tensors.departures(t)).sum::<u64>(),
        "sampling finished"
    );
    observer.on_run_end(tensors);
    Ok(())
}

/// Move the committed transitions of step `t` into the state tensor.
///
/// Departures leave `state[z, t]` and arrive at
/// `state[dest, min(T-1, t + steps_for_secs(travel_time))]`; what remains
/// in `state[:, t]` carries over into `state[:, t + 1]`.  Trips that would
/// end past the horizon, and every trip of the final step, land at `T-1`,
/// so the final state holds the whole fleet.
///
/// Every cell of step `t` must be `Parked` or `Committed`.
pub fn propagate_occupancy(tfs: &mut TrafficSystem, t: usize) -> SampleResult<()> {
    let TensorsMut { tensors, grid, .. } = tfs.tensors_mut()?;
    check_step(tensors, t)?;
    let last = tensors.total_steps() - 1;

    for z in 0..tensors.number_zones() {
        let cell = tensors.transition[[z, t]];
        match cell.phase {
            CellPhase::Parked => continue,
            CellPhase::Committed => {}
            found => return Err(out_of_order(z, t, CellPhase::Committed, found)),
        }

        let arrival = t.saturating_add(grid.steps_for_secs(cell.travel_time)).min(last);
        tensors.state[[z, t]] -= cell.driving;
        tensors.state[[cell.destination.index(), arrival]] += cell.driving;
    }

    if t < last {
        let (current, mut next) = tensors
            .state
            .multi_slice_mut((s![.., t], s![.., t + 1]));
        next += &current;
    }
    Ok(())
}

/// The final step must hold the whole fleet and record at least one
/// departure.
fn check_final_step(tensors: &DataTensors, fleet: u64) -> SampleResult<()> {
    let last = tensors.total_steps() - 1;
    let parked = tensors.vehicles_parked(last);
    if parked == 0 {
        return Err(SampleError::StaleFinalStep { step: last, tensor: "state" });
    }
    if parked != fleet {
        return Err(SampleError::Conservation { expected: fleet, got: parked });
    }
    if tensors.departures(last) == 0 {
        return Err(SampleError::StaleFinalStep { step: last, tensor: "transition" });
    }
    Ok(())
}
