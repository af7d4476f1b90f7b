//! Construction of `p_drive`, `p_dest` and `p_joint`.
//!
//! # Functional forms
//!
//! **Drive probability.**  The activity of zone `z` in hour `h` is the
//! number of destinations observed from `z` in the OD table of hour `h`.
//! The busiest zone-hour departs with `peak_drive_probability`; every other
//! zone-hour scales linearly with its activity.  An hour without any
//! observed activity gives every zone `min_drive_probability`, so each step
//! keeps a positive aggregate drive probability.  Hourly values are
//! converted to per-step values with [`TimeGrid::per_step_probability`].
//!
//! **Destination distribution.**  Observed destinations are weighted by the
//! inverse of their mean travel time (floored at one second).  A source
//! without any observed destination in that hour falls back to inverse
//! great-circle distance over all zones.  Rows with zero drive probability
//! stay zero.
//!
//! **Joint distribution.**  `p_joint[s, d, t] = p_dest[s, d, t] * p_drive[s, t]`.
//!
//! [`TimeGrid::per_step_probability`]: fo_core::TimeGrid::per_step_probability

use ndarray::{Array2, s};
use tracing::{debug, info};

use fo_core::{HOURS_PER_DAY, ZoneId};
use fo_model::{DataTensors, Stage, TensorsMut, TrafficSystem, TravelTimes};

use crate::validate::validate_distributions;
use crate::ProbResult;

/// Mean travel times below this are treated as this many seconds when
/// weighting destinations.
const MIN_TRAVEL_TIME_SECS: f64 = 1.0;

/// Build `p_drive`, `p_dest` and `p_joint` in that order and check every
/// invariant.  Moves the model to [`Stage::Probabilities`].
///
/// # Errors
///
/// - `ProbError::Model(Uninitialized)` before `create_datatensors`.
/// - `ProbError::Invariant` if a built distribution is inconsistent.
pub fn calc_prob_dists(tfs: &mut TrafficSystem) -> ProbResult<()> {
    create_distribution_p_drive(tfs)?;
    create_distribution_p_dest(tfs)?;
    create_distribution_p_joint(tfs)?;
    validate_distributions(tfs.tensors()?)?;
    tfs.mark_stage(Stage::Probabilities);
    info!(
        zones = tfs.number_zones(),
        steps = tfs.total_steps(),
        "probability distributions built"
    );
    Ok(())
}

/// Fill `p_drive` (shape `(Z, T)`) from observed OD activity.
pub fn create_distribution_p_drive(tfs: &mut TrafficSystem) -> ProbResult<()> {
    let TensorsMut { tensors, travel_times, config, grid, .. } = tfs.tensors_mut()?;
    let zones = tensors.number_zones();

    let activity = hourly_activity(travel_times, zones);
    let peak = activity.iter().copied().fold(0.0, f64::max);

    let mut hourly = Array2::<f64>::zeros((zones, HOURS_PER_DAY));
    let mut floored = 0usize;
    for h in 0..HOURS_PER_DAY {
        let observed = activity.column(h);
        if observed.sum() > 0.0 {
            for z in 0..zones {
                hourly[[z, h]] = config.peak_drive_probability * observed[z] / peak;
            }
        } else {
            hourly.column_mut(h).fill(config.min_drive_probability);
            floored += 1;
        }
    }

    for t in 0..tensors.total_steps() {
        let h = grid.hour_of(t);
        for z in 0..zones {
            tensors.p_drive[[z, t]] = grid.per_step_probability(hourly[[z, h]]);
        }
    }

    debug!(floored_hours = floored, "p_drive built");
    tfs.mark_stage(Stage::Allocated);
    Ok(())
}

/// Fill `p_dest` (shape `(Z, Z, T)`).  Reads `p_drive`, so it must run
/// after [`create_distribution_p_drive`].
pub fn create_distribution_p_dest(tfs: &mut TrafficSystem) -> ProbResult<()> {
    let TensorsMut { tensors, travel_times, od_distances, grid, .. } = tfs.tensors_mut()?;
    let zones = tensors.number_zones();
    let mut weights = vec![0.0; zones];
    let mut fallback_rows = 0usize;

    for t in 0..tensors.total_steps() {
        let h = grid.hour_of(t);
        for src in 0..zones {
            let mut row = tensors.p_dest.slice_mut(s![src, .., t]);
            row.fill(0.0);
            if tensors.p_drive[[src, t]] <= 0.0 {
                continue;
            }

            weights.fill(0.0);
            let mut total = 0.0;
            for (dst, mean) in travel_times.observed_from(ZoneId(src as u32), h) {
                let w = 1.0 / mean.max(MIN_TRAVEL_TIME_SECS);
                weights[dst.index()] = w;
                total += w;
            }
            if total <= 0.0 {
                fallback_rows += 1;
                for (dst, w) in weights.iter_mut().enumerate() {
                    *w = 1.0 / od_distances[[src, dst]];
                    total += *w;
                }
            }

            for (cell, w) in row.iter_mut().zip(&weights) {
                *cell = w / total;
            }
        }
    }

    debug!(fallback_rows, "p_dest built");
    tfs.mark_stage(Stage::Allocated);
    Ok(())
}

/// Fill `p_joint = p_dest * p_drive` (broadcast over the destination axis).
pub fn create_distribution_p_joint(tfs: &mut TrafficSystem) -> ProbResult<()> {
    let TensorsMut { tensors, .. } = tfs.tensors_mut()?;
    let DataTensors { p_drive, p_dest, p_joint, .. } = tensors;

    for ((src, dst, t), joint) in p_joint.indexed_iter_mut() {
        *joint = p_dest[[src, dst, t]] * p_drive[[src, t]];
    }

    debug!("p_joint built");
    tfs.mark_stage(Stage::Allocated);
    Ok(())
}

/// Observed destinations per `(zone, hour)`.
fn hourly_activity(travel_times: &TravelTimes, zones: usize) -> Array2<f64> {
    Array2::from_shape_fn((zones, HOURS_PER_DAY), |(z, h)| {
        travel_times.observed_destinations(ZoneId(z as u32), h) as f64
    })
}
