//! The initial value problem and the three per-step sampling stages.
//!
//! Each stage follows a compute/apply split:
//!
//! 1. **Compute**: every zone draws its outcome from read-only tensors and
//!    its own [`ZoneRng`] (on Rayon with the `parallel` feature).
//! 2. **Apply**: outcomes are written in ascending zone order through the
//!    staged `DataTensors::record_*` methods, which enforce the cell phase
//!    order driving → destination → travel.
//!
//! Every stage call draws one step seed from the run-level [`SimRng`], so a
//! fixed seed reproduces the run regardless of thread count.

use ndarray::s;
use rand::distributions::WeightedIndex;
use rand_distr::{Binomial, Normal};
use tracing::{debug, warn};

use fo_core::{SimRng, ZoneId, ZoneRng};
use fo_model::{
    CellPhase, DataTensors, INTRA_ZONE_DISTANCE_KM, ModelError, Stage, TensorsMut, TrafficSystem,
};

use crate::{SampleError, SampleResult};

const SECS_PER_HOUR: f64 = 3_600.0;

// ── Initial value problem ─────────────────────────────────────────────────────

/// Distribute `fleet_size` vehicles over the zones at step 0, proportional
/// to each zone's total drive probability over the horizon.
///
/// Overwrites `state[:, 0]`.  Requires the probability distributions.
pub fn solve_initial_value_problem(tfs: &mut TrafficSystem) -> SampleResult<()> {
    require_probabilities(tfs)?;
    let TensorsMut { tensors, config, .. } = tfs.tensors_mut()?;

    let activity: Vec<f64> = tensors.p_drive.rows().into_iter().map(|r| r.sum()).collect();
    let counts = allocate_fleet(config.fleet_size, &activity);
    for (z, &n) in counts.iter().enumerate() {
        tensors.state[[z, 0]] = n;
    }

    debug!(fleet = config.fleet_size, zones = counts.len(), "initial fleet allocated");
    Ok(())
}

/// Split `fleet` into integer counts proportional to `weights` by the
/// largest-remainder method.  Ties go to the lower index.  Non-positive
/// total weight spreads the fleet evenly.
pub(crate) fn allocate_fleet(fleet: u64, weights: &[f64]) -> Vec<u64> {
    if weights.is_empty() {
        return Vec::new();
    }
    let total: f64 = weights.iter().sum();
    let quotas: Vec<f64> = if total > 0.0 {
        weights.iter().map(|w| fleet as f64 * w / total).collect()
    } else {
        vec![fleet as f64 / weights.len() as f64; weights.len()]
    };

    let mut counts: Vec<u64> = quotas.iter().map(|q| q.floor() as u64).collect();
    let assigned: u64 = counts.iter().sum();
    let remainder = fleet.saturating_sub(assigned) as usize;

    let mut order: Vec<usize> = (0..quotas.len()).collect();
    order.sort_by(|&a, &b| {
        let (fa, fb) = (quotas[a].fract(), quotas[b].fract());
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    for &z in order.iter().cycle().take(remainder) {
        counts[z] += 1;
    }
    counts
}

// ── Driving ───────────────────────────────────────────────────────────────────

/// Draw the number of departures of every zone at step `t` from
/// `Binomial(state[z, t], p_drive[z, t])`.  Writes only the driving field.
pub fn driving_activity_sampling(
    tfs: &mut TrafficSystem,
    t:   usize,
    rng: &mut SimRng,
) -> SampleResult<()> {
    let TensorsMut { tensors, .. } = tfs.tensors_mut()?;
    check_step(tensors, t)?;
    let rngs = rng.zone_rngs(tensors.number_zones());

    let view: &DataTensors = tensors;
    let departures = per_zone(rngs, |zone, zrng| -> SampleResult<u64> {
        let z = zone.index();
        let parked = view.state[[z, t]];
        let p = view.p_drive[[z, t]];
        if parked == 0 || p <= 0.0 {
            return Ok(0);
        }
        let dist = Binomial::new(parked, p)
            .map_err(|e| distribution_error("departure", z, t, e))?;
        Ok(zrng.sample(&dist))
    });

    for (z, driving) in departures.into_iter().enumerate() {
        tensors.record_driving(ZoneId(z as u32), t, driving?)?;
    }
    Ok(())
}

// ── Destination ───────────────────────────────────────────────────────────────

/// Draw a destination for every zone with departures at step `t` from
/// `p_dest[z, :, t]`, falling back to `p_joint[z, :, t] / p_drive[z, t]`.
/// Writes only the destination field.
pub fn destination_choice_sampling(
    tfs: &mut TrafficSystem,
    t:   usize,
    rng: &mut SimRng,
) -> SampleResult<()> {
    let TensorsMut { tensors, .. } = tfs.tensors_mut()?;
    check_step(tensors, t)?;
    let rngs = rng.zone_rngs(tensors.number_zones());

    let view: &DataTensors = tensors;
    let choices = per_zone(rngs, |zone, zrng| -> SampleResult<Option<ZoneId>> {
        let z = zone.index();
        match view.transition[[z, t]].phase {
            CellPhase::Departed => {}
            CellPhase::Parked => return Ok(None),
            found => return Err(out_of_order(z, t, CellPhase::Departed, found)),
        }

        let no_destination = || SampleError::NoDestination { zone: z, step: t };
        let dest = view.p_dest.slice(s![z, .., t]);
        let dist = if dest.sum() > 0.0 {
            WeightedIndex::new(dest.iter())
        } else {
            let drive = view.p_drive[[z, t]];
            if drive <= 0.0 {
                return Err(no_destination());
            }
            WeightedIndex::new(view.p_joint.slice(s![z, .., t]).iter().map(|p| p / drive))
        }
        .map_err(|_| no_destination())?;

        Ok(Some(ZoneId(zrng.sample(&dist) as u32)))
    });

    for (z, choice) in choices.into_iter().enumerate() {
        if let Some(dest) = choice? {
            tensors.record_destination(ZoneId(z as u32), t, dest)?;
        }
    }
    Ok(())
}

// ── Travel time and distance ──────────────────────────────────────────────────

struct TravelDraw {
    time:     f64,
    distance: f64,
    clamped:  bool,
}

/// Draw travel time and distance for every routed zone at step `t`.
///
/// - Time: `Normal(mean, std)` of the OD pair for the step's hour, clamped at
///   zero; exactly `mean` when the std is absent or zero.  A pair without an
///   observed mean uses `distance / fallback_speed_kmh`.
/// - Distance: the distance table value, scaled by `time / mean` when
///   `perturb_distance` is set and never shorter than
///   [`INTRA_ZONE_DISTANCE_KM`].
pub fn traveltime_and_distance_sampling(
    tfs: &mut TrafficSystem,
    t:   usize,
    rng: &mut SimRng,
) -> SampleResult<()> {
    let TensorsMut { tensors, travel_times, od_distances, config, grid } = tfs.tensors_mut()?;
    check_step(tensors, t)?;
    let rngs = rng.zone_rngs(tensors.number_zones());
    let hour = grid.hour_of(t);

    let view: &DataTensors = tensors;
    let draws = per_zone(rngs, |zone, zrng| -> SampleResult<Option<TravelDraw>> {
        let z = zone.index();
        let cell = view.transition[[z, t]];
        match cell.phase {
            CellPhase::Routed => {}
            CellPhase::Parked => return Ok(None),
            found => return Err(out_of_order(z, t, CellPhase::Routed, found)),
        }

        let dest = cell.destination;
        let table_distance = od_distances[[z, dest.index()]];
        let mean = travel_times
            .mean(zone, dest, hour)
            .unwrap_or(table_distance / config.fallback_speed_kmh * SECS_PER_HOUR);
        let std = travel_times.std(zone, dest, hour);

        let raw = if std > 0.0 {
            let dist = Normal::new(mean, std)
                .map_err(|e| distribution_error("travel-time", z, t, e))?;
            zrng.sample(&dist)
        } else {
            mean
        };
        let time = raw.max(0.0);
        let distance = if config.perturb_distance && mean > 0.0 {
            (table_distance * time / mean).max(INTRA_ZONE_DISTANCE_KM)
        } else {
            table_distance
        };

        Ok(Some(TravelDraw { time, distance, clamped: raw < 0.0 }))
    });

    let mut clamped = 0usize;
    for (z, draw) in draws.into_iter().enumerate() {
        if let Some(draw) = draw? {
            clamped += usize::from(draw.clamped);
            tensors.record_travel(ZoneId(z as u32), t, draw.time, draw.distance)?;
        }
    }
    if clamped > 0 {
        warn!(step = t, clamped, "negative travel-time draws clamped to zero");
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Run `f` once per zone with that zone's RNG, returning results in zone
/// order.
fn per_zone<T, F>(rngs: Vec<ZoneRng>, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(ZoneId, &mut ZoneRng) -> T + Sync + Send,
{
    #[cfg(not(feature = "parallel"))]
    {
        rngs.into_iter()
            .enumerate()
            .map(|(z, mut rng)| f(ZoneId(z as u32), &mut rng))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        rngs.into_par_iter()
            .enumerate()
            .map(|(z, mut rng)| f(ZoneId(z as u32), &mut rng))
            .collect()
    }
}

pub(crate) fn require_probabilities(tfs: &TrafficSystem) -> SampleResult<()> {
    tfs.tensors()?;
    if tfs.stage() < Stage::Probabilities {
        return Err(ModelError::Uninitialized("probability distributions have not been built").into());
    }
    Ok(())
}

pub(crate) fn check_step(tensors: &DataTensors, t: usize) -> SampleResult<()> {
    let steps = tensors.total_steps();
    if t >= steps {
        return Err(SampleError::StepOutOfRange { step: t, steps });
    }
    Ok(())
}

pub(crate) fn out_of_order(zone: usize, step: usize, expected: CellPhase, found: CellPhase) -> SampleError {
    ModelError::OutOfOrder { zone, step, expected, found }.into()
}

fn distribution_error(what: &'static str, zone: usize, step: usize, e: impl std::fmt::Display) -> SampleError {
    SampleError::Distribution { what, zone, step, reason: e.to_string() }
}
