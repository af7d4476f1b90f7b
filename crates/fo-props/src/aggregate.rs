//! Aggregation of the sampled tensors into occupancy maps.

use ndarray::{Array1, Axis};
use tracing::info;

use fo_model::{MapKind, ModelError, OccupancyMaps, Stage, TrafficSystem};

use crate::{PropsError, PropsResult};

/// Compute the three occupancy maps of a sampled model, store them on the
/// model and return them.
///
/// | Map      | Weight of zone `z`                                          |
/// |----------|-------------------------------------------------------------|
/// | parking  | `Σ_t state[z, t]`                                           |
/// | driving  | `Σ_t driving[z, t] * steps_for_secs(travel_time[z, t])`     |
/// | charging | `Σ_t state[z, t] * charging_profile.weight(hour_of(t))`     |
///
/// Trips count towards the zone they start in.  Each map is then divided by
/// its total.
///
/// # Errors
///
/// - `ModelError::Uninitialized` unless the model has been sampled.
/// - [`PropsError::Degenerate`] if a map has zero total weight, e.g. a
///   charging profile that is zero whenever vehicles are parked.
pub fn calc_traffic_system_properties(tfs: &mut TrafficSystem) -> PropsResult<OccupancyMaps> {
    if tfs.stage() < Stage::Sampled {
        return Err(ModelError::Uninitialized("traffic has not been sampled").into());
    }
    let tensors = tfs.tensors()?;
    let grid = tfs.grid();
    let profile = tfs.charging_profile();

    let parking = tensors.state.map(|&n| n as f64).sum_axis(Axis(1));

    let driving = Array1::from_iter(tensors.transition.rows().into_iter().map(|row| {
        row.iter()
            .filter(|cell| cell.is_committed())
            .map(|cell| cell.driving as f64 * grid.steps_for_secs(cell.travel_time) as f64)
            .sum::<f64>()
    }));

    let hour_weights = Array1::from_shape_fn(tensors.total_steps(), |t| profile.weight(grid.hour_of(t)));
    let charging = tensors.state.map(|&n| n as f64).dot(&hour_weights);

    let maps = OccupancyMaps {
        parking:  normalize(parking, MapKind::Parking)?,
        driving:  normalize(driving, MapKind::Driving)?,
        charging: normalize(charging, MapKind::Charging)?,
    };

    info!(zones = maps.number_zones(), "occupancy maps computed");
    tfs.set_maps(maps.clone());
    Ok(maps)
}

/// Divide by the total.  A zero or non-finite total is an error, never
/// silently replaced.
pub fn normalize(mut weights: Array1<f64>, kind: MapKind) -> PropsResult<Array1<f64>> {
    let total = weights.sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(PropsError::Degenerate(kind));
    }
    weights /= total;
    Ok(weights)
}
