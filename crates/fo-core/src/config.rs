//! Top-level simulation configuration.

use crate::{CoreError, CoreResult, TimeGrid};

/// Simulation configuration.
///
/// Typically loaded from a JSON/TOML file by the application crate (with the
/// `serde` feature; missing fields take their [`Default`] values) and handed
/// to `fo_model::TrafficSystemBuilder::config`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Time steps per hour.  `T = 24 * steps_per_hour`.  Must evenly divide
    /// 3600.  Default: 1.
    pub steps_per_hour: u32,

    /// Number of vehicles distributed over the zones by the initial value
    /// problem.
    pub fleet_size: u64,

    /// Hourly probability that a vehicle in the busiest zone-hour departs.
    /// Every other zone-hour scales linearly with its observed OD activity.
    pub peak_drive_probability: f64,

    /// Hourly drive probability given to every zone during an hour with no
    /// observed OD activity at all, so that no step has zero aggregate
    /// demand.
    pub min_drive_probability: f64,

    /// Speed used to derive a travel time for OD pairs without an observed
    /// mean (only reachable through the distance-based destination
    /// fallback).
    pub fallback_speed_kmh: f64,

    /// Scale the sampled travel distance by `sampled_time / mean_time`, so
    /// slow trips are also long trips.  When `false` the distance table value
    /// is used unchanged.
    pub perturb_distance: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                   42,
            steps_per_hour:         1,
            fleet_size:             1_000,
            peak_drive_probability: 0.3,
            min_drive_probability:  0.01,
            fallback_speed_kmh:     30.0,
            perturb_distance:       true,
        }
    }
}

impl SimConfig {
    /// The time discretization described by this config.
    #[inline]
    pub fn grid(&self) -> TimeGrid {
        TimeGrid::new(self.steps_per_hour)
    }

    /// Reject configurations the simulation cannot honour.
    pub fn validate(&self) -> CoreResult<()> {
        if self.steps_per_hour == 0 || 3_600 % self.steps_per_hour != 0 {
            return Err(CoreError::Config(format!(
                "steps_per_hour must evenly divide 3600, got {}",
                self.steps_per_hour
            )));
        }
        if self.fleet_size == 0 {
            return Err(CoreError::Config("fleet_size must be positive".into()));
        }
        for (name, p) in [
            ("peak_drive_probability", self.peak_drive_probability),
            ("min_drive_probability", self.min_drive_probability),
        ] {
            if !(p > 0.0 && p <= 1.0) {
                return Err(CoreError::Config(format!("{name} must lie in (0, 1], got {p}")));
            }
        }
        if self.min_drive_probability > self.peak_drive_probability {
            return Err(CoreError::Config(format!(
                "min_drive_probability ({}) exceeds peak_drive_probability ({})",
                self.min_drive_probability, self.peak_drive_probability
            )));
        }
        if !(self.fallback_speed_kmh.is_finite() && self.fallback_speed_kmh > 0.0) {
            return Err(CoreError::Config(format!(
                "fallback_speed_kmh must be positive, got {}",
                self.fallback_speed_kmh
            )));
        }
        Ok(())
    }
}
