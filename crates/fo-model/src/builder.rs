//! Fluent builder for constructing a [`TrafficSystem`].

use fo_core::SimConfig;
use fo_input::{ChargingProfile, OdStatistics, ZoneTable};
use tracing::info;

use crate::distance::compute_od_distances;
use crate::system::Stage;
use crate::travel::validate_od_statistics;
use crate::{ModelError, ModelResult, TrafficSystem};

/// Fluent builder for [`TrafficSystem`].
///
/// # Required inputs
///
/// - [`ZoneTable`]: the zones and their centroids
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                                   |
/// |--------------------------|-------------------------------------------|
/// | `.od_statistics(od)`     | none: distance table only, no simulation  |
/// | `.charging_profile(p)`   | `ChargingProfile::Uniform`                |
/// | `.config(c)`             | `SimConfig::default()`                    |
///
/// # Example
///
/// ```rust,ignore
/// let mut tfs = TrafficSystemBuilder::new(zones)
///     .od_statistics(od)
///     .charging_profile(ChargingProfile::hourly(&weights)?)
///     .config(config)
///     .build()?;
/// tfs.create_datatensors()?;
/// ```
pub struct TrafficSystemBuilder {
    zones:    ZoneTable,
    od:       Option<OdStatistics>,
    charging: ChargingProfile,
    config:   SimConfig,
}

impl TrafficSystemBuilder {
    pub fn new(zones: ZoneTable) -> Self {
        Self {
            zones,
            od:       None,
            charging: ChargingProfile::default(),
            config:   SimConfig::default(),
        }
    }

    /// Supply the hourly OD statistics.  An empty `OdStatistics` is the same
    /// as not calling this.
    pub fn od_statistics(mut self, od: OdStatistics) -> Self {
        self.od = Some(od);
        self
    }

    pub fn charging_profile(mut self, profile: ChargingProfile) -> Self {
        self.charging = profile;
        self
    }

    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate inputs, compute the distance table and return the model.
    ///
    /// # Errors
    ///
    /// - [`ModelError::Config`] for an invalid [`SimConfig`].
    /// - [`ModelError::NoZones`] for an empty zone table.
    /// - [`ModelError::ShapeMismatch`] / [`ModelError::KeyMismatch`] when
    ///   the mean and std tables disagree or are not 24.
    /// - [`ModelError::ZoneKeyMismatch`] / [`ModelError::InvalidTravelTime`] for
    ///   table entries that do not fit the zone table.
    pub fn build(self) -> ModelResult<TrafficSystem> {
        self.config.validate()?;
        if self.zones.is_empty() {
            return Err(ModelError::NoZones);
        }

        let pending_od = match self.od {
            Some(od) if !od.is_empty() => {
                validate_od_statistics(&self.zones, &od)?;
                Some(od)
            }
            Some(od) => {
                if od.std.as_ref().is_some_and(|s| !s.is_empty()) {
                    return Err(ModelError::ShapeMismatch {
                        what:     "hourly std travel-time tables",
                        expected: 0,
                        got:      od.std.map_or(0, |s| s.len()),
                    });
                }
                None
            }
            None => None,
        };

        let od_distances = compute_od_distances(&self.zones);
        info!(
            zones = self.zones.len(),
            steps = self.config.grid().total_steps(),
            od = pending_od.is_some(),
            "traffic system built"
        );

        Ok(TrafficSystem {
            grid: self.config.grid(),
            config: self.config,
            zones: self.zones,
            charging_profile: self.charging,
            od_distances,
            pending_od,
            travel_times: None,
            tensors: None,
            stage: Stage::Empty,
            maps: None,
        })
    }
}
