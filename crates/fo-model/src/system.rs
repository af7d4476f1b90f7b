//! The `TrafficSystem` aggregate.

use ndarray::Array2;
use tracing::{debug, info};

use fo_core::{SimConfig, TimeGrid};
use fo_input::{ChargingProfile, OdStatistics, ZoneTable};

use crate::travel::validate_od_statistics;
use crate::{DataTensors, ModelError, ModelResult, OccupancyMaps, TravelTimes};

// ── Stage ─────────────────────────────────────────────────────────────────────

/// How far the pipeline has progressed on the current tensors.
///
/// Stages only move forward, except that [`TrafficSystem::create_datatensors`]
/// returns the model to `Allocated`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// No tensors yet.
    #[default]
    Empty,
    /// Tensors allocated and zeroed.
    Allocated,
    /// `p_drive`, `p_dest` and `p_joint` built and validated.
    Probabilities,
    /// `transition` and `state` sampled for the whole horizon.
    Sampled,
}

// ── TensorsMut ────────────────────────────────────────────────────────────────

/// Mutable access to the tensors alongside shared access to everything a
/// stage reads while writing them.
pub struct TensorsMut<'a> {
    pub tensors:      &'a mut DataTensors,
    pub travel_times: &'a TravelTimes,
    pub od_distances: &'a Array2<f64>,
    pub config:       &'a SimConfig,
    pub grid:         TimeGrid,
}

// ── TrafficSystem ─────────────────────────────────────────────────────────────

/// One city's fleet-occupancy model.
///
/// Owns the zone table, the distance table, the OD statistics, every
/// simulation tensor and the resulting occupancy maps.  Built by
/// [`TrafficSystemBuilder`][crate::TrafficSystemBuilder].
///
/// The stages are free functions in `fo-prob`, `fo-sample` and `fo-props`
/// that take `&mut TrafficSystem`; each checks [`TrafficSystem::stage`]
/// before touching the tensors.
#[derive(Debug)]
pub struct TrafficSystem {
    pub(crate) config:           SimConfig,
    pub(crate) grid:             TimeGrid,
    pub(crate) zones:            ZoneTable,
    pub(crate) charging_profile: ChargingProfile,
    pub(crate) od_distances:     Array2<f64>,
    /// Raw statistics not yet densified; taken by `create_datatensors`.
    pub(crate) pending_od:       Option<OdStatistics>,
    pub(crate) travel_times:     Option<TravelTimes>,
    pub(crate) tensors:          Option<DataTensors>,
    pub(crate) stage:            Stage,
    pub(crate) maps:             Option<OccupancyMaps>,
}

impl TrafficSystem {
    /// Allocate zeroed tensors for `number_zones × T`.
    ///
    /// The first call (and the first call after
    /// [`replace_od_statistics`][Self::replace_od_statistics]) densifies the
    /// pending OD statistics into [`TravelTimes`] and releases them.  Every
    /// call discards previous probabilities, samples and maps.
    ///
    /// # Errors
    ///
    /// [`ModelError::NoOdStatistics`] if the model was built without OD
    /// tables.
    pub fn create_datatensors(&mut self) -> ModelResult<()> {
        if let Some(od) = self.pending_od.take() {
            self.travel_times = Some(TravelTimes::from_statistics(&self.zones, &od)?);
            debug!("OD statistics densified and released");
        }
        if self.travel_times.is_none() {
            return Err(ModelError::NoOdStatistics);
        }

        let (zones, steps) = (self.number_zones(), self.total_steps());
        self.tensors = Some(DataTensors::zeroed(zones, steps));
        self.maps = None;
        self.stage = Stage::Allocated;
        info!(zones, steps, "data tensors created");
        Ok(())
    }

    /// Supply new OD statistics.  They take effect at the next
    /// [`create_datatensors`][Self::create_datatensors]; until then the
    /// current tensors stay readable.
    ///
    /// # Errors
    ///
    /// Same validation as the builder: table counts, key agreement between
    /// mean and std tables, known zone keys, finite non-negative values.
    pub fn replace_od_statistics(&mut self, od: OdStatistics) -> ModelResult<()> {
        if od.is_empty() {
            return Err(ModelError::NoOdStatistics);
        }
        validate_od_statistics(&self.zones, &od)?;
        self.pending_od = Some(od);
        Ok(())
    }

    // ── Dimensions and inputs ─────────────────────────────────────────────

    #[inline]
    pub fn number_zones(&self) -> usize {
        self.zones.len()
    }

    /// `T`: number of time steps in the horizon.
    #[inline]
    pub fn total_steps(&self) -> usize {
        self.grid.total_steps()
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn grid(&self) -> TimeGrid {
        self.grid
    }

    #[inline]
    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    #[inline]
    pub fn charging_profile(&self) -> &ChargingProfile {
        &self.charging_profile
    }

    /// Zone-to-zone great-circle distances in km, computed at construction.
    #[inline]
    pub fn od_distances(&self) -> &Array2<f64> {
        &self.od_distances
    }

    /// `true` while raw OD statistics wait to be densified.
    #[inline]
    pub fn has_pending_od(&self) -> bool {
        self.pending_od.is_some()
    }

    // ── Tensors ───────────────────────────────────────────────────────────

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Record that a stage finished successfully.  Called by the stage
    /// crates; `Empty` cannot be entered this way.  Moving below `Sampled`
    /// drops the occupancy maps.
    pub fn mark_stage(&mut self, stage: Stage) {
        if self.tensors.is_none() || stage == Stage::Empty {
            return;
        }
        if stage < Stage::Sampled {
            self.maps = None;
        }
        self.stage = stage;
    }

    pub fn tensors(&self) -> ModelResult<&DataTensors> {
        self.tensors
            .as_ref()
            .ok_or(ModelError::Uninitialized("create_datatensors has not been called"))
    }

    pub fn travel_times(&self) -> ModelResult<&TravelTimes> {
        self.travel_times
            .as_ref()
            .ok_or(ModelError::Uninitialized("create_datatensors has not been called"))
    }

    /// Split borrow of the tensors and their read-only inputs.
    pub fn tensors_mut(&mut self) -> ModelResult<TensorsMut<'_>> {
        match (&mut self.tensors, &self.travel_times) {
            (Some(tensors), Some(travel_times)) => Ok(TensorsMut {
                tensors,
                travel_times,
                od_distances: &self.od_distances,
                config: &self.config,
                grid: self.grid,
            }),
            _ => Err(ModelError::Uninitialized("create_datatensors has not been called")),
        }
    }

    // ── Results ───────────────────────────────────────────────────────────

    /// Occupancy maps of the last aggregation, if any.
    #[inline]
    pub fn maps(&self) -> Option<&OccupancyMaps> {
        self.maps.as_ref()
    }

    pub fn set_maps(&mut self, maps: OccupancyMaps) {
        self.maps = Some(maps);
    }

    /// Vehicles between zones at the end of step `t`: the fleet minus every
    /// parked vehicle.  Zero before sampling.
    pub fn vehicles_in_transit(&self, t: usize) -> u64 {
        match (&self.tensors, self.stage) {
            (Some(tensors), Stage::Sampled) => {
                self.config.fleet_size.saturating_sub(tensors.vehicles_parked(t))
            }
            _ => 0,
        }
    }
}
