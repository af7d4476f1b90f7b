//! The simulation tensors and the per-cell transition record.
//!
//! Every tensor is indexed `[zone, ...]` by `ZoneId::index()` and by time
//! step `t` in `0..T`.  All of them live in one [`DataTensors`] owned by the
//! `TrafficSystem`; the probability engine, the sampler and the aggregator
//! borrow it and never keep copies.

use ndarray::{Array2, Array3, ArrayView1, Axis};

use fo_core::ZoneId;

use crate::{ModelError, ModelResult};

// ── CellPhase ─────────────────────────────────────────────────────────────────

/// Progress of one `(zone, t)` transition cell through the sampling stages.
///
/// ```text
/// Idle ──driving──▶ Parked                  (no departures; terminal)
///      └─────────▶ Departed ──destination──▶ Routed ──travel──▶ Committed
/// ```
///
/// Each field of a [`Transition`] can only be written from the phase that
/// precedes it, so every field is written at most once per run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellPhase {
    #[default]
    Idle,
    Parked,
    Departed,
    Routed,
    Committed,
}

// ── Transition ────────────────────────────────────────────────────────────────

/// What happened in one zone during one step.
///
/// All departures of a cell travel together to one sampled destination; the
/// sampled travel time and distance apply to each of them.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Transition {
    /// Number of vehicles that left the zone during this step (0: parked).
    pub driving:         u64,
    /// Destination zone; `ZoneId::INVALID` until sampled.
    pub destination:     ZoneId,
    /// Sampled travel time, seconds.  Never negative.
    pub travel_time:     f64,
    /// Sampled travel distance, km.  Never negative.
    pub travel_distance: f64,
    pub phase:           CellPhase,
}

impl Transition {
    /// `true` once travel time and distance have been written.
    #[inline]
    pub fn is_committed(&self) -> bool {
        self.phase == CellPhase::Committed
    }
}

// ── DataTensors ───────────────────────────────────────────────────────────────

/// All simulation tensors of one model.
///
/// | Field        | Shape       | Contents                                    |
/// |--------------|-------------|---------------------------------------------|
/// | `p_drive`    | `(Z, T)`    | per-step departure probability              |
/// | `p_dest`     | `(Z, Z, T)` | destination distribution per `(src, t)`     |
/// | `p_joint`    | `(Z, Z, T)` | `p_dest * p_drive` broadcast over `dst`     |
/// | `transition` | `(Z, T)`    | sampled [`Transition`] per cell             |
/// | `state`      | `(Z, T)`    | vehicles parked in the zone at end of step  |
#[derive(Debug, Clone, PartialEq)]
pub struct DataTensors {
    pub p_drive:    Array2<f64>,
    pub p_dest:     Array3<f64>,
    pub p_joint:    Array3<f64>,
    pub transition: Array2<Transition>,
    pub state:      Array2<u64>,
}

impl DataTensors {
    /// Zero-filled tensors for `zones` zones and `steps` time steps.
    pub fn zeroed(zones: usize, steps: usize) -> Self {
        Self {
            p_drive:    Array2::zeros((zones, steps)),
            p_dest:     Array3::zeros((zones, zones, steps)),
            p_joint:    Array3::zeros((zones, zones, steps)),
            transition: Array2::default((zones, steps)),
            state:      Array2::zeros((zones, steps)),
        }
    }

    #[inline]
    pub fn number_zones(&self) -> usize {
        self.state.nrows()
    }

    #[inline]
    pub fn total_steps(&self) -> usize {
        self.state.ncols()
    }

    /// Clear the sampled tensors (`transition`, `state`), keeping the
    /// probabilities.
    pub fn reset_samples(&mut self) {
        self.transition.fill(Transition::default());
        self.state.fill(0);
    }

    /// Occupancy of every zone at step `t`.
    #[inline]
    pub fn state_at(&self, t: usize) -> ArrayView1<'_, u64> {
        self.state.index_axis(Axis(1), t)
    }

    /// Vehicles parked in any zone at the end of step `t`.
    pub fn vehicles_parked(&self, t: usize) -> u64 {
        self.state_at(t).sum()
    }

    /// Vehicles that departed anywhere during step `t`.
    pub fn departures(&self, t: usize) -> u64 {
        self.transition
            .index_axis(Axis(1), t)
            .iter()
            .map(|tr| tr.driving)
            .sum()
    }

    // ── Staged writes ─────────────────────────────────────────────────────

    /// Record the driving outcome of `(zone, t)`.  `Idle → Parked|Departed`.
    pub fn record_driving(&mut self, zone: ZoneId, t: usize, driving: u64) -> ModelResult<()> {
        let cell = self.cell_in(zone, t, CellPhase::Idle)?;
        cell.driving = driving;
        cell.phase = if driving == 0 { CellPhase::Parked } else { CellPhase::Departed };
        Ok(())
    }

    /// Record the destination of `(zone, t)`.  `Departed → Routed`.
    pub fn record_destination(&mut self, zone: ZoneId, t: usize, dest: ZoneId) -> ModelResult<()> {
        let cell = self.cell_in(zone, t, CellPhase::Departed)?;
        cell.destination = dest;
        cell.phase = CellPhase::Routed;
        Ok(())
    }

    /// Record travel time (s) and distance (km) of `(zone, t)`, clamping
    /// both at zero.  `Routed → Committed`.
    pub fn record_travel(
        &mut self,
        zone:     ZoneId,
        t:        usize,
        time:     f64,
        distance: f64,
    ) -> ModelResult<()> {
        let cell = self.cell_in(zone, t, CellPhase::Routed)?;
        cell.travel_time = time.max(0.0);
        cell.travel_distance = distance.max(0.0);
        cell.phase = CellPhase::Committed;
        Ok(())
    }

    fn cell_in(
        &mut self,
        zone:     ZoneId,
        t:        usize,
        expected: CellPhase,
    ) -> ModelResult<&mut Transition> {
        let cell = &mut self.transition[[zone.index(), t]];
        if cell.phase != expected {
            return Err(ModelError::OutOfOrder {
                zone: zone.index(),
                step: t,
                expected,
                found: cell.phase,
            });
        }
        Ok(cell)
    }
}
