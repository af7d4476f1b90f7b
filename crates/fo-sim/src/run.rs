//! The `simulate_traffic` pipeline and the `SimulateTraffic` extension trait.

use tracing::info;

use fo_core::SimRng;
use fo_model::{OccupancyMaps, Stage, TrafficSystem};
use fo_sample::{NoopObserver, SampleObserver};

use crate::SimResult;

/// Run probabilities and sampling on `tfs`.
///
/// Creates the data tensors first if there are none yet, or if new OD
/// statistics are waiting.  Every call rebuilds the probabilities and
/// resamples the whole horizon from scratch.
pub fn simulate_traffic<O: SampleObserver>(
    tfs:      &mut TrafficSystem,
    rng:      &mut SimRng,
    observer: &mut O,
) -> SimResult<()> {
    if tfs.stage() == Stage::Empty || tfs.has_pending_od() {
        tfs.create_datatensors()?;
    }
    fo_prob::calc_prob_dists(tfs)?;
    fo_sample::sample_traffic(tfs, rng, observer)?;
    Ok(())
}

/// Method-call access to the pipeline on [`TrafficSystem`].
///
/// ```rust,ignore
/// use fo_sim::SimulateTraffic;
///
/// let maps = tfs.run()?;
/// ```
pub trait SimulateTraffic {
    /// See [`simulate_traffic`].
    fn simulate_traffic<O: SampleObserver>(
        &mut self,
        rng:      &mut SimRng,
        observer: &mut O,
    ) -> SimResult<()>;

    /// See [`fo_props::calc_traffic_system_properties`].
    fn calc_traffic_system_properties(&mut self) -> SimResult<OccupancyMaps>;

    /// Simulate with an RNG seeded from `config.seed`, then aggregate.
    fn run(&mut self) -> SimResult<OccupancyMaps> {
        self.run_with(&mut NoopObserver)
    }

    /// [`run`][Self::run] with progress callbacks.
    fn run_with<O: SampleObserver>(&mut self, observer: &mut O) -> SimResult<OccupancyMaps>;
}

impl SimulateTraffic for TrafficSystem {
    fn simulate_traffic<O: SampleObserver>(
        &mut self,
        rng:      &mut SimRng,
        observer: &mut O,
    ) -> SimResult<()> {
        simulate_traffic(self, rng, observer)
    }

    fn calc_traffic_system_properties(&mut self) -> SimResult<OccupancyMaps> {
        Ok(fo_props::calc_traffic_system_properties(self)?)
    }

    fn run_with<O: SampleObserver>(&mut self, observer: &mut O) -> SimResult<OccupancyMaps> {
        let seed = self.config().seed;
        let mut rng = SimRng::new(seed);
        SimulateTraffic::simulate_traffic(self, &mut rng, observer)?;
        let maps = SimulateTraffic::calc_traffic_system_properties(self)?;
        info!(seed, zones = maps.number_zones(), "run complete");
        Ok(maps)
    }
}
