//! Sampler observer trait for progress reporting and data collection.

use fo_model::DataTensors;

/// Callbacks invoked by [`sample_traffic`][crate::sample_traffic] at key
/// points in the step loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: departure counter
///
/// ```rust,ignore
/// struct Departures(Vec<u64>);
///
/// impl SampleObserver for Departures {
///     fn on_step_end(&mut self, step: usize, tensors: &DataTensors) {
///         self.0.push(tensors.departures(step));
///     }
/// }
/// ```
pub trait SampleObserver {
    /// Called once after the initial value problem, before step 0.
    fn on_run_start(&mut self, _zones: usize, _steps: usize) {}

    /// Called at the start of each step, before any sampling.
    fn on_step_start(&mut self, _step: usize) {}

    /// Called after the step's transitions are committed and its occupancy
    /// propagated.  Column `step` of `transition` and `state` is final.
    fn on_step_end(&mut self, _step: usize, _tensors: &DataTensors) {}

    /// Called once after the final step passed its checks.
    fn on_run_end(&mut self, _tensors: &DataTensors) {}
}

/// A [`SampleObserver`] that does nothing.
pub struct NoopObserver;

impl SampleObserver for NoopObserver {}
