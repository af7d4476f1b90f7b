//! The `OutputWriter` trait and whole-run export.

use tracing::info;

use fo_model::{ModelError, Stage, TrafficSystem};

use crate::row::{map_rows, state_rows, transition_rows};
use crate::{MapRow, OutputResult, StateRow, TransitionRow};

/// Trait implemented by output backends.
///
/// When driven by [`StepOutputObserver`][crate::StepOutputObserver], errors
/// are stored in the observer and surface from its `finish`.
pub trait OutputWriter {
    /// Write the state rows of one step.
    fn write_state(&mut self, rows: &[StateRow]) -> OutputResult<()>;

    /// Write the transition rows of one step.
    fn write_transitions(&mut self, rows: &[TransitionRow]) -> OutputResult<()>;

    /// Write the occupancy maps, one row per zone.
    fn write_maps(&mut self, rows: &[MapRow]) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Write a finished run in one go: every step of the state and transition
/// tensors, then the occupancy maps if they have been computed.
///
/// # Errors
///
/// `ModelError::Uninitialized` unless the model has been sampled.
pub fn write_traffic_system<W: OutputWriter>(writer: &mut W, tfs: &TrafficSystem) -> OutputResult<()> {
    if tfs.stage() < Stage::Sampled {
        return Err(ModelError::Uninitialized("traffic has not been sampled").into());
    }
    let tensors = tfs.tensors()?;
    let zones = tfs.zones();

    for t in 0..tensors.total_steps() {
        writer.write_state(&state_rows(zones, tfs.grid(), tensors, t))?;
        writer.write_transitions(&transition_rows(zones, tensors, t))?;
    }
    if let Some(maps) = tfs.maps() {
        writer.write_maps(&map_rows(zones, maps))?;
    }
    writer.finish()?;

    info!(steps = tensors.total_steps(), maps = tfs.maps().is_some(), "run written");
    Ok(())
}
