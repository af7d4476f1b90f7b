//! `StepOutputObserver<W>` bridges `SampleObserver` to an `OutputWriter`.

use fo_core::TimeGrid;
use fo_input::ZoneTable;
use fo_model::{DataTensors, OccupancyMaps};
use fo_sample::SampleObserver;

use crate::row::{map_rows, state_rows, transition_rows};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SampleObserver`] that streams the state and transitions of every
/// step to an [`OutputWriter`] as the sampler commits them.
///
/// Errors from the writer are stored internally because `SampleObserver`
/// methods have no return value; [`finish`][Self::finish] reports the first
/// one.  The maps are computed after sampling, so they are handed to
/// `finish` rather than observed.
pub struct StepOutputObserver<W: OutputWriter> {
    writer:     W,
    zones:      ZoneTable,
    grid:       TimeGrid,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> StepOutputObserver<W> {
    pub fn new(writer: W, zones: ZoneTable, grid: TimeGrid) -> Self {
        Self {
            writer,
            zones,
            grid,
            last_error: None,
        }
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Write `maps` (if given), flush, and return the writer, or the first
    /// error of the whole run.
    pub fn finish(mut self, maps: Option<&OccupancyMaps>) -> OutputResult<W> {
        if let Some(e) = self.last_error.take() {
            return Err(e);
        }
        if let Some(maps) = maps {
            self.writer.write_maps(&map_rows(&self.zones, maps))?;
        }
        self.writer.finish()?;
        Ok(self.writer)
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SampleObserver for StepOutputObserver<W> {
    fn on_step_end(&mut self, step: usize, tensors: &DataTensors) {
        let result = self
            .writer
            .write_state(&state_rows(&self.zones, self.grid, tensors, step));
        self.store_err(result);

        let rows = transition_rows(&self.zones, tensors, step);
        if !rows.is_empty() {
            let result = self.writer.write_transitions(&rows);
            self.store_err(result);
        }
    }
}
