//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `state.csv`
//! - `transitions.csv`
//! - `occupancy_maps.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{MapRow, OutputResult, StateRow, TransitionRow};

pub const STATE_FILE: &str = "state.csv";
pub const TRANSITIONS_FILE: &str = "transitions.csv";
pub const MAPS_FILE: &str = "occupancy_maps.csv";

/// Writes simulation output to three CSV files.
///
/// Headers come from the row field names and are written with the first
/// row of each file.
pub struct CsvWriter {
    state:       Writer<File>,
    transitions: Writer<File>,
    maps:        Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Create (or truncate) the three CSV files in `dir`, creating `dir`
    /// if needed.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            state:       Writer::from_path(dir.join(STATE_FILE))?,
            transitions: Writer::from_path(dir.join(TRANSITIONS_FILE))?,
            maps:        Writer::from_path(dir.join(MAPS_FILE))?,
            finished:    false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_state(&mut self, rows: &[StateRow]) -> OutputResult<()> {
        for row in rows {
            self.state.serialize(row)?;
        }
        Ok(())
    }

    fn write_transitions(&mut self, rows: &[TransitionRow]) -> OutputResult<()> {
        for row in rows {
            self.transitions.serialize(row)?;
        }
        Ok(())
    }

    fn write_maps(&mut self, rows: &[MapRow]) -> OutputResult<()> {
        for row in rows {
            self.maps.serialize(row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.state.flush()?;
        self.transitions.flush()?;
        self.maps.flush()?;
        Ok(())
    }
}
