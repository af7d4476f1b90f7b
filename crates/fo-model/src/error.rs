use fo_core::CoreError;
use thiserror::Error;

use crate::CellPhase;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    #[error("std table for hour {hour} does not share the keys of the mean table")]
    KeyMismatch { hour: usize },

    /// The OD tables and the zone table disagree on zone keys; a shape
    /// mismatch like the two variants above.
    #[error("OD table for hour {hour} references zone key {key} absent from the zone table")]
    ZoneKeyMismatch { hour: usize, key: u32 },

    #[error("OD table for hour {hour} holds invalid value {value} for {origin} -> {dest}")]
    InvalidTravelTime {
        hour:   usize,
        origin: u32,
        dest:   u32,
        value:  f64,
    },

    #[error("the zone table is empty")]
    NoZones,

    #[error("no OD statistics available to build data tensors from")]
    NoOdStatistics,

    #[error("transition ({zone}, {step}) is {found:?}, expected {expected:?}")]
    OutOfOrder {
        zone:     usize,
        step:     usize,
        expected: CellPhase,
        found:    CellPhase,
    },

    #[error("model not initialized: {0}")]
    Uninitialized(&'static str),

    #[error(transparent)]
    Config(#[from] CoreError),
}

impl ModelError {
    /// Whether the inputs disagree in dimensions or zone keys.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            ModelError::ShapeMismatch { .. }
                | ModelError::KeyMismatch { .. }
                | ModelError::ZoneKeyMismatch { .. }
        )
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
