use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input parse error: {0}")]
    Parse(String),

    #[error("zone key {0} appears more than once")]
    DuplicateZone(u32),

    #[error("hour-of-day {0} outside 0..24")]
    HourOutOfRange(u32),

    #[error("invalid charging profile: {0}")]
    ChargingProfile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type InputResult<T> = Result<T, InputError>;
