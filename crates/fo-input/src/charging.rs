//! Hourly charging weights.

use fo_core::HOURS_PER_DAY;

use crate::{InputError, InputResult};

/// When parked vehicles are assumed to charge.
///
/// `Uniform` (the default) weights every hour equally; `Hourly` carries one
/// non-negative weight per hour of the day.  Weights are relative; the
/// charging map is normalized afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ChargingProfile {
    #[default]
    Uniform,
    Hourly([f64; HOURS_PER_DAY]),
}

impl ChargingProfile {
    /// Build an hourly profile, checking length and sign.
    pub fn hourly(weights: &[f64]) -> InputResult<Self> {
        let arr: [f64; HOURS_PER_DAY] = weights.try_into().map_err(|_| {
            InputError::ChargingProfile(format!(
                "expected {HOURS_PER_DAY} hourly weights, got {}",
                weights.len()
            ))
        })?;
        if let Some((hour, w)) = arr
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
        {
            return Err(InputError::ChargingProfile(format!(
                "weight for hour {hour} must be finite and non-negative, got {w}"
            )));
        }
        Ok(Self::Hourly(arr))
    }

    /// Weight of hour-of-day `hour` (0..24).
    #[inline]
    pub fn weight(&self, hour: usize) -> f64 {
        match self {
            Self::Uniform => 1.0,
            Self::Hourly(w) => w[hour % HOURS_PER_DAY],
        }
    }
}

impl TryFrom<Vec<f64>> for ChargingProfile {
    type Error = InputError;

    fn try_from(weights: Vec<f64>) -> InputResult<Self> {
        Self::hourly(&weights)
    }
}
