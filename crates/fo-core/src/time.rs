//! Simulation time model.
//!
//! # Design
//!
//! The horizon is one day.  It is divided into `24 * steps_per_hour` equal
//! time steps; step `t` covers
//!
//!   [t * step_duration_secs, (t + 1) * step_duration_secs)
//!
//! seconds after midnight.  OD statistics are hourly, so every step maps to
//! exactly one hour-of-day table through [`TimeGrid::hour_of`].
//!
//! The default is one step per hour (`T = 24`).

use std::fmt;

/// Number of hourly OD tables per simulation horizon.
pub const HOURS_PER_DAY: usize = 24;

const SECS_PER_HOUR: u32 = 3_600;

/// Discretization of the one-day horizon.
///
/// `TimeGrid` is `Copy` and holds no heap data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeGrid {
    /// Steps per hour.  Must evenly divide 3600 (checked by
    /// `SimConfig::validate`).
    pub steps_per_hour: u32,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::hourly()
    }
}

impl TimeGrid {
    /// One step per hour, the resolution of the OD tables.
    pub const fn hourly() -> Self {
        Self { steps_per_hour: 1 }
    }

    pub const fn new(steps_per_hour: u32) -> Self {
        Self { steps_per_hour }
    }

    /// Total number of time steps `T` in the horizon.
    #[inline]
    pub fn total_steps(&self) -> usize {
        HOURS_PER_DAY * self.steps_per_hour as usize
    }

    /// How many real seconds one step represents.
    #[inline]
    pub fn step_duration_secs(&self) -> f64 {
        f64::from(SECS_PER_HOUR / self.steps_per_hour.max(1))
    }

    /// Hour-of-day (0..24) that step `t` falls into.
    #[inline]
    pub fn hour_of(&self, step: usize) -> usize {
        (step / self.steps_per_hour.max(1) as usize) % HOURS_PER_DAY
    }

    /// How many whole steps a journey of `secs` seconds spans, rounded to
    /// the nearest step and never less than one (a departure is never
    /// visible at its destination during the step it left).
    #[inline]
    pub fn steps_for_secs(&self, secs: f64) -> usize {
        let steps = (secs.max(0.0) / self.step_duration_secs()).round() as usize;
        steps.max(1)
    }

    /// Convert an hourly probability into the per-step probability that
    /// yields the same chance of at least one event over the hour.
    ///
    /// `1 - (1 - p)^(1 / steps_per_hour)`; identity for an hourly grid.
    pub fn per_step_probability(&self, hourly: f64) -> f64 {
        if self.steps_per_hour <= 1 {
            return hourly;
        }
        let hourly = hourly.clamp(0.0, 1.0);
        1.0 - (1.0 - hourly).powf(1.0 / f64::from(self.steps_per_hour))
    }

    /// Break step `t` into (hour, minute) of the simulated day.
    pub fn clock_of(&self, step: usize) -> (u32, u32) {
        let secs = step as f64 * self.step_duration_secs();
        let hour = (secs / 3_600.0) as u32 % HOURS_PER_DAY as u32;
        let minute = ((secs % 3_600.0) / 60.0) as u32;
        (hour, minute)
    }
}

impl fmt::Display for TimeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} steps x {}s", self.total_steps(), self.step_duration_secs())
    }
}
