//! Dense hourly travel-time statistics.
//!
//! The raw [`OdStatistics`] tables are keyed by external zone keys and
//! hashed; the sampler needs O(1) indexed access by `(ZoneId, ZoneId, hour)`.
//! [`TravelTimes`] is that dense form.  It is built once by
//! `TrafficSystem::create_datatensors`, after which the raw tables are
//! dropped.

use ndarray::Array3;

use fo_core::{HOURS_PER_DAY, ZoneId};
use fo_input::{OdStatistics, OdTable, ZoneTable};

use crate::{ModelError, ModelResult};

/// Travel-time variability of an OD pair.
#[derive(Debug, Clone, PartialEq)]
pub enum TravelTimeSpread {
    /// No std tables were supplied: every trip takes exactly the mean time.
    Deterministic,
    /// Per-pair standard deviation, seconds, indexed `[src, dst, hour]`.
    Normal(Array3<f64>),
}

/// Dense `[src, dst, hour]` travel-time tensors.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimes {
    /// Mean travel time in seconds; 0 where `observed` is `false`.
    mean: Array3<f64>,
    /// `true` where the input tables contain the pair for that hour.
    observed: Array3<bool>,
    spread: TravelTimeSpread,
}

impl TravelTimes {
    /// Densify validated statistics.  Keys must already be known to `zones`
    /// (see [`validate_od_statistics`]).
    pub(crate) fn from_statistics(zones: &ZoneTable, od: &OdStatistics) -> ModelResult<Self> {
        let n = zones.len();
        let shape = (n, n, HOURS_PER_DAY);
        let mut mean = Array3::zeros(shape);
        let mut observed = Array3::from_elem(shape, false);

        for (hour, table) in od.mean.iter().enumerate() {
            for ((src, dst), value) in table.iter() {
                let (s, d) = resolve(zones, hour, src, dst)?;
                mean[[s.index(), d.index(), hour]] = value;
                observed[[s.index(), d.index(), hour]] = true;
            }
        }

        let spread = match &od.std {
            None => TravelTimeSpread::Deterministic,
            Some(tables) => {
                let mut std = Array3::zeros(shape);
                for (hour, table) in tables.iter().enumerate() {
                    for ((src, dst), value) in table.iter() {
                        let (s, d) = resolve(zones, hour, src, dst)?;
                        std[[s.index(), d.index(), hour]] = value;
                    }
                }
                TravelTimeSpread::Normal(std)
            }
        };

        Ok(Self { mean, observed, spread })
    }

    /// Observed mean travel time in seconds, or `None` if the pair was not
    /// observed during `hour`.
    #[inline]
    pub fn mean(&self, src: ZoneId, dst: ZoneId, hour: usize) -> Option<f64> {
        let idx = [src.index(), dst.index(), hour];
        self.observed[idx].then(|| self.mean[idx])
    }

    /// Standard deviation in seconds; 0 for deterministic statistics or an
    /// unobserved pair.
    #[inline]
    pub fn std(&self, src: ZoneId, dst: ZoneId, hour: usize) -> f64 {
        match &self.spread {
            TravelTimeSpread::Deterministic => 0.0,
            TravelTimeSpread::Normal(std) => std[[src.index(), dst.index(), hour]],
        }
    }

    #[inline]
    pub fn spread(&self) -> &TravelTimeSpread {
        &self.spread
    }

    /// Number of destinations observed from `src` during `hour`.
    pub fn observed_destinations(&self, src: ZoneId, hour: usize) -> usize {
        self.observed
            .slice(ndarray::s![src.index(), .., hour])
            .iter()
            .filter(|&&o| o)
            .count()
    }

    /// Iterate `(dst, mean_secs)` over destinations observed from `src`
    /// during `hour`.
    pub fn observed_from(
        &self,
        src:  ZoneId,
        hour: usize,
    ) -> impl Iterator<Item = (ZoneId, f64)> + '_ {
        let n = self.mean.dim().1;
        (0..n).filter_map(move |d| {
            let dst = ZoneId(d as u32);
            self.mean(src, dst, hour).map(|m| (dst, m))
        })
    }
}

fn resolve(zones: &ZoneTable, hour: usize, src: u32, dst: u32) -> ModelResult<(ZoneId, ZoneId)> {
    let s = zones
        .zone_id(src)
        .ok_or(ModelError::ZoneKeyMismatch { hour, key: src })?;
    let d = zones
        .zone_id(dst)
        .ok_or(ModelError::ZoneKeyMismatch { hour, key: dst })?;
    Ok((s, d))
}

/// Check OD statistics against the zone table.
///
/// - Mean tables: none at all (distance-only model) or exactly 24.
/// - Std tables: same count as the mean tables, identical keys per hour.
/// - Every key must name a zone in `zones`.
/// - Every value must be finite and non-negative.
pub fn validate_od_statistics(zones: &ZoneTable, od: &OdStatistics) -> ModelResult<()> {
    if !od.mean.is_empty() && od.mean.len() != HOURS_PER_DAY {
        return Err(ModelError::ShapeMismatch {
            what:     "hourly mean travel-time tables",
            expected: HOURS_PER_DAY,
            got:      od.mean.len(),
        });
    }

    if let Some(std) = &od.std {
        if std.len() != od.mean.len() {
            return Err(ModelError::ShapeMismatch {
                what:     "hourly std travel-time tables",
                expected: od.mean.len(),
                got:      std.len(),
            });
        }
        for (hour, (m, s)) in od.mean.iter().zip(std).enumerate() {
            if !m.same_keys(s) {
                return Err(ModelError::KeyMismatch { hour });
            }
            check_table(zones, hour, s)?;
        }
    }

    for (hour, table) in od.mean.iter().enumerate() {
        check_table(zones, hour, table)?;
    }
    Ok(())
}

fn check_table(zones: &ZoneTable, hour: usize, table: &OdTable) -> ModelResult<()> {
    for ((src, dst), value) in table.iter() {
        resolve(zones, hour, src, dst)?;
        if !(value.is_finite() && value >= 0.0) {
            return Err(ModelError::InvalidTravelTime {
                hour,
                origin: src,
                dest: dst,
                value,
            });
        }
    }
    Ok(())
}
