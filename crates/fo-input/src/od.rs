//! Hourly origin-destination travel-time tables.
//!
//! One [`OdTable`] holds a single statistic (mean or standard deviation of
//! travel time, in seconds) for one hour of the day, keyed by external
//! `(source_key, dest_key)` zone keys.  Tables are sparse: pairs with too
//! few observed trips are simply absent.

use rustc_hash::FxHashMap;

use fo_core::HOURS_PER_DAY;

use crate::{InputError, InputResult};

// ── OdTable ───────────────────────────────────────────────────────────────────

/// Sparse `(source_key, dest_key) → seconds` table for one hour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdTable {
    entries: FxHashMap<(u32, u32), f64>,
}

impl OdTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: u32, dest: u32, value: f64) {
        self.entries.insert((source, dest), value);
    }

    #[inline]
    pub fn get(&self, source: u32, dest: u32) -> Option<f64> {
        self.entries.get(&(source, dest)).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `((source_key, dest_key), value)` in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), f64)> + '_ {
        self.entries.iter().map(|(&k, &v)| (k, v))
    }

    /// `true` if both tables hold exactly the same set of keys.
    pub fn same_keys(&self, other: &OdTable) -> bool {
        self.len() == other.len() && self.entries.keys().all(|k| other.entries.contains_key(k))
    }
}

impl FromIterator<((u32, u32), f64)> for OdTable {
    fn from_iter<I: IntoIterator<Item = ((u32, u32), f64)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

// ── OdRecord ──────────────────────────────────────────────────────────────────

/// One aggregated observation: all trips from `source` to `dest` that
/// started during hour `hour`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdRecord {
    pub source:             u32,
    pub dest:               u32,
    pub hour:               u32,
    pub mean_travel_time:   f64,
    pub stddev_travel_time: Option<f64>,
}

// ── OdStatistics ──────────────────────────────────────────────────────────────

/// The 24 hourly mean tables and the optional 24 parallel standard-deviation
/// tables of one city.
///
/// Shapes are not validated here; `fo_model` checks table counts and key
/// agreement when the statistics are handed to a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdStatistics {
    pub mean: Vec<OdTable>,
    pub std:  Option<Vec<OdTable>>,
}

impl OdStatistics {
    pub fn new(mean: Vec<OdTable>, std: Option<Vec<OdTable>>) -> Self {
        Self { mean, std }
    }

    /// No OD tables at all (distance-only use).
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Split hourly records into exactly 24 mean tables and, if every record
    /// carries a standard deviation, 24 std tables of identical keys.
    ///
    /// Records missing a standard deviation are kept for the mean tables; a
    /// single missing value drops the std tables altogether so that mean and
    /// std always share keys.
    pub fn from_records<I>(records: I) -> InputResult<Self>
    where
        I: IntoIterator<Item = OdRecord>,
    {
        let mut mean = vec![OdTable::new(); HOURS_PER_DAY];
        let mut std = vec![OdTable::new(); HOURS_PER_DAY];
        let mut all_have_std = true;

        for r in records {
            let hour = r.hour as usize;
            if hour >= HOURS_PER_DAY {
                return Err(InputError::HourOutOfRange(r.hour));
            }
            mean[hour].insert(r.source, r.dest, r.mean_travel_time);
            match r.stddev_travel_time {
                Some(s) => std[hour].insert(r.source, r.dest, s),
                None => all_have_std = false,
            }
        }

        Ok(Self {
            mean,
            std: all_have_std.then_some(std),
        })
    }
}
