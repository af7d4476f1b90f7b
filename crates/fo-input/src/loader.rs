//! CSV loaders for prepared zone and OD tables.
//!
//! # Zone CSV
//!
//! One row per zone; the centroid has already been computed.
//!
//! ```csv
//! zone_id,zone_lat,zone_long
//! 1,52.3712,4.8952
//! 2,52.3598,4.9101
//! ```
//!
//! # OD CSV
//!
//! Hourly aggregates in the Uber Movement layout.  One row per
//! `(source, destination, hour-of-day)`; unknown columns are ignored.
//!
//! ```csv
//! sourceid,dstid,hod,mean_travel_time,standard_deviation_travel_time
//! 1,2,8,912.4,210.7
//! 2,1,17,1033.0,305.2
//! ```
//!
//! `source_id`, `dest_id` and `stddev_travel_time` are accepted as aliases.
//! The std column may be absent or empty, in which case no std tables are
//! produced (see [`OdStatistics::from_records`]).

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use fo_core::GeoPoint;

use crate::{InputError, OdRecord, OdStatistics, ZoneTable};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ZoneRecord {
    zone_id:   u32,
    zone_lat:  f64,
    zone_long: f64,
}

#[derive(Deserialize)]
struct OdCsvRecord {
    #[serde(alias = "source_id")]
    sourceid: u32,
    #[serde(alias = "dest_id")]
    dstid: u32,
    hod: u32,
    mean_travel_time: f64,
    #[serde(default, alias = "stddev_travel_time")]
    standard_deviation_travel_time: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the zone table from a CSV file.
pub fn load_zones_csv(path: &Path) -> Result<ZoneTable, InputError> {
    let file = std::fs::File::open(path).map_err(InputError::Io)?;
    load_zones_reader(file)
}

/// Like [`load_zones_csv`] but accepts any `Read` source.
pub fn load_zones_reader<R: Read>(reader: R) -> Result<ZoneTable, InputError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize::<ZoneRecord>() {
        let row = result.map_err(|e| InputError::Parse(e.to_string()))?;
        if !(row.zone_lat.is_finite() && row.zone_long.is_finite()) {
            return Err(InputError::Parse(format!(
                "zone {} has a non-finite centroid",
                row.zone_id
            )));
        }
        rows.push((row.zone_id, GeoPoint::new(row.zone_lat, row.zone_long)));
    }

    ZoneTable::new(rows)
}

/// Load 24 hourly mean (and, if present, std) travel-time tables from a CSV
/// file.
pub fn load_od_csv(path: &Path) -> Result<OdStatistics, InputError> {
    let file = std::fs::File::open(path).map_err(InputError::Io)?;
    load_od_reader(file)
}

/// Like [`load_od_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_od_reader<R: Read>(reader: R) -> Result<OdStatistics, InputError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize::<OdCsvRecord>() {
        let row = result.map_err(|e| InputError::Parse(e.to_string()))?;
        if !(row.mean_travel_time.is_finite() && row.mean_travel_time >= 0.0) {
            return Err(InputError::Parse(format!(
                "invalid mean_travel_time {} for {} -> {} at hour {}",
                row.mean_travel_time, row.sourceid, row.dstid, row.hod
            )));
        }
        records.push(OdRecord {
            source:             row.sourceid,
            dest:               row.dstid,
            hour:               row.hod,
            mean_travel_time:   row.mean_travel_time,
            stddev_travel_time: row.standard_deviation_travel_time,
        });
    }

    OdStatistics::from_records(records)
}
