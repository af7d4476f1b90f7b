//! A synthetic city: a grid of zones with hourly OD statistics derived from
//! distance and a congestion curve.

use fo_core::{GeoPoint, HOURS_PER_DAY};
use fo_input::{OdStatistics, OdTable, ZoneTable};

// ── Constants ─────────────────────────────────────────────────────────────────

const GRID_ROWS:       u32 = 4;
const GRID_COLS:       u32 = 5;
const ORIGIN:          GeoPoint = GeoPoint { lat: 52.33, lon: 4.84 };
const CELL_DEG_LAT:    f64 = 0.018; // ~2 km
const CELL_DEG_LON:    f64 = 0.030; // ~2 km at 52° N
const FREE_FLOW_KMH:   f64 = 35.0;
/// Pairs further apart than this are only observed during the day.
const NIGHT_RANGE_KM:  f64 = 4.0;

/// Relative slowdown per hour of day: 1.0 is free flow.
const CONGESTION: [f64; HOURS_PER_DAY] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 1.05, 1.2, 1.6, 1.8, 1.5, 1.3, 1.25,
    1.3, 1.3, 1.3, 1.4, 1.6, 1.8, 1.6, 1.3, 1.15, 1.1, 1.05, 1.0,
];

/// Home charging in the evening and overnight, some at work mid-day.
pub const CHARGING_WEIGHTS: [f64; HOURS_PER_DAY] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 0.8, 0.5, 0.2, 0.2, 0.4, 0.5, 0.5,
    0.5, 0.5, 0.4, 0.3, 0.2, 0.3, 0.6, 0.9, 1.0, 1.0, 1.0, 1.0,
];

// ── Builders ──────────────────────────────────────────────────────────────────

/// `GRID_ROWS × GRID_COLS` zones keyed `row * 100 + col`.
pub fn zones() -> anyhow::Result<ZoneTable> {
    let rows = (0..GRID_ROWS).flat_map(|r| {
        (0..GRID_COLS).map(move |c| {
            let centroid = GeoPoint::new(
                ORIGIN.lat + CELL_DEG_LAT * f64::from(r),
                ORIGIN.lon + CELL_DEG_LON * f64::from(c),
            );
            (r * 100 + c, centroid)
        })
    });
    Ok(ZoneTable::new(rows)?)
}

/// Mean travel time from distance at free-flow speed times the hour's
/// congestion; std at 15 % of the mean.  Long pairs go unobserved at night.
pub fn od_statistics(zones: &ZoneTable) -> OdStatistics {
    let mut mean = vec![OdTable::new(); HOURS_PER_DAY];
    let mut std = vec![OdTable::new(); HOURS_PER_DAY];

    for (_, src, a) in zones.iter() {
        for (_, dst, b) in zones.iter() {
            let km = a.distance_km(b).max(1.0);
            for (hour, &factor) in CONGESTION.iter().enumerate() {
                let night = !(6..22).contains(&hour);
                if night && km > NIGHT_RANGE_KM {
                    continue;
                }
                let secs = km / FREE_FLOW_KMH * 3_600.0 * factor;
                mean[hour].insert(src, dst, secs);
                std[hour].insert(src, dst, 0.15 * secs);
            }
        }
    }
    OdStatistics::new(mean, Some(std))
}
