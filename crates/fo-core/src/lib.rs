//! `fo-core` — foundational types for the fleet-occupancy simulator.
//!
//! This crate is a dependency of every other `fo-*` crate.  It has no `fo-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `ZoneId`                                              |
//! | [`geo`]         | `GeoPoint`, haversine distance in km                  |
//! | [`time`]        | `TimeGrid`, `HOURS_PER_DAY`                           |
//! | [`rng`]         | `SimRng` (run-level), `ZoneRng` (per zone, per step)  |
//! | [`config`]      | `SimConfig`                                           |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::ZoneId;
pub use rng::{SimRng, ZoneRng};
pub use time::{HOURS_PER_DAY, TimeGrid};
