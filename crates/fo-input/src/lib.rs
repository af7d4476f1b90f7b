//! `fo-input` — the two input structures consumed by the simulator, plus CSV
//! and GeoJSON loading of prepared tables.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`zones`]     | `ZoneTable`: zone keys and centroids                     |
//! | [`od`]        | `OdTable`, `OdStatistics`: hourly travel-time tables     |
//! | [`charging`]  | `ChargingProfile`: hourly charging weights               |
//! | [`loader`]    | `load_zones_csv`, `load_od_csv` and their reader variants |
//! | [`geojson`]   | `load_zones_geojson`: centroids from zone boundaries     |
//! | [`error`]     | `InputError`, `InputResult<T>`                            |
//!
//! Everything here is plain, already-validated input: the simulator never
//! mutates these structures.

pub mod charging;
pub mod error;
pub mod geojson;
pub mod loader;
pub mod od;
pub mod zones;


pub use charging::ChargingProfile;
pub use error::{InputError, InputResult};
pub use geojson::{load_zones_geojson, load_zones_geojson_reader, read_zone_boundaries};
pub use loader::{load_od_csv, load_od_reader, load_zones_csv, load_zones_reader};
pub use od::{OdRecord, OdStatistics, OdTable};
pub use zones::ZoneTable;
