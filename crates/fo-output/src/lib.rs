//! `fo-output` — result persistence for the fleet-occupancy simulator.
//!
//! | File                 | Rows                                               |
//! |----------------------|----------------------------------------------------|
//! | `state.csv`          | one per `(zone, step)`: parked vehicles            |
//! | `transitions.csv`    | one per `(zone, step)` with departures             |
//! | `occupancy_maps.csv` | one per zone: centroid and the three map values    |
//!
//! Zones are identified by their external key in every file.
//!
//! Write a finished run with [`write_traffic_system`], or stream steps
//! while sampling with [`StepOutputObserver`]:
//!
//! ```rust,ignore
//! use fo_output::{CsvWriter, StepOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = StepOutputObserver::new(writer, tfs.zones().clone(), tfs.grid());
//! tfs.simulate_traffic(&mut rng, &mut obs)?;
//! let maps = tfs.calc_traffic_system_properties()?;
//! obs.finish(Some(&maps))?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::StepOutputObserver;
pub use row::{MapRow, StateRow, TransitionRow};
pub use writer::{OutputWriter, write_traffic_system};
