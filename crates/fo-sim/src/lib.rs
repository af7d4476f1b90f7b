//! `fo-sim` — end-to-end orchestration of the fleet-occupancy simulator.
//!
//! # Pipeline
//!
//! ```text
//! TrafficSystemBuilder::build
//!   └─ simulate_traffic
//!        ├─ create_datatensors          (if none yet, or new OD input)
//!        ├─ fo_prob::calc_prob_dists
//!        └─ fo_sample::sample_traffic
//!   └─ fo_props::calc_traffic_system_properties
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fo_model::TrafficSystemBuilder;
//! use fo_sim::SimulateTraffic;
//!
//! let mut tfs = TrafficSystemBuilder::new(zones)
//!     .od_statistics(od)
//!     .config(config)
//!     .build()?;
//! let maps = tfs.run()?;
//! println!("{:?}", maps.charging);
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                           |
//! |------------|--------------------------------------------------|
//! | `parallel` | Forwards to `fo-sample/parallel`.                |

pub mod error;
pub mod run;


pub use error::{SimError, SimResult};
pub use run::{SimulateTraffic, simulate_traffic};
