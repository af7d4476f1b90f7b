//! `fo-props` — the property aggregator.
//!
//! Reduces the sampled `state` and `transition` tensors of a
//! [`TrafficSystem`][fo_model::TrafficSystem] to three per-zone
//! distributions, each summing to 1:
//!
//! - `parking_map`: where vehicles stand,
//! - `driving_map`: where trips start, weighted by trip duration,
//! - `charging_map`: where vehicles stand during charging hours.

pub mod aggregate;
pub mod error;


pub use aggregate::{calc_traffic_system_properties, normalize};
pub use error::{PropsError, PropsResult};
