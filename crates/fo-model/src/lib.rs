//! `fo-model` — the `TrafficSystem` aggregate and every tensor it owns.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`builder`]   | `TrafficSystemBuilder`: validates inputs, computes distances |
//! | [`system`]    | `TrafficSystem`, `Stage`, `TensorsMut`                       |
//! | [`distance`]  | `compute_od_distances`: great-circle table, 1 km diagonal   |
//! | [`travel`]    | `TravelTimes`: dense `[src, dst, hour]` statistics          |
//! | [`tensors`]   | `DataTensors`, `Transition`, `CellPhase`                     |
//! | [`maps`]      | `OccupancyMaps`, `MapKind`                                   |
//! | [`error`]     | `ModelError`, `ModelResult<T>`                               |
//!
//! # Lifecycle
//!
//! ```text
//! TrafficSystemBuilder::build   → Stage::Empty        (distances computed)
//! create_datatensors            → Stage::Allocated    (OD densified, tensors zeroed)
//! fo_prob::calc_prob_dists      → Stage::Probabilities
//! fo_sample::sample_traffic     → Stage::Sampled
//! fo_props::calc_traffic_system_properties            (maps stored on the model)
//! ```
//!
//! Calling `create_datatensors` again at any point returns to `Allocated`
//! with all tensors zeroed.

pub mod builder;
pub mod distance;
pub mod error;
pub mod maps;
pub mod system;
pub mod tensors;
pub mod travel;

#[cfg(test)]
mod tests;

pub use builder::TrafficSystemBuilder;
pub use distance::{INTRA_ZONE_DISTANCE_KM, compute_od_distances};
pub use error::{ModelError, ModelResult};
pub use maps::{MapKind, OccupancyMaps};
pub use system::{Stage, TensorsMut, TrafficSystem};
pub use tensors::{CellPhase, DataTensors, Transition};
pub use travel::{TravelTimeSpread, TravelTimes, validate_od_statistics};
