//! `fo-prob` — the probability engine.
//!
//! Turns the OD statistics held by a [`TrafficSystem`][fo_model::TrafficSystem]
//! into three per-step distributions, written in place into its tensors:
//!
//! | Tensor    | Shape       | Meaning                                            |
//! |-----------|-------------|----------------------------------------------------|
//! | `p_drive` | `(Z, T)`    | chance that a parked vehicle departs during step t |
//! | `p_dest`  | `(Z, Z, T)` | destination distribution of a departure            |
//! | `p_joint` | `(Z, Z, T)` | chance of departing towards a given destination    |
//!
//! [`calc_prob_dists`] runs the three builders in order and validates the
//! result; the individual builders are public for staged use.

pub mod engine;
pub mod error;
pub mod validate;


pub use engine::{
    calc_prob_dists, create_distribution_p_dest, create_distribution_p_drive,
    create_distribution_p_joint,
};
pub use error::{ProbError, ProbResult};
pub use validate::{ROW_SUM_TOLERANCE, validate_distributions};
