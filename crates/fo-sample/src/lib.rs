//! `fo-sample` — the discrete-time Monte-Carlo sampler.
//!
//! # Step loop
//!
//! ```text
//! solve_initial_value_problem      state[:, 0] ← fleet split by activity
//! for t in 0..T:
//!   ① driving      departures[z] ~ Binomial(state[z, t], p_drive[z, t])
//!   ② destination  dest[z] ~ p_dest[z, :, t]
//!   ③ travel       time ~ Normal(mean, std) clamped ≥ 0, distance scaled
//!   ④ propagate    departures move to state[dest, t + travel steps];
//!                  the rest carries over to state[:, t + 1]
//! ```
//!
//! The stages are public and can be driven one step at a time; each checks
//! the phase of the cells it writes, so they only run in this order.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Runs the per-zone compute phase of ①–③ on Rayon.         |

pub mod error;
pub mod observer;
pub mod sampler;
pub mod stages;

#[cfg(test)]
mod tests;

pub use error::{SampleError, SampleResult};
pub use observer::{NoopObserver, SampleObserver};
pub use sampler::{propagate_occupancy, sample_traffic};
pub use stages::{
    destination_choice_sampling, driving_activity_sampling, solve_initial_value_problem,
    traveltime_and_distance_sampling,
};
