//! Invariant checks over the built distributions.

use ndarray::{Axis, s};

use fo_model::DataTensors;

use crate::{ProbError, ProbResult};

/// Absolute tolerance for row-sum comparisons.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Check every probability invariant:
///
/// - `p_drive` values finite and in `[0, 1]`; `Σ_z p_drive[:, t] > 0`.
/// - `p_dest` values non-negative; each `(src, t)` row sums to 1 where
///   `p_drive[src, t] > 0` and is identically 0 otherwise.
/// - `Σ_dst p_joint[src, :, t] == p_drive[src, t]`.
pub fn validate_distributions(tensors: &DataTensors) -> ProbResult<()> {
    let zones = tensors.number_zones();

    for (t, column) in tensors.p_drive.axis_iter(Axis(1)).enumerate() {
        for (z, &p) in column.iter().enumerate() {
            if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
                return Err(invariant("p_drive within [0, 1]", Some(z), t, p));
            }
        }
        let total = column.sum();
        if total <= 0.0 {
            return Err(invariant("positive aggregate p_drive", None, t, total));
        }
    }

    for t in 0..tensors.total_steps() {
        for src in 0..zones {
            let drive = tensors.p_drive[[src, t]];
            let dest = tensors.p_dest.slice(s![src, .., t]);

            if let Some(&p) = dest.iter().find(|p| !(p.is_finite() && **p >= 0.0)) {
                return Err(invariant("non-negative p_dest", Some(src), t, p));
            }
            let dest_sum = dest.sum();
            let expected = if drive > 0.0 { 1.0 } else { 0.0 };
            if (dest_sum - expected).abs() > ROW_SUM_TOLERANCE {
                return Err(invariant("p_dest row sum", Some(src), t, dest_sum));
            }

            let joint_sum = tensors.p_joint.slice(s![src, .., t]).sum();
            if (joint_sum - drive).abs() > ROW_SUM_TOLERANCE {
                return Err(invariant("p_joint row sum equals p_drive", Some(src), t, joint_sum));
            }
        }
    }
    Ok(())
}

fn invariant(what: &'static str, zone: Option<usize>, step: usize, value: f64) -> ProbError {
    ProbError::Invariant { what, zone, step, value }
}
