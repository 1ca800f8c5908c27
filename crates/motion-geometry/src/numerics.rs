//! Finite-value checks.

use motion_types::MotionError;
use ndarray::ArrayView1;
use tracing::warn;

/// Fail with [`MotionError::NonFinite`] on the first NaN or ±Inf in `values`.
///
/// `tensor` names the checked quantity in the error and the log line.
pub fn check_numerics(values: ArrayView1<f32>, tensor: &str) -> Result<(), MotionError> {
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(index) => {
            let value = values[index];
            warn!(tensor, index, value, "non-finite value rejected");
            Err(MotionError::NonFinite {
                tensor: tensor.to_string(),
                index,
                value,
            })
        }
    }
}
