//! Object and camera motion losses.
//!
//! A predicted motion carries three rotation parameters (Euler angles or
//! their sines, see [`AngleEncoding`]), a translation and a pivot.  Targets
//! carry the ground-truth rotation as a flattened row-major 3×3 matrix.
//!
//! | Layout | Columns |
//! |---|---|
//! | detection prediction | `[angles(3), t(3), p(3)]` – 9 |
//! | detection target | `[R(9), t(3), p(3)]` – 15 |
//! | camera prediction | `[angles(3), t(3)]` – 6 |
//! | camera target | `[R(9), t(3)]` – 12 |
//!
//! Per element the loss is
//!
//! ```text
//! err_angle = acos(clamp((trace(R_predᵀ · R_gt) − 1) / 2, −1, 1))
//! err_trans = ‖t_gt − t_pred‖
//! err_pivot = ‖p_gt − p_pred‖
//! ```
//!
//! Translation and pivot differences are taken in the common frame, not
//! rotated into the predicted frame; since rotations preserve length the
//! norms would be identical either way.
//!
//! The angular term is symmetric in exact arithmetic
//! (`trace(AᵀB) = trace(BᵀA)`), but the loss itself is not a symmetric
//! function: the prediction is decoded from an angle encoding while the
//! target is taken as-is, so the two sides cannot simply be swapped, and
//! rounding makes swapped evaluations agree only to within float tolerance.
//!
//! # Example
//!
//! ```rust
//! use motion_geometry::loss::motion_losses;
//! use motion_types::LossOptions;
//! use ndarray::array;
//!
//! // Zero sines decode to the identity rotation.
//! let pred = array![[0.0_f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]];
//! let target = array![[1.0_f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0,
//!                      1.0, 0.0, 0.0, 0.0, 0.0, 2.0]];
//! let errs = motion_losses(pred.view(), target.view(), LossOptions::default()).unwrap();
//! assert_eq!(errs.angle[0], 0.0);
//! assert_eq!(errs.translation[0], 0.0);
//! assert!((errs.pivot[0] - 2.0).abs() < 1e-6);
//! ```

use motion_types::{AngleEncoding, LossOptions, MotionError};
use nalgebra::Vector3;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayView3, Axis, concatenate, s};
use tracing::debug;

use crate::rotation::{euler_to_rot_columns, matrix_from_flat};

const DETECTION_PRED_COLS: usize = 9;
const DETECTION_TARGET_COLS: usize = 15;
const CAMERA_PRED_COLS: usize = 6;
const CAMERA_TARGET_COLS: usize = 12;

// ────────────────────────────────────────────────────────────────────────────
// Output type
// ────────────────────────────────────────────────────────────────────────────

/// Per-element error components returned by [`motion_losses`].
#[derive(Debug, Clone, PartialEq)]
pub struct MotionErrors {
    /// Geodesic rotation error in radians, in `[0, π]`.
    pub angle: Array1<f32>,
    /// Euclidean translation error.
    pub translation: Array1<f32>,
    /// Euclidean pivot error.
    pub pivot: Array1<f32>,
}

impl MotionErrors {
    /// Number of evaluated elements.
    pub fn len(&self) -> usize {
        self.angle.len()
    }

    /// Whether no elements were evaluated.
    pub fn is_empty(&self) -> bool {
        self.angle.is_empty()
    }

    /// Sum of the three components per element.
    pub fn total(&self) -> Array1<f32> {
        &self.angle + &self.translation + &self.pivot
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Post-processing
// ────────────────────────────────────────────────────────────────────────────

/// Replace the leading three rotation parameters of each row with the
/// flattened rotation matrix: `(M, 3 + k)` → `(M, 9 + k)`.
///
/// With `options.clip_sines` and [`AngleEncoding::Sines`] the sines are
/// clamped to `[-1, 1]` first, so out-of-range predictions decode to ±90°
/// instead of failing the validity check.
pub fn postprocess_detection_motions(
    pred: ArrayView2<f32>,
    options: LossOptions,
) -> Result<Array2<f32>, MotionError> {
    let (rows, cols) = pred.dim();
    if cols < 3 {
        return Err(MotionError::shape("pred", "[M, >=3]", pred.shape()));
    }

    let mut angles = pred.slice(s![.., 0..3]).to_owned();
    if options.clip_sines && options.encoding == AngleEncoding::Sines {
        angles.mapv_inplace(|v| v.clamp(-1.0, 1.0));
    }

    let rot_flat = euler_to_rot_columns(angles.view(), options.encoding)?
        .into_shape_with_order((rows, 9))
        .map_err(|_| MotionError::shape("rotations", format!("[{rows}, 9]"), &[rows, 3, 3]))?;

    concatenate(Axis(1), &[rot_flat.view(), pred.slice(s![.., 3..])])
        .map_err(|_| MotionError::shape("pred", "[M, >=3]", pred.shape()))
}

/// Post-process a single camera motion `[angles(3), t(3)]` into
/// `[R(9), t(3)]`.
pub fn postprocess_camera_motion(
    pred: ArrayView1<f32>,
    options: LossOptions,
) -> Result<Array1<f32>, MotionError> {
    if pred.len() != CAMERA_PRED_COLS {
        return Err(MotionError::shape("camera_pred", "[6]", pred.shape()));
    }
    let batched = postprocess_detection_motions(pred.insert_axis(Axis(0)), options)?;
    Ok(batched.row(0).to_owned())
}

// ────────────────────────────────────────────────────────────────────────────
// Losses
// ────────────────────────────────────────────────────────────────────────────

/// Rotation, translation and pivot errors for `(M, 9)` predictions against
/// `(M, 15)` targets.
pub fn motion_losses(
    pred: ArrayView2<f32>,
    target: ArrayView2<f32>,
    options: LossOptions,
) -> Result<MotionErrors, MotionError> {
    let rows = pred.nrows();
    if pred.ncols() != DETECTION_PRED_COLS {
        return Err(MotionError::shape("pred", "[M, 9]", pred.shape()));
    }
    if target.dim() != (rows, DETECTION_TARGET_COLS) {
        return Err(MotionError::shape(
            "target",
            format!("[{rows}, {DETECTION_TARGET_COLS}]"),
            target.shape(),
        ));
    }
    debug!(rows, encoding = %options.encoding, "evaluating motion losses");

    let pred = postprocess_detection_motions(pred, options)?;

    let mut angle = Array1::<f32>::zeros(rows);
    let mut translation = Array1::<f32>::zeros(rows);
    let mut pivot = Array1::<f32>::zeros(rows);

    for i in 0..rows {
        let p = pred.row(i);
        let g = target.row(i);

        let rot = matrix_from_flat(p.slice(s![0..9]));
        let gt_rot = matrix_from_flat(g.slice(s![0..9]));
        let d_rot = rot.transpose() * gt_rot;

        angle[i] = ((d_rot.trace() - 1.0) / 2.0).clamp(-1.0, 1.0).acos();
        translation[i] = (vec3(g, 9) - vec3(p.view(), 9)).norm();
        pivot[i] = (vec3(g, 12) - vec3(p.view(), 12)).norm();
    }

    Ok(MotionErrors {
        angle,
        translation,
        pivot,
    })
}

/// Per-anchor errors for `(B, A, 9)` predictions against `(B, A, 15)`
/// targets, flattened to `B·A` rows in row-major order.
pub fn detection_motion_errors(
    pred: ArrayView3<f32>,
    target: ArrayView3<f32>,
    options: LossOptions,
) -> Result<MotionErrors, MotionError> {
    let (batch, anchors, cols) = pred.dim();
    if cols != DETECTION_PRED_COLS {
        return Err(MotionError::shape("pred", "[B, A, 9]", pred.shape()));
    }
    if target.dim() != (batch, anchors, DETECTION_TARGET_COLS) {
        return Err(MotionError::shape(
            "target",
            format!("[{batch}, {anchors}, {DETECTION_TARGET_COLS}]"),
            target.shape(),
        ));
    }

    let rows = batch * anchors;
    let flat_pred = pred
        .to_shape((rows, DETECTION_PRED_COLS))
        .map_err(|_| MotionError::shape("pred", "[B, A, 9]", pred.shape()))?;
    let flat_target = target
        .to_shape((rows, DETECTION_TARGET_COLS))
        .map_err(|_| MotionError::shape("target", "[B, A, 15]", target.shape()))?;

    motion_losses(flat_pred.view(), flat_target.view(), options)
}

/// Weighted detection loss together with the unweighted per-anchor errors
/// it was built from.
///
/// Returns `(errors, loss)` where `loss` is the `(B, A)` array
/// [`motion_loss`] produces.
pub fn motion_loss_breakdown(
    pred: ArrayView3<f32>,
    target: ArrayView3<f32>,
    weights: ArrayView2<f32>,
    options: LossOptions,
) -> Result<(MotionErrors, Array2<f32>), MotionError> {
    let (batch, anchors, _) = pred.dim();
    if weights.dim() != (batch, anchors) {
        return Err(MotionError::shape(
            "weights",
            format!("[{batch}, {anchors}]"),
            weights.shape(),
        ));
    }

    let errs = detection_motion_errors(pred, target, options)?;
    let rows = errs.len();
    let loss = errs
        .total()
        .into_shape_with_order((batch, anchors))
        .map_err(|_| MotionError::shape("loss", format!("[{batch}, {anchors}]"), &[rows]))?
        * &weights;
    Ok((errs, loss))
}

/// Weighted detection motion loss.
///
/// `pred` is `(B, A, 9)`, `target` is `(B, A, 15)` and `weights` is
/// `(B, A)`; the result is `(B, A)` holding
/// `(err_angle + err_trans + err_pivot) * weight` per anchor.
pub fn motion_loss(
    pred: ArrayView3<f32>,
    target: ArrayView3<f32>,
    weights: ArrayView2<f32>,
    options: LossOptions,
) -> Result<Array2<f32>, MotionError> {
    motion_loss_breakdown(pred, target, weights, options).map(|(_, loss)| loss)
}

/// Errors for `(B, 6)` camera predictions against `(B, 12)` targets.
///
/// A zero pivot is appended to both sides, so `pivot` is always zero.
pub fn camera_motion_errors(
    pred: ArrayView2<f32>,
    target: ArrayView2<f32>,
    options: LossOptions,
) -> Result<MotionErrors, MotionError> {
    let batch = pred.nrows();
    if pred.ncols() != CAMERA_PRED_COLS {
        return Err(MotionError::shape("camera_pred", "[B, 6]", pred.shape()));
    }
    if target.dim() != (batch, CAMERA_TARGET_COLS) {
        return Err(MotionError::shape(
            "camera_target",
            format!("[{batch}, {CAMERA_TARGET_COLS}]"),
            target.shape(),
        ));
    }

    let mock_pivot = Array2::<f32>::zeros((batch, 3));
    let padded_pred = concatenate(Axis(1), &[pred.view(), mock_pivot.view()])
        .map_err(|_| MotionError::shape("camera_pred", "[B, 6]", pred.shape()))?;
    let padded_target = concatenate(Axis(1), &[target.view(), mock_pivot.view()])
        .map_err(|_| MotionError::shape("camera_target", "[B, 12]", target.shape()))?;

    motion_losses(padded_pred.view(), padded_target.view(), options)
}

/// Camera motion loss for `(B, 6)` predictions against `(B, 12)` targets.
///
/// Evaluated as a detection loss with a zero pivot on both sides, so only
/// the rotation and translation terms contribute.  Returns one value per
/// batch element.
pub fn camera_motion_loss(
    pred: ArrayView2<f32>,
    target: ArrayView2<f32>,
    options: LossOptions,
) -> Result<Array1<f32>, MotionError> {
    let errs = camera_motion_errors(pred, target, options)?;
    Ok(errs.angle + &errs.translation)
}

fn vec3(row: ArrayView1<f32>, offset: usize) -> Vector3<f32> {
    Vector3::new(row[offset], row[offset + 1], row[offset + 2])
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
