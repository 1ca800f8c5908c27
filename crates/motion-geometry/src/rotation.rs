//! Batched Euler-angle rotation composition.
//!
//! Each batch element gets `R = Rz · Rx · Ry` with
//!
//! ```text
//! Rx = | 1   0    0  |   Ry = |  cy  0  sy |   Rz = | cz -sz  0 |
//!      | 0  cx  -sx  |        |  0   1  0  |        | sz  cz  0 |
//!      | 0  sx   cx  |        | -sy  0  cy |        | 0   0   1 |
//! ```
//!
//! # Example
//!
//! ```rust
//! use motion_geometry::rotation::euler_to_rot;
//! use motion_types::AngleEncoding;
//! use ndarray::array;
//!
//! let zero = array![0.0_f32, 0.0];
//! let rot = euler_to_rot(zero.view(), zero.view(), zero.view(), AngleEncoding::Radians).unwrap();
//! assert_eq!(rot.dim(), (2, 3, 3));
//! assert_eq!(rot[[1, 0, 0]], 1.0);
//! assert_eq!(rot[[1, 0, 1]], 0.0);
//! ```

use motion_types::{AngleEncoding, MotionError};
use nalgebra::Matrix3;
use ndarray::{Array1, Array3, ArrayView1, ArrayView2};
use tracing::debug;

use crate::numerics::check_numerics;

// ────────────────────────────────────────────────────────────────────────────
// Elementary rotations
// ────────────────────────────────────────────────────────────────────────────

/// Rotation about the X axis given the angle's sine and cosine.
pub fn rot_x(sin: f32, cos: f32) -> Matrix3<f32> {
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, cos, -sin, //
        0.0, sin, cos,
    )
}

/// Rotation about the Y axis given the angle's sine and cosine.
pub fn rot_y(sin: f32, cos: f32) -> Matrix3<f32> {
    Matrix3::new(
        cos, 0.0, sin, //
        0.0, 1.0, 0.0, //
        -sin, 0.0, cos,
    )
}

/// Rotation about the Z axis given the angle's sine and cosine.
pub fn rot_z(sin: f32, cos: f32) -> Matrix3<f32> {
    Matrix3::new(
        cos, -sin, 0.0, //
        sin, cos, 0.0, //
        0.0, 0.0, 1.0,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Batched composition
// ────────────────────────────────────────────────────────────────────────────

/// Compose `(N, 3, 3)` rotations `Rz · Rx · Ry` from three length-`N` inputs.
///
/// With [`AngleEncoding::Sines`] the inputs are angle sines; cosines are
/// recovered as `sqrt(1 - s²)` (always non-negative, so angles are assumed to
/// lie within ±90°) and every recovered cosine is checked.  A sine outside
/// `[-1, 1]` yields [`MotionError::NonFinite`] naming `cos_x`, `cos_y` or
/// `cos_z`.
///
/// With [`AngleEncoding::Radians`] no check runs and non-finite angles
/// propagate into the output.
pub fn euler_to_rot(
    x: ArrayView1<f32>,
    y: ArrayView1<f32>,
    z: ArrayView1<f32>,
    encoding: AngleEncoding,
) -> Result<Array3<f32>, MotionError> {
    let n = x.len();
    if y.len() != n {
        return Err(MotionError::shape("y", format!("[{n}]"), y.shape()));
    }
    if z.len() != n {
        return Err(MotionError::shape("z", format!("[{n}]"), z.shape()));
    }
    debug!(batch = n, %encoding, "composing rotations");

    let (sin_x, cos_x) = sin_cos(x, encoding, "cos_x")?;
    let (sin_y, cos_y) = sin_cos(y, encoding, "cos_y")?;
    let (sin_z, cos_z) = sin_cos(z, encoding, "cos_z")?;

    let mut out = Array3::<f32>::zeros((n, 3, 3));
    for i in 0..n {
        let rot = rot_z(sin_z[i], cos_z[i]) * rot_x(sin_x[i], cos_x[i]) * rot_y(sin_y[i], cos_y[i]);
        write_matrix(&mut out, i, &rot);
    }
    Ok(out)
}

/// Like [`euler_to_rot`], taking the three parameters as the columns of an
/// `(N, 3)` array.
pub fn euler_to_rot_columns(
    angles: ArrayView2<f32>,
    encoding: AngleEncoding,
) -> Result<Array3<f32>, MotionError> {
    if angles.ncols() != 3 {
        return Err(MotionError::shape("angles", "[N, 3]", angles.shape()));
    }
    euler_to_rot(
        angles.column(0),
        angles.column(1),
        angles.column(2),
        encoding,
    )
}

fn sin_cos(
    values: ArrayView1<f32>,
    encoding: AngleEncoding,
    cos_name: &str,
) -> Result<(Array1<f32>, Array1<f32>), MotionError> {
    match encoding {
        AngleEncoding::Radians => Ok((values.mapv(f32::sin), values.mapv(f32::cos))),
        AngleEncoding::Sines => {
            let cos = values.mapv(|s| (1.0 - s * s).sqrt());
            check_numerics(cos.view(), cos_name)?;
            Ok((values.to_owned(), cos))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Array <-> matrix helpers
// ────────────────────────────────────────────────────────────────────────────

/// Read batch element `i` of an `(N, 3, 3)` array.
///
/// # Panics
///
/// Panics if `i >= N`.
#[cfg(test)]
pub(crate) fn matrix_at(rots: ndarray::ArrayView3<f32>, i: usize) -> Matrix3<f32> {
    let m = rots.slice(ndarray::s![i, .., ..]);
    Matrix3::from_fn(|r, c| m[[r, c]])
}

/// Interpret 9 row-major values as a 3×3 matrix.
pub fn matrix_from_flat(flat: ArrayView1<f32>) -> Matrix3<f32> {
    Matrix3::from_fn(|r, c| flat[r * 3 + c])
}

fn write_matrix(out: &mut Array3<f32>, i: usize, m: &Matrix3<f32>) {
    for r in 0..3 {
        for c in 0..3 {
            out[[i, r, c]] = m[(r, c)];
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
