//! Depth back-projection through a pinhole camera.
//!
//! By similar triangles, a pixel `(x, y)` observed at depth `d` lies at
//!
//! ```text
//! X = (x − x0) · d / f
//! Y = (y − y0) · d / f
//! Z = d
//! ```
//!
//! No validation is done on the intrinsics: a zero focal length yields
//! non-finite coordinates.

use motion_types::{CameraIntrinsics, MotionError};
use nalgebra::Vector3;
use ndarray::{Array4, ArrayView4};
use tracing::debug;

/// Back-project a single pixel at depth `depth`.
pub fn pixel_to_3d(x: f32, y: f32, depth: f32, intrinsics: &CameraIntrinsics) -> Vector3<f32> {
    let factor = depth / intrinsics.f;
    Vector3::new(
        (x - intrinsics.x0) * factor,
        (y - intrinsics.y0) * factor,
        depth,
    )
}

/// Back-project a `(N, H, W, 1)` depth map into `(N, H, W, 3)` points.
///
/// Channel order of the output is `X, Y, Z`; pixel `(x, y)` is column `x`,
/// row `y` of the map.
///
/// ```rust
/// use motion_geometry::projection::get_3d_coords;
/// use motion_types::CameraIntrinsics;
/// use ndarray::Array4;
///
/// let depth = Array4::<f32>::from_elem((1, 3, 4, 1), 2.0);
/// let k = CameraIntrinsics::new(1.0, 1.0, 1.0);
/// let xyz = get_3d_coords(depth.view(), &k).unwrap();
/// assert_eq!(xyz.dim(), (1, 3, 4, 3));
/// assert_eq!(xyz[[0, 1, 1, 0]], 0.0);
/// assert_eq!(xyz[[0, 1, 3, 0]], 4.0);
/// ```
pub fn get_3d_coords(
    depth: ArrayView4<f32>,
    intrinsics: &CameraIntrinsics,
) -> Result<Array4<f32>, MotionError> {
    let (num, height, width, channels) = depth.dim();
    if channels != 1 {
        return Err(MotionError::shape("depth", "[N, H, W, 1]", depth.shape()));
    }
    debug!(num, height, width, "back-projecting depth");

    let mut out = Array4::<f32>::zeros((num, height, width, 3));
    for ((n, y, x, _), d) in depth.indexed_iter() {
        let p = pixel_to_3d(x as f32, y as f32, *d, intrinsics);
        out[[n, y, x, 0]] = p.x;
        out[[n, y, x, 1]] = p.y;
        out[[n, y, x, 2]] = p.z;
    }
    Ok(out)
}
