//! `motion-geometry` – geometric losses for rigid-body motion estimation.
//!
//! Batched rotation composition, the object/camera motion losses used to
//! train a motion-predicting detector, and depth back-projection.  Batches
//! are `ndarray` arrays of `f32` whose first axis indexes independent
//! predictions; per-element 3×3 algebra is done with `nalgebra`.
//!
//! # Modules
//!
//! - [`rotation`] – [`euler_to_rot`][rotation::euler_to_rot]: composes
//!   `Rz · Rx · Ry` from Euler angles or their sines, with a numerical
//!   validity check on recovered cosines.
//! - [`loss`] – [`motion_loss`][loss::motion_loss] and
//!   [`camera_motion_loss`][loss::camera_motion_loss]: angular, translation
//!   and pivot errors between predicted and ground-truth motions.
//! - [`projection`] – [`get_3d_coords`][projection::get_3d_coords]:
//!   pinhole back-projection of a depth map into per-pixel `(X, Y, Z)`.
//! - [`numerics`] – finite-value checks shared by the modules above.

pub mod loss;
pub mod numerics;
pub mod projection;
pub mod rotation;

pub use loss::{
    MotionErrors, camera_motion_errors, camera_motion_loss, detection_motion_errors, motion_loss,
    motion_loss_breakdown, motion_losses, postprocess_camera_motion, postprocess_detection_motions,
};
pub use motion_types::{AngleEncoding, CameraIntrinsics, LossOptions, MotionError};
pub use projection::{get_3d_coords, pixel_to_3d};
pub use rotation::{euler_to_rot, euler_to_rot_columns};
