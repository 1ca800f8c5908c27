//! [`MotionLossEvaluator`] – config-driven wrapper around the loss functions.
//!
//! Holds a [`LossConfig`], evaluates detection and camera batches with the
//! configured [`LossOptions`], and condenses the per-element errors into a
//! [`LossReport`] that a training loop can log or plot.
//!
//! # Example
//!
//! ```rust
//! use motion_runtime::evaluator::MotionLossEvaluator;
//! use motion_types::LossConfig;
//! use ndarray::Array2;
//!
//! let evaluator = MotionLossEvaluator::new(LossConfig::default());
//!
//! let pred = Array2::<f32>::zeros((4, 6));
//! let mut target = Array2::<f32>::zeros((4, 12));
//! for i in 0..4 {
//!     target[[i, 0]] = 1.0;
//!     target[[i, 4]] = 1.0;
//!     target[[i, 8]] = 1.0;
//! }
//! let report = evaluator.evaluate_camera(pred.view(), target.view()).unwrap();
//! assert_eq!(report.mean_total, 0.0);
//! ```

use motion_geometry::{MotionErrors, camera_motion_errors, get_3d_coords, motion_loss_breakdown};
use motion_types::{LossConfig, LossOptions, MotionError};
use ndarray::{Array1, Array4, ArrayView2, ArrayView3, ArrayView4};
use tracing::{info, instrument};

// ────────────────────────────────────────────────────────────────────────────
// LossReport
// ────────────────────────────────────────────────────────────────────────────

/// Summary of one evaluated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct LossReport {
    /// Per-element loss (weighted for detections).
    pub per_element: Array1<f32>,
    /// Mean rotation error in radians.
    pub mean_angle: f32,
    /// Mean translation error.
    pub mean_translation: f32,
    /// Mean pivot error (always 0 for camera motion).
    pub mean_pivot: f32,
    /// Mean of `per_element`.
    pub mean_total: f32,
}

impl LossReport {
    fn from_parts(errs: &MotionErrors, per_element: Array1<f32>) -> Self {
        Self {
            mean_angle: mean(&errs.angle),
            mean_translation: mean(&errs.translation),
            mean_pivot: mean(&errs.pivot),
            mean_total: mean(&per_element),
            per_element,
        }
    }
}

fn mean(values: &Array1<f32>) -> f32 {
    values.mean().unwrap_or(0.0)
}

// ────────────────────────────────────────────────────────────────────────────
// MotionLossEvaluator
// ────────────────────────────────────────────────────────────────────────────

/// Evaluates motion losses with a fixed [`LossConfig`].
#[derive(Debug, Clone, Default)]
pub struct MotionLossEvaluator {
    config: LossConfig,
}

impl MotionLossEvaluator {
    pub fn new(config: LossConfig) -> Self {
        Self { config }
    }

    /// Parse `raw` TOML (env overrides applied) and build an evaluator.
    pub fn from_toml_str(raw: &str) -> Result<Self, MotionError> {
        LossConfig::from_toml_str(raw).map(Self::new)
    }

    pub fn config(&self) -> &LossConfig {
        &self.config
    }

    pub fn options(&self) -> LossOptions {
        self.config.options()
    }

    /// Weighted detection loss over `(B, A, 9)` predictions.
    ///
    /// `per_element` holds the `B·A` weighted losses in row-major order; the
    /// component means are unweighted.
    #[instrument(skip_all, fields(batch = pred.dim().0, anchors = pred.dim().1))]
    pub fn evaluate_detections(
        &self,
        pred: ArrayView3<f32>,
        target: ArrayView3<f32>,
        weights: ArrayView2<f32>,
    ) -> Result<LossReport, MotionError> {
        let (errs, weighted) = motion_loss_breakdown(pred, target, weights, self.options())?;
        let per_element = weighted.into_iter().collect::<Array1<f32>>();
        let report = LossReport::from_parts(&errs, per_element);
        info!(
            mean_total = report.mean_total,
            mean_angle = report.mean_angle,
            mean_translation = report.mean_translation,
            mean_pivot = report.mean_pivot,
            "detection motion loss"
        );
        Ok(report)
    }

    /// Camera loss over `(B, 6)` predictions.
    #[instrument(skip_all, fields(batch = pred.nrows()))]
    pub fn evaluate_camera(
        &self,
        pred: ArrayView2<f32>,
        target: ArrayView2<f32>,
    ) -> Result<LossReport, MotionError> {
        let errs = camera_motion_errors(pred, target, self.options())?;
        let per_element = &errs.angle + &errs.translation;
        let report = LossReport::from_parts(&errs, per_element);
        info!(
            mean_total = report.mean_total,
            mean_angle = report.mean_angle,
            mean_translation = report.mean_translation,
            "camera motion loss"
        );
        Ok(report)
    }

    /// Back-project `depth` with the configured intrinsics.
    pub fn back_project(&self, depth: ArrayView4<f32>) -> Result<Array4<f32>, MotionError> {
        let intrinsics = self.config.intrinsics.as_ref().ok_or_else(|| {
            MotionError::InvalidConfig("no [intrinsics] configured for back-projection".to_string())
        })?;
        get_3d_coords(depth, intrinsics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motion_geometry::{camera_motion_loss, motion_loss};
    use motion_types::{AngleEncoding, CameraIntrinsics};
    use ndarray::{Array2, Array3, array};

    fn identity_targets(rows: usize, cols: usize) -> Array2<f32> {
        let mut t = Array2::<f32>::zeros((rows, cols));
        for i in 0..rows {
            t[[i, 0]] = 1.0;
            t[[i, 4]] = 1.0;
            t[[i, 8]] = 1.0;
        }
        t
    }

    #[test]
    fn detection_report_separates_components() {
        let pred = Array3::<f32>::zeros((1, 2, 9));
        let mut target = identity_targets(2, 15)
            .into_shape_with_order((1, 2, 15))
            .unwrap();
        target[[0, 0, 9]] = 2.0; // translation error 2 on anchor 0
        target[[0, 1, 14]] = 4.0; // pivot error 4 on anchor 1
        let weights = array![[1.0_f32, 0.5]];

        let report = MotionLossEvaluator::default()
            .evaluate_detections(pred.view(), target.view(), weights.view())
            .unwrap();

        assert_eq!(report.per_element.to_vec(), vec![2.0, 2.0]);
        assert_eq!(report.mean_angle, 0.0);
        assert!((report.mean_translation - 1.0).abs() < 1e-6);
        assert!((report.mean_pivot - 2.0).abs() < 1e-6);
        assert!((report.mean_total - 2.0).abs() < 1e-6);
    }

    #[test]
    fn camera_report_has_no_pivot_term() {
        let pred = array![[0.0_f32, 0.0, 0.0, 1.0, 0.0, 0.0]];
        let target = identity_targets(1, 12);
        let report = MotionLossEvaluator::default()
            .evaluate_camera(pred.view(), target.view())
            .unwrap();
        assert!((report.per_element[0] - 1.0).abs() < 1e-6);
        assert_eq!(report.mean_pivot, 0.0);
    }

    #[test]
    fn evaluator_uses_configured_encoding() {
        let cfg = LossConfig {
            angle_encoding: AngleEncoding::Radians,
            ..LossConfig::default()
        };
        let evaluator = MotionLossEvaluator::new(cfg);
        assert_eq!(evaluator.options().encoding, AngleEncoding::Radians);

        // A raw angle of 2.0 rad is not a valid sine but is a valid angle.
        let pred = array![[2.0_f32, 0.0, 0.0, 0.0, 0.0, 0.0]];
        let target = identity_targets(1, 12);
        let report = evaluator.evaluate_camera(pred.view(), target.view()).unwrap();
        assert!((report.mean_angle - 2.0).abs() < 1e-4);

        let sines = MotionLossEvaluator::default();
        assert!(matches!(
            sines.evaluate_camera(pred.view(), target.view()),
            Err(MotionError::NonFinite { .. })
        ));
    }

    #[test]
    fn reports_match_standalone_losses() {
        let pred = array![[
            [0.1_f32, -0.2, 0.3, 1.0, 0.5, -1.0, 0.2, 0.0, 0.1],
            [0.0, 0.4, -0.1, 0.0, 2.0, 0.0, -0.3, 0.3, 0.0]
        ]];
        let mut target = identity_targets(2, 15)
            .into_shape_with_order((1, 2, 15))
            .unwrap();
        target[[0, 0, 10]] = 1.5;
        target[[0, 1, 12]] = -0.5;
        let weights = array![[0.25_f32, 2.0]];
        let evaluator = MotionLossEvaluator::default();

        let report = evaluator
            .evaluate_detections(pred.view(), target.view(), weights.view())
            .unwrap();
        let expected =
            motion_loss(pred.view(), target.view(), weights.view(), evaluator.options()).unwrap();
        assert_eq!(
            report.per_element.to_vec(),
            expected.into_iter().collect::<Vec<_>>()
        );

        let cam_pred = pred.slice(ndarray::s![0, .., ..6]).to_owned();
        let cam_target = identity_targets(2, 12);
        let report = evaluator
            .evaluate_camera(cam_pred.view(), cam_target.view())
            .unwrap();
        let expected =
            camera_motion_loss(cam_pred.view(), cam_target.view(), evaluator.options()).unwrap();
        assert_eq!(report.per_element, expected);
        assert_eq!(report.mean_pivot, 0.0);
    }

    #[test]
    fn back_project_requires_intrinsics() {
        let depth = ndarray::Array4::<f32>::ones((1, 2, 2, 1));
        let err = MotionLossEvaluator::default().back_project(depth.view()).unwrap_err();
        assert!(matches!(err, MotionError::InvalidConfig(_)));

        let evaluator = MotionLossEvaluator::new(LossConfig {
            intrinsics: Some(CameraIntrinsics::new(1.0, 0.0, 0.0)),
            ..LossConfig::default()
        });
        let xyz = evaluator.back_project(depth.view()).unwrap();
        assert_eq!(xyz[[0, 1, 1, 0]], 1.0);
        assert_eq!(xyz[[0, 1, 1, 2]], 1.0);
    }

    #[test]
    fn empty_batch_reports_zero_means() {
        let pred = Array2::<f32>::zeros((0, 6));
        let target = Array2::<f32>::zeros((0, 12));
        let report = MotionLossEvaluator::default()
            .evaluate_camera(pred.view(), target.view())
            .unwrap();
        assert!(report.per_element.is_empty());
        assert_eq!(report.mean_total, 0.0);
    }
}
