//! `motion-types` – shared vocabulary for the motion-loss crates.
//!
//! Holds the error type every fallible operation returns, the value types
//! describing how predicted rotations are encoded, the pinhole intrinsics used
//! for back-projection, and the [`config`] layer that turns TOML text into
//! [`LossOptions`].

pub mod config;

pub use config::LossConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the three rotation parameters of a predicted motion are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AngleEncoding {
    /// Raw Euler angles in radians.
    Radians,
    /// Sines of the Euler angles, each in `[-1, 1]`.  Cosines are recovered
    /// as `sqrt(1 - s²)`, which restricts the angles to ±90°.
    #[default]
    Sines,
}

impl std::fmt::Display for AngleEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AngleEncoding::Radians => write!(f, "radians"),
            AngleEncoding::Sines => write!(f, "sines"),
        }
    }
}

impl std::str::FromStr for AngleEncoding {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "radians" => Ok(AngleEncoding::Radians),
            "sines" => Ok(AngleEncoding::Sines),
            other => Err(MotionError::InvalidConfig(format!(
                "unknown angle encoding '{other}' (expected 'radians' or 'sines')"
            ))),
        }
    }
}

/// Runtime knobs shared by every loss function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LossOptions {
    /// Encoding of the predicted rotation parameters.
    pub encoding: AngleEncoding,
    /// Clamp predicted sines to `[-1, 1]` before recovering the cosines.
    /// Only meaningful with [`AngleEncoding::Sines`].
    pub clip_sines: bool,
}

impl LossOptions {
    pub fn new(encoding: AngleEncoding) -> Self {
        Self {
            encoding,
            clip_sines: false,
        }
    }

    pub fn with_clip_sines(mut self, clip: bool) -> Self {
        self.clip_sines = clip;
        self
    }
}

/// Pinhole camera intrinsics: focal length and principal point, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CameraIntrinsics {
    /// Focal length (same for both axes).
    pub f: f32,
    /// Principal point, x coordinate.
    pub x0: f32,
    /// Principal point, y coordinate.
    pub y0: f32,
}

impl CameraIntrinsics {
    pub fn new(f: f32, x0: f32, y0: f32) -> Self {
        Self { f, x0, y0 }
    }

    /// Build from a packed `[f, x0, y0]` slice.
    pub fn from_slice(values: &[f32]) -> Result<Self, MotionError> {
        match values {
            [f, x0, y0] => Ok(Self::new(*f, *x0, *y0)),
            _ => Err(MotionError::ShapeMismatch {
                operand: "camera_intrinsics".to_string(),
                expected: "[3]".to_string(),
                actual: vec![values.len()],
            }),
        }
    }
}

/// Error type shared by the rotation, loss and projection operations.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotionError {
    #[error("Shape Mismatch on {operand}: expected {expected}, got {actual:?}")]
    ShapeMismatch {
        operand: String,
        expected: String,
        actual: Vec<usize>,
    },

    #[error("Non-finite value in {tensor} at batch index {index}: {value}")]
    NonFinite {
        tensor: String,
        index: usize,
        #[serde(with = "float_text")]
        value: f32,
    },

    #[error("Invalid Config: {0}")]
    InvalidConfig(String),
}

/// Serializes an `f32` as its decimal text so that NaN and the infinities,
/// which JSON numbers cannot carry, survive a roundtrip.
mod float_text {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<f32>()
            .map_err(|e| D::Error::custom(format!("invalid float {raw:?}: {e}")))
    }
}

impl MotionError {
    pub fn shape(operand: &str, expected: impl Into<String>, actual: &[usize]) -> Self {
        MotionError::ShapeMismatch {
            operand: operand.to_string(),
            expected: expected.into(),
            actual: actual.to_vec(),
        }
    }
}
