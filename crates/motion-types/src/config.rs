//! Loss configuration parsed from TOML text.
//!
//! Callers own the I/O: read the file however they like and hand the text to
//! [`LossConfig::from_toml_str`].  `MOTION_*` environment variables are
//! applied on top by [`apply_env_overrides`].
//!
//! ```rust
//! use motion_types::{AngleEncoding, LossConfig};
//!
//! let cfg = LossConfig::from_toml_str(r#"
//!     angle_encoding = "radians"
//!
//!     [intrinsics]
//!     f = 721.5
//!     x0 = 609.5
//!     y0 = 172.8
//! "#).unwrap();
//! assert_eq!(cfg.angle_encoding, AngleEncoding::Radians);
//! assert!(!cfg.clip_sines);
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{AngleEncoding, CameraIntrinsics, LossOptions, MotionError};

/// User-facing loss configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LossConfig {
    /// Encoding of the predicted rotation parameters.
    #[serde(default)]
    pub angle_encoding: AngleEncoding,

    /// Clamp predicted sines into `[-1, 1]` before cosine recovery.
    #[serde(default)]
    pub clip_sines: bool,

    /// Intrinsics used by depth back-projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intrinsics: Option<CameraIntrinsics>,
}

impl LossConfig {
    /// Parse a config from TOML text, then apply env overrides.
    pub fn from_toml_str(raw: &str) -> Result<Self, MotionError> {
        let mut cfg: LossConfig = toml::from_str(raw)
            .map_err(|e| MotionError::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        apply_env_overrides(&mut cfg);
        Ok(cfg)
    }

    /// Render the config back to TOML.
    pub fn to_toml_string(&self) -> Result<String, MotionError> {
        toml::to_string_pretty(self)
            .map_err(|e| MotionError::InvalidConfig(format!("Failed to serialize config: {}", e)))
    }

    /// JSON Schema describing the accepted config keys.
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LossConfig)
    }

    pub fn options(&self) -> LossOptions {
        LossOptions::new(self.angle_encoding).with_clip_sines(self.clip_sines)
    }
}

/// Apply `MOTION_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `MOTION_ANGLE_ENCODING` | `angle_encoding` (`radians` / `sines`) |
/// | `MOTION_CLIP_SINES` | `clip_sines` (`true` / `false`) |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(cfg: &mut LossConfig) {
    if let Ok(v) = std::env::var("MOTION_ANGLE_ENCODING")
        && let Ok(encoding) = v.parse::<AngleEncoding>()
    {
        cfg.angle_encoding = encoding;
    }
    if let Ok(v) = std::env::var("MOTION_CLIP_SINES")
        && let Ok(clip) = v.trim().parse::<bool>()
    {
        cfg.clip_sines = clip;
    }
}
