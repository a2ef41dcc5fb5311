//! Named presets and YAML configuration.
//!
//! Two parameter sets exist for equalization and scoring. They are kept as
//! explicit presets rather than merged into one default:
//!
//! | Preset | CLAHE | Quality |
//! |--------|-------|---------|
//! | `standard` | clip 2.0, 8x8 | native resolution, blur < 50 |
//! | `smoothed` | clip 1.5, 16x16, Gaussian | 300x300, blur < 20 or blockiness > 10 |
//!
//! # YAML
//!
//! Missing fields fall back to the `standard` preset.
//!
//! ```yaml
//! clahe:
//!   clip_limit: 1.5
//!   tile_grid: [16, 16]
//!   smoothing: true
//! quality:
//!   analysis_size: [300, 300]
//!   blur_threshold: 20.0
//!   block_threshold: 10.0
//! letterbox: [416, 416]
//! ```

use crate::clahe::ClaheParams;
use crate::quality::QualityPolicy;
use prepix_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Named parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Clip 2.0 / 8x8 equalization, native-resolution blur-only scoring.
    #[default]
    Standard,
    /// Clip 1.5 / 16x16 smoothed equalization, 300x300 combined scoring.
    Smoothed,
}

impl Preset {
    /// Preset name as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Preset::Standard => "standard",
            Preset::Smoothed => "smoothed",
        }
    }

    /// Full configuration for this preset.
    pub fn config(self) -> PreprocessConfig {
        match self {
            Preset::Standard => PreprocessConfig {
                clahe: ClaheParams::standard(),
                quality: QualityPolicy::native(),
                letterbox: None,
            },
            Preset::Smoothed => PreprocessConfig {
                clahe: ClaheParams::smoothed(),
                quality: QualityPolicy::normalized(),
                letterbox: None,
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Preset::Standard),
            "smoothed" => Ok(Preset::Smoothed),
            other => Err(Error::Config(format!(
                "unknown preset '{}', expected 'standard' or 'smoothed'",
                other
            ))),
        }
    }
}

/// Parameters for every configurable operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Contrast equalization parameters.
    pub clahe: ClaheParams,
    /// Quality scoring policy.
    pub quality: QualityPolicy,
    /// Letterbox target (width, height), if the pipeline letterboxes.
    pub letterbox: Option<(u32, u32)>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Preset::Standard.config()
    }
}

impl PreprocessConfig {
    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] on malformed YAML, plus anything
    /// [`validate`](Self::validate) rejects.
    ///
    /// # Example
    ///
    /// ```rust
    /// use prepix_ops::PreprocessConfig;
    ///
    /// let cfg = PreprocessConfig::from_yaml_str("letterbox: [640, 640]").unwrap();
    /// assert_eq!(cfg.letterbox, Some((640, 640)));
    /// assert_eq!(cfg.clahe.clip_limit, 2.0);
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        debug!(?config, "preprocess config loaded");
        Ok(config)
    }

    /// Reads and parses a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Serializes to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Applies the parameter checks of every operation.
    ///
    /// # Errors
    ///
    /// Whatever [`ClaheParams::validate`] or [`QualityPolicy::validate`]
    /// reject, and [`Error::InvalidDimensions`] for a zero letterbox target.
    pub fn validate(&self) -> Result<()> {
        self.clahe.validate()?;
        self.quality.validate()?;
        if let Some((w, h)) = self.letterbox {
            if w == 0 || h == 0 {
                return Err(Error::invalid_dimensions(w, h, "letterbox target must be positive"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prepix_core::ColorSpace;

    #[test]
    fn test_preset_from_str() {
        assert_eq!("standard".parse::<Preset>().unwrap(), Preset::Standard);
        assert_eq!(" Smoothed ".parse::<Preset>().unwrap(), Preset::Smoothed);
        let err = "sharp".parse::<Preset>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(Preset::Smoothed.to_string(), "smoothed");
    }

    #[test]
    fn test_preset_configs() {
        let s = Preset::Standard.config();
        assert_eq!(s.clahe, ClaheParams::standard());
        assert_eq!(s.quality, QualityPolicy::native());
        assert_eq!(s, PreprocessConfig::default());

        let m = Preset::Smoothed.config();
        assert_eq!(m.clahe, ClaheParams::smoothed());
        assert_eq!(m.quality, QualityPolicy::normalized());
    }

    #[test]
    fn test_yaml_full() {
        let yaml = r#"
clahe:
  clip_limit: 1.5
  tile_grid: [16, 16]
  smoothing: true
  output: bgr
quality:
  analysis_size: [300, 300]
  blur_threshold: 20.0
  block_threshold: 10.0
letterbox: [416, 416]
"#;
        let cfg = PreprocessConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.clahe.clip_limit, 1.5);
        assert_eq!(cfg.clahe.tile_grid, (16, 16));
        assert!(cfg.clahe.smoothing);
        assert_eq!(cfg.clahe.output, Some(ColorSpace::Bgr));
        assert_eq!(cfg.quality, QualityPolicy::normalized());
        assert_eq!(cfg.letterbox, Some((416, 416)));
    }

    #[test]
    fn test_yaml_partial_uses_standard() {
        let cfg = PreprocessConfig::from_yaml_str("quality:\n  blur_threshold: 80.0\n").unwrap();
        assert_eq!(cfg.clahe, ClaheParams::standard());
        assert_eq!(cfg.quality.blur_threshold, 80.0);
        assert_eq!(cfg.quality.block_threshold, None);
        assert_eq!(cfg.letterbox, None);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let cfg = Preset::Smoothed.config();
        let yaml = cfg.to_yaml_string().unwrap();
        assert_eq!(PreprocessConfig::from_yaml_str(&yaml).unwrap(), cfg);
    }

    #[test]
    fn test_yaml_errors() {
        let err = PreprocessConfig::from_yaml_str("clahe: [1, 2").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = PreprocessConfig::from_yaml_str("clahe:\n  clip_limit: -1.0\n").unwrap_err();
        assert!(err.is_invalid_parameter());

        let err = PreprocessConfig::from_yaml_str("letterbox: [0, 416]").unwrap_err();
        assert!(err.is_invalid_dimensions());
    }
}
