//! No-reference quality scoring: blur and compression blocking.
//!
//! # Metrics
//!
//! - **Sharpness**: population variance of the Laplacian response of the
//!   gray plane. Few edges means low variance means blur.
//! - **Blockiness**: mean absolute step across the 8-pixel block grid of the
//!   gray plane. Visible JPEG blocking concentrates steps on that grid.
//!
//! # Policies
//!
//! | Policy | Analysis size | Blur threshold | Blockiness | Verdict |
//! |--------|---------------|----------------|------------|---------|
//! | [`QualityPolicy::native`] | native | 50.0 | off | blur only |
//! | [`QualityPolicy::normalized`] | 300x300 | 20.0 | 10.0 | blur or blocky |
//!
//! Normalizing to a fixed size makes the sharpness score comparable across
//! input resolutions; thresholds tuned for one policy do not transfer to the
//! other.

use crate::filter::laplacian;
use crate::resize::{resize_plane, Filter};
use prepix_color::{from_lab, to_gray_plane};
use prepix_core::{ColorSpace, Error, Image, Plane, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Block grid stride of 8x8 DCT codecs.
pub const BLOCK_SIZE: usize = 8;

/// Scoring policy: analysis size, thresholds and verdict rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPolicy {
    /// Resize the gray plane to this size before scoring.
    pub analysis_size: Option<(u32, u32)>,
    /// Laplacian variance below this is blurred.
    pub blur_threshold: f64,
    /// Blockiness above this is blocky. `None` disables the metric.
    pub block_threshold: Option<f64>,
}

impl QualityPolicy {
    /// Native resolution, blur threshold 50, blur-only verdict.
    pub fn native() -> Self {
        Self {
            analysis_size: None,
            blur_threshold: 50.0,
            block_threshold: None,
        }
    }

    /// 300x300 analysis size, blur threshold 20, blockiness threshold 10.
    pub fn normalized() -> Self {
        Self {
            analysis_size: Some((300, 300)),
            blur_threshold: 20.0,
            block_threshold: Some(10.0),
        }
    }

    /// Overrides the blur threshold.
    pub fn with_blur_threshold(mut self, threshold: f64) -> Self {
        self.blur_threshold = threshold;
        self
    }

    /// Enables blockiness with the given threshold.
    pub fn with_block_threshold(mut self, threshold: f64) -> Self {
        self.block_threshold = Some(threshold);
        self
    }

    /// Disables blockiness; the verdict becomes blur-only.
    pub fn without_blockiness(mut self) -> Self {
        self.block_threshold = None;
        self
    }

    /// Sets the analysis size.
    pub fn with_analysis_size(mut self, width: u32, height: u32) -> Self {
        self.analysis_size = Some((width, height));
        self
    }

    /// Checks thresholds and analysis size.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] for a non-finite or non-positive threshold
    /// - [`Error::InvalidDimensions`] for a zero analysis size
    pub fn validate(&self) -> Result<()> {
        check_threshold("blur threshold", self.blur_threshold)?;
        if let Some(t) = self.block_threshold {
            check_threshold("block threshold", t)?;
        }
        if let Some((w, h)) = self.analysis_size {
            if w == 0 || h == 0 {
                return Err(Error::invalid_dimensions(w, h, "analysis size must be > 0"));
            }
        }
        Ok(())
    }
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self::native()
    }
}

fn check_threshold(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid_parameter(format!(
            "{} must be finite and > 0, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Scores and verdict of [`score_quality`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Laplacian variance (sharpness), `>= 0`.
    pub variance: f64,
    /// Mean block-grid step, when enabled by the policy.
    pub blockiness: Option<f64>,
    /// `variance < blur_threshold`.
    pub blurred: bool,
    /// `blockiness > block_threshold`; false when disabled.
    pub blocky: bool,
    /// Policy verdict: `blurred || blocky`.
    pub flagged: bool,
}

/// Scores an image for blur and, if the policy enables it, blocking.
///
/// Never mutates the input.
///
/// # Errors
///
/// See [`QualityPolicy::validate`].
///
/// # Example
///
/// ```rust
/// use prepix_core::{ColorSpace, Image};
/// use prepix_ops::{score_quality, QualityPolicy};
///
/// let flat = Image::filled(64, 64, ColorSpace::Rgb, &[90, 90, 90]).unwrap();
/// let report = score_quality(&flat, &QualityPolicy::native()).unwrap();
/// assert_eq!(report.variance, 0.0);
/// assert!(report.flagged);
/// ```
pub fn score_quality(image: &Image, policy: &QualityPolicy) -> Result<QualityReport> {
    trace!(
        width = image.width(),
        height = image.height(),
        space = %image.color_space(),
        ?policy,
        "score_quality"
    );
    policy.validate()?;

    let mut gray = if image.color_space() == ColorSpace::Lab {
        to_gray_plane(&from_lab(image, ColorSpace::Rgb)?)?
    } else {
        to_gray_plane(image)?
    };
    if let Some((w, h)) = policy.analysis_size {
        gray = resize_plane(&gray, w, h, Filter::Bilinear)?;
    }

    let variance = laplacian_variance(&gray);
    let blurred = variance < policy.blur_threshold;

    let (blockiness, blocky) = match policy.block_threshold {
        Some(threshold) => {
            let b = blockiness(&gray);
            (Some(b), b > threshold)
        }
        None => (None, false),
    };

    debug!(variance, ?blockiness, blurred, blocky, "quality scored");
    Ok(QualityReport {
        variance,
        blockiness,
        blurred,
        blocky,
        flagged: blurred || blocky,
    })
}

/// Population variance of the Laplacian response.
pub fn laplacian_variance(plane: &Plane) -> f64 {
    let response = laplacian(plane);
    let n = response.len() as f64;
    let mean = response.iter().sum::<f64>() / n;
    response.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Mean absolute step across the 8-pixel block grid.
///
/// Rows `y = 8, 16, ...` are compared with row `y - 1` and columns
/// `x = 8, 16, ...` with column `x - 1`. Planes too small to contain a
/// boundary score 0.
pub fn blockiness(plane: &Plane) -> f64 {
    let (w, h) = (plane.width() as usize, plane.height() as usize);
    let data = plane.data();
    let mut sum = 0u64;
    let mut samples = 0u64;

    for y in (BLOCK_SIZE..h).step_by(BLOCK_SIZE) {
        let above = &data[(y - 1) * w..y * w];
        let row = &data[y * w..(y + 1) * w];
        for (&a, &b) in row.iter().zip(above) {
            sum += a.abs_diff(b) as u64;
        }
        samples += w as u64;
    }

    for x in (BLOCK_SIZE..w).step_by(BLOCK_SIZE) {
        for y in 0..h {
            let i = y * w + x;
            sum += data[i].abs_diff(data[i - 1]) as u64;
        }
        samples += h as u64;
    }

    if samples == 0 {
        0.0
    } else {
        sum as f64 / samples as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn block_pattern(size: u32) -> Image {
        // Flat 8x8 blocks alternating 100/140
        let data = (0..size)
            .flat_map(|y| {
                (0..size).map(move |x| if ((x / 8) + (y / 8)) % 2 == 0 { 100 } else { 140 })
            })
            .collect();
        Image::from_data(size, size, ColorSpace::Gray, data).unwrap()
    }

    #[test]
    fn test_presets() {
        let n = QualityPolicy::native();
        assert_eq!(n.analysis_size, None);
        assert_eq!(n.blur_threshold, 50.0);
        assert_eq!(n.block_threshold, None);

        let z = QualityPolicy::normalized();
        assert_eq!(z.analysis_size, Some((300, 300)));
        assert_eq!(z.blur_threshold, 20.0);
        assert_eq!(z.block_threshold, Some(10.0));
    }

    #[test]
    fn test_flat_image_always_flagged() {
        let flat = Image::filled(50, 30, ColorSpace::Bgr, &[200, 10, 30]).unwrap();
        for threshold in [1e-9, 0.5, 50.0, 1e9] {
            let policy = QualityPolicy::native().with_blur_threshold(threshold);
            let report = score_quality(&flat, &policy).unwrap();
            assert_eq!(report.variance, 0.0);
            assert!(report.blurred);
            assert!(report.flagged);
        }
        let report = score_quality(&flat, &QualityPolicy::normalized()).unwrap();
        assert_eq!(report.variance, 0.0);
        assert_eq!(report.blockiness, Some(0.0));
        assert!(!report.blocky);
        assert!(report.flagged);
    }

    #[test]
    fn test_sharp_image_not_blurred() {
        // 1-pixel checkerboard: every Laplacian response is +-4*255
        let data = (0..32u32 * 32)
            .map(|i| if (i % 32 + i / 32) % 2 == 0 { 0 } else { 255 })
            .collect();
        let img = Image::from_data(32, 32, ColorSpace::Gray, data).unwrap();
        let report = score_quality(&img, &QualityPolicy::native()).unwrap();
        assert_relative_eq!(report.variance, (4.0 * 255.0f64).powi(2));
        assert!(!report.blurred);
        assert!(!report.flagged);
        assert_eq!(report.blockiness, None);
    }

    #[test]
    fn test_laplacian_variance_known_value() {
        // Single bright point in 3x3: responses from reflect-101 borders
        let mut data = vec![0u8; 9];
        data[4] = 10;
        let plane = Plane::from_data(3, 3, data).unwrap();
        // corners 0, edges 20, centre -40
        let values = [0.0, 20.0, 0.0, 20.0, -40.0, 20.0, 0.0, 20.0, 0.0];
        let mean = values.iter().sum::<f64>() / 9.0;
        let expected = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 9.0;
        assert_relative_eq!(laplacian_variance(&plane), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_blockiness_on_grid() {
        let img = block_pattern(32);
        let plane = to_gray_plane(&img).unwrap();
        // Every grid-line sample steps by 40
        assert_relative_eq!(blockiness(&plane), 40.0);

        let policy = QualityPolicy::native().with_block_threshold(10.0);
        let report = score_quality(&img, &policy).unwrap();
        assert!(report.blocky);
        assert!(report.flagged);
    }

    #[test]
    fn test_blockiness_small_plane_is_zero() {
        let plane = Plane::from_data(8, 8, (0..64).collect()).unwrap();
        assert_eq!(blockiness(&plane), 0.0);
    }

    #[test]
    fn test_blockiness_counts_rows_and_columns() {
        // 9x9: one row boundary (y=8) and one column boundary (x=8)
        let mut data = vec![0u8; 81];
        for x in 0..9 {
            data[8 * 9 + x] = 9;
        }
        let plane = Plane::from_data(9, 9, data).unwrap();
        // Row boundary: 9 steps of 9. Column boundary: 9 samples, no steps.
        assert_relative_eq!(blockiness(&plane), 81.0 / 18.0);
    }

    #[test]
    fn test_blur_only_policy_ignores_blocking() {
        let img = block_pattern(32);
        let policy = QualityPolicy::native().with_blur_threshold(1e-6);
        let report = score_quality(&img, &policy).unwrap();
        assert!(!report.blocky);
        assert!(!report.flagged);
    }

    #[test]
    fn test_policy_validation() {
        let img = Image::filled(8, 8, ColorSpace::Gray, &[1]).unwrap();
        for bad in [0.0, -3.0, f64::NAN] {
            let policy = QualityPolicy::native().with_blur_threshold(bad);
            assert!(score_quality(&img, &policy).unwrap_err().is_invalid_parameter());
            let policy = QualityPolicy::native().with_block_threshold(bad);
            assert!(score_quality(&img, &policy).unwrap_err().is_invalid_parameter());
        }
        let policy = QualityPolicy::native().with_analysis_size(0, 300);
        assert!(score_quality(&img, &policy).unwrap_err().is_invalid_dimensions());
        assert!(QualityPolicy::normalized().without_blockiness().validate().is_ok());
    }

    #[test]
    fn test_lab_input_scored() {
        let rgb = Image::filled(16, 16, ColorSpace::Rgb, &[128, 128, 128]).unwrap();
        let lab = prepix_color::to_lab(&rgb).unwrap();
        let report = score_quality(&lab, &QualityPolicy::native()).unwrap();
        assert_eq!(report.variance, 0.0);
    }
}
