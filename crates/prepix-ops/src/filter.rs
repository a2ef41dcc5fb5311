//! Plane convolution.
//!
//! # Kernels
//!
//! - [`Kernel::gaussian`] - Gaussian smoothing (post-equalization)
//! - [`Kernel::laplacian`] - 4-neighbour Laplacian (blur scoring)
//!
//! All filters read outside the plane through reflect-101 borders
//! (`dcb|abcd|cba`), so a constant plane filters to itself.
//!
//! # Example
//!
//! ```rust
//! use prepix_core::Plane;
//! use prepix_ops::filter::{convolve_plane, Kernel};
//!
//! let plane = Plane::filled(16, 16, 128).unwrap();
//! let response = convolve_plane(&plane, &Kernel::laplacian());
//! assert!(response.iter().all(|&v| v == 0.0));
//! ```

use prepix_core::{Error, Plane, Result};
use tracing::trace;

/// Convolution kernel for plane filtering.
#[derive(Debug, Clone)]
pub struct Kernel {
    /// Kernel weights, row-major.
    pub data: Vec<f64>,
    /// Kernel width (must be odd).
    pub width: usize,
    /// Kernel height (must be odd).
    pub height: usize,
}

impl Kernel {
    /// Creates a new kernel from data.
    ///
    /// Width and height must be odd numbers.
    pub fn new(data: Vec<f64>, width: usize, height: usize) -> Result<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(Error::invalid_parameter("kernel dimensions must be odd"));
        }
        if data.len() != width * height {
            return Err(Error::invalid_parameter(format!(
                "kernel data size {} doesn't match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { data, width, height })
    }

    /// Creates a normalized Gaussian kernel.
    ///
    /// # Arguments
    ///
    /// * `size` - Kernel size (will be made odd)
    /// * `sigma` - Standard deviation; `<= 0` derives it from `size`
    ///   (see [`sigma_for_size`])
    ///
    /// Without an explicit sigma, sizes up to 7 use the fixed binomial
    /// taps of [`SMALL_GAUSSIAN_TAPS`] instead of sampling `exp()`. The 2D
    /// kernel is the outer product of the 1D taps.
    ///
    /// # Example
    ///
    /// ```rust
    /// use prepix_ops::filter::Kernel;
    ///
    /// let k = Kernel::gaussian(3, 0.0);
    /// assert_eq!(k.width, 3);
    /// assert_eq!(k.data[4], 0.25);
    /// assert_eq!(k.data[0], 0.0625);
    /// ```
    pub fn gaussian(size: usize, sigma: f64) -> Self {
        let size = if size % 2 == 0 { size + 1 } else { size };
        let taps = gaussian_taps(size, sigma);

        let mut data = Vec::with_capacity(size * size);
        for &wy in &taps {
            for &wx in &taps {
                data.push(wx * wy);
            }
        }

        Self { data, width: size, height: size }
    }

    /// 4-neighbour Laplacian `[0 1 0; 1 -4 1; 0 1 0]`.
    #[rustfmt::skip]
    pub fn laplacian() -> Self {
        Self {
            data: vec![
                0.0, 1.0, 0.0,
                1.0, -4.0, 1.0,
                0.0, 1.0, 0.0,
            ],
            width: 3,
            height: 3,
        }
    }

    /// Returns the kernel radius (half-size).
    #[inline]
    pub fn radius(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }
}

/// Fixed 1D Gaussian taps for sizes 1, 3, 5 and 7 when no sigma is given.
pub const SMALL_GAUSSIAN_TAPS: [&[f64]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Normalized 1D Gaussian of odd `size`.
fn gaussian_taps(size: usize, sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 && size <= 7 {
        return SMALL_GAUSSIAN_TAPS[size / 2].to_vec();
    }
    let sigma = if sigma > 0.0 { sigma } else { sigma_for_size(size) };
    let half = (size / 2) as i64;
    let sigma2 = 2.0 * sigma * sigma;
    let mut taps: Vec<f64> = (-half..=half)
        .map(|x| (-((x * x) as f64) / sigma2).exp())
        .collect();
    let sum: f64 = taps.iter().sum();
    for w in &mut taps {
        *w /= sum;
    }
    taps
}

/// Sigma for a Gaussian of odd size `k` when none is given:
/// `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
#[inline]
pub fn sigma_for_size(size: usize) -> f64 {
    0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Convolves a plane with `kernel`, returning unrounded f64 responses.
pub fn convolve_plane(plane: &Plane, kernel: &Kernel) -> Vec<f64> {
    let (width, height) = plane.dimensions();
    trace!(
        width,
        height,
        kernel_w = kernel.width,
        kernel_h = kernel.height,
        "convolve_plane"
    );

    let (rx, ry) = kernel.radius();
    let (rx, ry) = (rx as i64, ry as i64);
    let mut dst = Vec::with_capacity(width as usize * height as usize);

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let mut sum = 0.0f64;
            for ky in 0..kernel.height as i64 {
                for kx in 0..kernel.width as i64 {
                    let kw = kernel.data[(ky * kernel.width as i64 + kx) as usize];
                    if kw == 0.0 {
                        continue;
                    }
                    let v = plane.get_reflect101(x + kx - rx, y + ky - ry);
                    sum += v as f64 * kw;
                }
            }
            dst.push(sum);
        }
    }

    dst
}

/// Gaussian-smooths a plane with a `size` x `size` kernel, rounding back to u8.
///
/// # Errors
///
/// [`Error::InvalidParameter`] if `size` is zero.
pub fn gaussian_blur_plane(plane: &Plane, size: usize, sigma: f64) -> Result<Plane> {
    if size == 0 {
        return Err(Error::invalid_parameter("gaussian size must be > 0"));
    }
    let kernel = Kernel::gaussian(size, sigma);
    let data = convolve_plane(plane, &kernel)
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    Plane::from_data(plane.width(), plane.height(), data)
}

/// Laplacian response of every sample.
pub fn laplacian(plane: &Plane) -> Vec<f64> {
    convolve_plane(plane, &Kernel::laplacian())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_kernel_gaussian_normalized() {
        let k = Kernel::gaussian(5, 1.5);
        assert_eq!(k.width, 5);
        let sum: f64 = k.data.iter().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
        assert!(k.data[12] > k.data[0]);
    }

    #[test]
    fn test_gaussian_small_table() {
        let k = Kernel::gaussian(3, 0.0);
        let expected = [0.0625, 0.125, 0.0625, 0.125, 0.25, 0.125, 0.0625, 0.125, 0.0625];
        assert_eq!(k.data, expected);

        let k = Kernel::gaussian(7, -1.0);
        assert_eq!(k.data[24], 0.28125 * 0.28125);
        let sum: f64 = k.data.iter().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);

        // An explicit sigma samples the curve
        let k = Kernel::gaussian(3, 0.8);
        assert!((k.data[4] - 0.25).abs() > 0.01);
    }

    #[test]
    fn test_sigma_for_size() {
        assert_abs_diff_eq!(sigma_for_size(3), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(sigma_for_size(5), 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_kernel_new_validation() {
        assert!(Kernel::new(vec![0.0; 4], 2, 2).is_err());
        assert!(Kernel::new(vec![0.0; 8], 3, 3).is_err());
        assert!(Kernel::new(vec![1.0], 1, 1).is_ok());
    }

    #[test]
    fn test_gaussian_keeps_flat_plane() {
        let plane = Plane::filled(9, 7, 131).unwrap();
        let out = gaussian_blur_plane(&plane, 3, 0.0).unwrap();
        assert_eq!(out, plane);
    }

    #[test]
    fn test_gaussian_smooths_spike() {
        let mut data = vec![0u8; 25];
        data[12] = 255;
        let plane = Plane::from_data(5, 5, data).unwrap();
        let out = gaussian_blur_plane(&plane, 3, 0.8).unwrap();
        assert!(out.get(2, 2) < 255);
        assert!(out.get(1, 2) > 0);
        assert_eq!(out.get(0, 0), 0);
    }

    #[test]
    fn test_laplacian_reflect_border() {
        // Ramp 0, 10, 20: reflect-101 mirrors 10 around each edge
        let plane = Plane::from_data(3, 1, vec![0, 10, 20]).unwrap();
        let r = laplacian(&plane);
        // x=0: left=10, right=10, up/down reflect to self in a 1-row plane
        assert_abs_diff_eq!(r[0], 20.0);
        assert_abs_diff_eq!(r[1], 0.0);
        assert_abs_diff_eq!(r[2], -20.0);
    }

    #[test]
    fn test_laplacian_point() {
        let mut data = vec![0u8; 9];
        data[4] = 10;
        let plane = Plane::from_data(3, 3, data).unwrap();
        let r = laplacian(&plane);
        assert_abs_diff_eq!(r[4], -40.0);
        // Top edge mirrors row 1, so the spike is seen twice
        assert_abs_diff_eq!(r[1], 20.0);
        assert_abs_diff_eq!(r[0], 0.0);
    }
}
