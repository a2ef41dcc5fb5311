//! Planar float tensors for model input.
//!
//! Produces `[1, 3, H, W]` in R, G, B plane order. The image can be placed
//! in the top-left corner of a larger zero-filled canvas, which is how
//! detectors with a fixed input size are fed images that were resized with
//! their aspect ratio intact.

use crate::extract::extract_raw_buffer;
use prepix_core::{Error, Image, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Per-channel value mapping applied while packing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `v / 255`.
    #[default]
    UnitRange,
    /// `(v / 255 - mean[c]) / std[c]`.
    MeanStd {
        /// Per-channel mean in R, G, B order.
        mean: [f32; 3],
        /// Per-channel standard deviation in R, G, B order.
        std: [f32; 3],
    },
}

impl Normalization {
    /// ImageNet statistics.
    pub fn imagenet() -> Self {
        Normalization::MeanStd {
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }

    #[inline]
    fn apply(&self, channel: usize, v: u8) -> f32 {
        let unit = v as f32 / 255.0;
        match self {
            Normalization::UnitRange => unit,
            Normalization::MeanStd { mean, std } => (unit - mean[channel]) / std[channel],
        }
    }

    fn validate(&self) -> Result<()> {
        if let Normalization::MeanStd { mean, std } = self {
            if std.iter().any(|s| !s.is_finite() || *s <= 0.0) {
                return Err(Error::invalid_parameter(format!(
                    "std must be finite and > 0, got {:?}",
                    std
                )));
            }
            if mean.iter().any(|m| !m.is_finite()) {
                return Err(Error::invalid_parameter(format!(
                    "mean must be finite, got {:?}",
                    mean
                )));
            }
        }
        Ok(())
    }
}

/// Canvas and normalization for [`to_tensor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensorLayout {
    /// Zero-filled canvas size; `None` uses the image size.
    pub canvas: Option<(u32, u32)>,
    /// Value mapping.
    pub normalization: Normalization,
}

impl TensorLayout {
    /// Fixed `width x height` canvas with unit-range values.
    pub fn canvas(width: u32, height: u32) -> Self {
        Self {
            canvas: Some((width, height)),
            normalization: Normalization::UnitRange,
        }
    }

    /// Sets the normalization.
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }
}

/// NCHW float tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// (N, C, H, W).
    pub shape: [usize; 4],
    /// Planar samples, `N * C * H * W` long.
    pub data: Vec<f32>,
}

impl Tensor {
    /// Sample at (channel, y, x) of the first batch entry.
    ///
    /// # Panics
    ///
    /// Panics if `channel`, `y` or `x` is outside the tensor shape.
    pub fn get(&self, channel: usize, y: usize, x: usize) -> f32 {
        let [_, c, h, w] = self.shape;
        assert!(
            channel < c && y < h && x < w,
            "tensor index ({channel}, {y}, {x}) out of bounds for shape {:?}",
            self.shape
        );
        self.data[channel * h * w + y * w + x]
    }
}

/// Packs an image into a `[1, 3, H, W]` tensor.
///
/// Channels are R, G, B regardless of storage order; alpha is discarded.
/// Canvas area outside the image stays `0.0` under every normalization.
///
/// # Errors
///
/// - [`Error::InvalidDimensions`] if the image does not fit the canvas or
///   the canvas is empty
/// - [`Error::InvalidParameter`] for a non-positive std
///
/// # Example
///
/// ```rust
/// use prepix_core::{ColorSpace, Image};
/// use prepix_ops::tensor::{to_tensor, TensorLayout};
///
/// let img = Image::filled(2, 2, ColorSpace::Rgb, &[255, 0, 0]).unwrap();
/// let t = to_tensor(&img, &TensorLayout::canvas(4, 4)).unwrap();
/// assert_eq!(t.shape, [1, 3, 4, 4]);
/// assert_eq!(t.get(0, 1, 1), 1.0);
/// assert_eq!(t.get(0, 3, 3), 0.0);
/// ```
pub fn to_tensor(image: &Image, layout: &TensorLayout) -> Result<Tensor> {
    trace!(
        width = image.width(),
        height = image.height(),
        canvas = ?layout.canvas,
        "to_tensor"
    );
    layout.normalization.validate()?;

    let (cw, ch) = layout.canvas.unwrap_or(image.dimensions());
    if cw == 0 || ch == 0 {
        return Err(Error::invalid_dimensions(cw, ch, "canvas must be positive"));
    }
    if image.width() > cw || image.height() > ch {
        return Err(Error::invalid_dimensions(
            image.width(),
            image.height(),
            format!("image does not fit {}x{} canvas", cw, ch),
        ));
    }

    let rgba = extract_raw_buffer(image)?;
    let (cw, ch) = (cw as usize, ch as usize);
    let (iw, ih) = (rgba.width as usize, rgba.height as usize);
    let plane = cw * ch;
    let mut data = vec![0.0f32; 3 * plane];

    for y in 0..ih {
        for x in 0..iw {
            let px = &rgba.data[(y * iw + x) * 4..][..3];
            for (c, &v) in px.iter().enumerate() {
                data[c * plane + y * cw + x] = layout.normalization.apply(c, v);
            }
        }
    }

    Ok(Tensor {
        shape: [1, 3, ch, cw],
        data,
    })
}
