//! CIE L*a*b* conversion anchored on sRGB primaries and the D65 white.
//!
//! # Pipeline
//!
//! ```text
//! sRGB code  --eotf-->  linear RGB  --M-->  XYZ  --f(t)-->  L*a*b*  --> 8-bit Lab
//! ```
//!
//! # 8-bit encoding
//!
//! LAB images store `L*·255/100`, `a* + 128` and `b* + 128`, each rounded
//! and clamped to `[0, 255]`. Contrast equalization works on the L plane.
//!
//! Neutral colors map to `a = b = 128` exactly because the rows of the
//! RGB->XYZ matrix sum to the white point.

use crate::srgb;
use prepix_core::{ColorSpace, Error, Image, Result};

/// D65 reference white X (Y = 1).
pub const WHITE_X: f32 = 0.950456;
/// D65 reference white Z (Y = 1).
pub const WHITE_Z: f32 = 1.088754;

/// Linear sRGB (D65) to XYZ.
const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.412453, 0.357580, 0.180423],
    [0.212671, 0.715160, 0.072169],
    [0.019334, 0.119193, 0.950227],
];

/// XYZ to linear sRGB (D65).
const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.240479, -1.53715, -0.498535],
    [-0.969256, 1.875991, 0.041556],
    [0.055648, -0.204043, 1.057311],
];

/// Linear segment threshold on Y (and X/Xn, Z/Zn).
const T_BREAK: f32 = 0.008856;
/// L* slope of the linear segment.
const KAPPA: f32 = 903.3;
/// Slope of f(t) in the linear segment.
const F_SLOPE: f32 = 7.787;
/// Offset of f(t) in the linear segment.
const F_OFFSET: f32 = 16.0 / 116.0;
/// f(t) value at the break; inverse switches to the cube above it.
const F_BREAK: f32 = 0.206893;

#[inline]
fn mul3(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > T_BREAK {
        t.cbrt()
    } else {
        F_SLOPE * t + F_OFFSET
    }
}

#[inline]
fn lab_f_inv(f: f32) -> f32 {
    if f > F_BREAK {
        f * f * f
    } else {
        (f - F_OFFSET) / F_SLOPE
    }
}

/// Linear RGB [0, 1] to L* [0, 100], a*, b*.
#[inline]
pub fn linear_rgb_to_lab(rgb: [f32; 3]) -> [f32; 3] {
    let [x, y, z] = mul3(&RGB_TO_XYZ, rgb);
    let fx = lab_f(x / WHITE_X);
    let fy = lab_f(y);
    let fz = lab_f(z / WHITE_Z);
    let l = if y > T_BREAK {
        116.0 * fy - 16.0
    } else {
        KAPPA * y
    };
    [l, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// L*, a*, b* to linear RGB, unclamped.
#[inline]
pub fn lab_to_linear_rgb(lab: [f32; 3]) -> [f32; 3] {
    let [l, a, b] = lab;
    let (y, fy) = if l <= KAPPA * T_BREAK {
        let y = l / KAPPA;
        (y, F_SLOPE * y + F_OFFSET)
    } else {
        let fy = (l + 16.0) / 116.0;
        (fy * fy * fy, fy)
    };
    let x = WHITE_X * lab_f_inv(fy + a / 500.0);
    let z = WHITE_Z * lab_f_inv(fy - b / 200.0);
    mul3(&XYZ_TO_RGB, [x, y, z])
}

/// Packs L*a*b* into the 8-bit LAB encoding.
#[inline]
pub fn encode_lab8(lab: [f32; 3]) -> [u8; 3] {
    let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    [q(lab[0] * 255.0 / 100.0), q(lab[1] + 128.0), q(lab[2] + 128.0)]
}

/// Unpacks the 8-bit LAB encoding to L*a*b*.
#[inline]
pub fn decode_lab8(lab: [u8; 3]) -> [f32; 3] {
    [
        lab[0] as f32 * 100.0 / 255.0,
        lab[1] as f32 - 128.0,
        lab[2] as f32 - 128.0,
    ]
}

/// Converts an RGB-family image to 8-bit LAB. Alpha is dropped.
///
/// LAB input is returned as a cheap clone.
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] for GRAY input.
///
/// # Example
///
/// ```rust
/// use prepix_core::{ColorSpace, Image};
/// use prepix_color::to_lab;
///
/// let white = Image::filled(1, 1, ColorSpace::Rgb, &[255, 255, 255]).unwrap();
/// let lab = to_lab(&white).unwrap();
/// assert_eq!(lab.pixel(0, 0), &[255, 128, 128]);
/// ```
pub fn to_lab(image: &Image) -> Result<Image> {
    let space = image.color_space();
    if space == ColorSpace::Lab {
        return Ok(image.clone());
    }
    let (ri, bi) = space
        .red_blue_index()
        .ok_or_else(|| Error::unsupported(space.name(), "to_lab"))?;

    let decode = srgb::eotf_table();
    let mut data = Vec::with_capacity(image.pixel_count() * 3);
    for px in image.pixels() {
        let linear = [
            decode[px[ri] as usize],
            decode[px[1] as usize],
            decode[px[bi] as usize],
        ];
        data.extend_from_slice(&encode_lab8(linear_rgb_to_lab(linear)));
    }
    Image::from_data(image.width(), image.height(), ColorSpace::Lab, data)
}

/// Converts an 8-bit LAB image to the RGB-family tag `target`.
///
/// Out-of-gamut values are clipped; alpha is synthesized as 255.
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] if the input is not LAB or `target` is not
/// RGB-family.
pub fn from_lab(image: &Image, target: ColorSpace) -> Result<Image> {
    if image.color_space() != ColorSpace::Lab {
        return Err(Error::unsupported(image.color_space().name(), "from_lab"));
    }
    let (ri, bi) = target
        .red_blue_index()
        .ok_or_else(|| Error::unsupported(target.name(), "from_lab"))?;

    let n = target.channels();
    let encode = |v: f32| (srgb::oetf(v.clamp(0.0, 1.0)) * 255.0).round().clamp(0.0, 255.0) as u8;
    let mut data = vec![0u8; image.pixel_count() * n];
    for (px, out) in image.pixels().zip(data.chunks_exact_mut(n)) {
        let [r, g, b] = lab_to_linear_rgb(decode_lab8([px[0], px[1], px[2]]));
        out[ri] = encode(r);
        out[1] = encode(g);
        out[bi] = encode(b);
        if target.has_alpha() {
            out[3] = 255;
        }
    }
    Image::from_data(image.width(), image.height(), target, data)
}
