//! Color space tags.
//!
//! Every [`Image`](crate::Image) carries a [`ColorSpace`] tag that fixes its
//! channel count and channel order. Operations declare which tags they accept
//! and which tag they produce; `prepix-color` performs the conversions.
//!
//! | Tag | Channels | Order |
//! |-----|----------|-------|
//! | [`Rgb`](ColorSpace::Rgb) | 3 | R G B |
//! | [`Rgba`](ColorSpace::Rgba) | 4 | R G B A |
//! | [`Bgr`](ColorSpace::Bgr) | 3 | B G R |
//! | [`Bgra`](ColorSpace::Bgra) | 4 | B G R A |
//! | [`Gray`](ColorSpace::Gray) | 1 | Y |
//! | [`Lab`](ColorSpace::Lab) | 3 | L a b (8-bit encoded) |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel model and order of an 8-bit image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Blue, green, red.
    Bgr,
    /// Blue, green, red, alpha.
    Bgra,
    /// Single luma channel.
    Gray,
    /// CIE L*a*b* scaled to 8 bits: `L*·255/100`, `a*+128`, `b*+128`.
    Lab,
}

impl ColorSpace {
    /// Number of interleaved channels per pixel.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            ColorSpace::Gray => 1,
            ColorSpace::Rgb | ColorSpace::Bgr | ColorSpace::Lab => 3,
            ColorSpace::Rgba | ColorSpace::Bgra => 4,
        }
    }

    /// Returns `true` if the last channel is alpha.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, ColorSpace::Rgba | ColorSpace::Bgra)
    }

    /// Returns `true` for the RGB family (any order, with or without alpha).
    #[inline]
    pub const fn is_rgb_family(self) -> bool {
        matches!(
            self,
            ColorSpace::Rgb | ColorSpace::Rgba | ColorSpace::Bgr | ColorSpace::Bgra
        )
    }

    /// Returns `true` if blue is stored before red.
    #[inline]
    pub const fn is_bgr_order(self) -> bool {
        matches!(self, ColorSpace::Bgr | ColorSpace::Bgra)
    }

    /// Index of the red and blue channels within a pixel, RGB family only.
    #[inline]
    pub const fn red_blue_index(self) -> Option<(usize, usize)> {
        match self {
            ColorSpace::Rgb | ColorSpace::Rgba => Some((0, 2)),
            ColorSpace::Bgr | ColorSpace::Bgra => Some((2, 0)),
            ColorSpace::Gray | ColorSpace::Lab => None,
        }
    }

    /// The same channel order without alpha.
    ///
    /// `Rgba -> Rgb`, `Bgra -> Bgr`; other tags are returned unchanged.
    #[inline]
    pub const fn without_alpha(self) -> Self {
        match self {
            ColorSpace::Rgba => ColorSpace::Rgb,
            ColorSpace::Bgra => ColorSpace::Bgr,
            other => other,
        }
    }

    /// The same channel order with alpha.
    ///
    /// `Rgb -> Rgba`, `Bgr -> Bgra`; other tags are returned unchanged.
    #[inline]
    pub const fn with_alpha(self) -> Self {
        match self {
            ColorSpace::Rgb => ColorSpace::Rgba,
            ColorSpace::Bgr => ColorSpace::Bgra,
            other => other,
        }
    }

    /// Upper-case name used in logs and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ColorSpace::Rgb => "RGB",
            ColorSpace::Rgba => "RGBA",
            ColorSpace::Bgr => "BGR",
            ColorSpace::Bgra => "BGRA",
            ColorSpace::Gray => "GRAY",
            ColorSpace::Lab => "LAB",
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_counts() {
        assert_eq!(ColorSpace::Gray.channels(), 1);
        assert_eq!(ColorSpace::Rgb.channels(), 3);
        assert_eq!(ColorSpace::Lab.channels(), 3);
        assert_eq!(ColorSpace::Bgra.channels(), 4);
    }

    #[test]
    fn test_alpha_toggles() {
        assert_eq!(ColorSpace::Rgba.without_alpha(), ColorSpace::Rgb);
        assert_eq!(ColorSpace::Bgr.with_alpha(), ColorSpace::Bgra);
        assert_eq!(ColorSpace::Gray.with_alpha(), ColorSpace::Gray);
        assert!(ColorSpace::Bgra.has_alpha());
        assert!(!ColorSpace::Lab.has_alpha());
    }

    #[test]
    fn test_red_blue_index() {
        assert_eq!(ColorSpace::Rgba.red_blue_index(), Some((0, 2)));
        assert_eq!(ColorSpace::Bgr.red_blue_index(), Some((2, 0)));
        assert_eq!(ColorSpace::Lab.red_blue_index(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColorSpace::Lab.to_string(), "LAB");
        assert_eq!(format!("{}", ColorSpace::Bgra), "BGRA");
    }
}
