//! Channel order, alpha handling, split and merge.

use prepix_core::{ColorSpace, Error, Image, Plane, Result};

/// Re-packs an RGB-family image into another RGB-family tag.
///
/// Swaps red and blue when the orders differ, drops alpha when the target
/// has none, and synthesizes alpha 255 when the source has none.
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] if either tag is not RGB-family.
pub fn reorder(image: &Image, target: ColorSpace) -> Result<Image> {
    let space = image.color_space();
    if space == target {
        return Ok(image.clone());
    }
    let (src_r, src_b) = space
        .red_blue_index()
        .ok_or_else(|| Error::unsupported(space.name(), "reorder"))?;
    let (dst_r, dst_b) = target
        .red_blue_index()
        .ok_or_else(|| Error::unsupported(target.name(), "reorder"))?;

    let n = target.channels();
    let mut data = vec![0u8; image.pixel_count() * n];
    for (px, out) in image.pixels().zip(data.chunks_exact_mut(n)) {
        out[dst_r] = px[src_r];
        out[1] = px[1];
        out[dst_b] = px[src_b];
        if target.has_alpha() {
            out[3] = if space.has_alpha() { px[3] } else { 255 };
        }
    }
    Image::from_data(image.width(), image.height(), target, data)
}

/// Drops the alpha channel, keeping channel order.
///
/// 3-channel RGB-family images are returned as a cheap clone.
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] for GRAY and LAB input.
pub fn drop_alpha(image: &Image) -> Result<Image> {
    let space = image.color_space();
    if !space.is_rgb_family() {
        return Err(Error::unsupported(space.name(), "drop_alpha"));
    }
    reorder(image, space.without_alpha())
}

/// Splits an image into one [`Plane`] per channel.
pub fn split(image: &Image) -> Result<Vec<Plane>> {
    let n = image.channels();
    (0..n)
        .map(|c| {
            let data = image.pixels().map(|px| px[c]).collect();
            Plane::from_data(image.width(), image.height(), data)
        })
        .collect()
}

/// Extracts a single channel as a [`Plane`].
///
/// # Errors
///
/// [`Error::InvalidParameter`] if `channel` is out of range.
pub fn extract_channel(image: &Image, channel: usize) -> Result<Plane> {
    if channel >= image.channels() {
        return Err(Error::invalid_parameter(format!(
            "channel {} out of range for {}",
            channel,
            image.color_space()
        )));
    }
    let data = image.pixels().map(|px| px[channel]).collect();
    Plane::from_data(image.width(), image.height(), data)
}

/// Interleaves planes into an image tagged `space`.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] if the plane count does not match `space`
/// - [`Error::InvalidDimensions`] if the planes differ in size
pub fn merge(planes: &[Plane], space: ColorSpace) -> Result<Image> {
    let n = space.channels();
    if planes.len() != n {
        return Err(Error::invalid_parameter(format!(
            "{} expects {} planes, got {}",
            space,
            n,
            planes.len()
        )));
    }
    let (w, h) = planes[0].dimensions();
    if let Some(p) = planes.iter().find(|p| p.dimensions() != (w, h)) {
        return Err(Error::invalid_dimensions(
            p.width(),
            p.height(),
            format!("plane size differs from {}x{}", w, h),
        ));
    }

    let mut data = vec![0u8; w as usize * h as usize * n];
    for (c, plane) in planes.iter().enumerate() {
        for (out, &v) in data.chunks_exact_mut(n).zip(plane.data()) {
            out[c] = v;
        }
    }
    Image::from_data(w, h, space, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_swaps_red_blue() {
        let rgb = Image::filled(2, 1, ColorSpace::Rgb, &[1, 2, 3]).unwrap();
        let bgr = reorder(&rgb, ColorSpace::Bgr).unwrap();
        assert_eq!(bgr.pixel(1, 0), &[3, 2, 1]);

        let bgra = reorder(&rgb, ColorSpace::Bgra).unwrap();
        assert_eq!(bgra.pixel(0, 0), &[3, 2, 1, 255]);
    }

    #[test]
    fn test_reorder_keeps_alpha() {
        let rgba = Image::filled(1, 1, ColorSpace::Rgba, &[1, 2, 3, 9]).unwrap();
        let bgra = reorder(&rgba, ColorSpace::Bgra).unwrap();
        assert_eq!(bgra.pixel(0, 0), &[3, 2, 1, 9]);
    }

    #[test]
    fn test_reorder_rejects_non_rgb() {
        let gray = Image::filled(1, 1, ColorSpace::Gray, &[1]).unwrap();
        assert!(reorder(&gray, ColorSpace::Rgb).unwrap_err().is_unsupported_format());
    }

    #[test]
    fn test_drop_alpha() {
        let bgra = Image::filled(1, 1, ColorSpace::Bgra, &[1, 2, 3, 4]).unwrap();
        let bgr = drop_alpha(&bgra).unwrap();
        assert_eq!(bgr.color_space(), ColorSpace::Bgr);
        assert_eq!(bgr.pixel(0, 0), &[1, 2, 3]);

        let rgb = Image::filled(1, 1, ColorSpace::Rgb, &[7, 8, 9]).unwrap();
        assert_eq!(drop_alpha(&rgb).unwrap(), rgb);

        let gray = Image::filled(1, 1, ColorSpace::Gray, &[7]).unwrap();
        assert!(drop_alpha(&gray).unwrap_err().is_unsupported_format());
    }

    #[test]
    fn test_split_merge() {
        let img = Image::from_data(2, 1, ColorSpace::Lab, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let planes = split(&img).unwrap();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0].data(), &[1, 4]);
        assert_eq!(planes[2].data(), &[3, 6]);
        assert_eq!(extract_channel(&img, 1).unwrap().data(), &[2, 5]);
        assert!(extract_channel(&img, 3).is_err());

        let merged = merge(&planes, ColorSpace::Lab).unwrap();
        assert_eq!(merged, img);
    }

    #[test]
    fn test_merge_validation() {
        let a = Plane::filled(2, 2, 0).unwrap();
        let b = Plane::filled(3, 2, 0).unwrap();
        assert!(merge(&[a.clone()], ColorSpace::Rgb).unwrap_err().is_invalid_parameter());
        assert!(merge(&[a.clone(), a, b], ColorSpace::Rgb)
            .unwrap_err()
            .is_invalid_dimensions());
    }
}
