//! Image to RGB565 packing.
//!
//! Images whose size differs from the screen are stretched (aspect ratio is
//! not preserved) with nearest-neighbour sampling before packing. Channels
//! are reduced to their most significant bits, so 8-bit and 16-bit sources
//! pack identically.

use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use super::framebuffer::{rgb16_to_rgb565, Framebuffer};
use crate::Result;

/// Packs a decoded image into a `width` x `height` RGB565 framebuffer.
pub fn pack(image: &DynamicImage, width: u16, height: u16) -> Framebuffer {
    let (w, h) = (u32::from(width), u32::from(height));

    let scaled;
    let source = if image.width() != w || image.height() != h {
        debug!(
            "Stretching {}x{} image to {}x{}",
            image.width(),
            image.height(),
            w,
            h
        );
        scaled = image.resize_exact(w, h, FilterType::Nearest);
        &scaled
    } else {
        image
    };

    let rgb = source.to_rgb16();
    let mut fb = Framebuffer::new(width, height);
    for (dst, px) in fb.data_mut().iter_mut().zip(rgb.pixels()) {
        let [r, g, b] = px.0;
        *dst = rgb16_to_rgb565(r, g, b);
    }
    fb
}

/// Decodes the image file at `path` and packs it for a screen.
pub fn load<P: AsRef<Path>>(path: P, width: u16, height: u16) -> Result<Framebuffer> {
    let image = image::open(path.as_ref())?;
    debug!("Decoded {}", path.as_ref().display());
    Ok(pack(&image, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    fn uniform(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_red_image_any_size() {
        for (w, h) in [(1, 1), (7, 3), (64, 48)] {
            let fb = pack(&uniform(w, h, [255, 0, 0]), 16, 10);
            assert_eq!(fb.pixels(), 160);
            assert!(fb.data().iter().all(|&p| p == 0xF800));
        }
    }

    #[test]
    fn test_white_image() {
        let fb = pack(&uniform(20, 20, [255, 255, 255]), 20, 20);
        assert_eq!(fb.pixels(), 400);
        assert!(fb.data().iter().all(|&p| p == 0xFFFF));
    }

    #[test]
    fn test_sixteen_bit_source() {
        let img: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(3, 3, Rgb([0, 0xFFFF, 0x0800]));
        let fb = pack(&DynamicImage::ImageRgb16(img), 3, 3);
        assert!(fb.data().iter().all(|&p| p == 0x07E1));
    }

    #[test]
    fn test_row_major_order() {
        let mut img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([255, 0, 0]));
        img.put_pixel(0, 1, Rgb([0, 0, 255]));
        let fb = pack(&DynamicImage::ImageRgb8(img), 2, 2);
        assert_eq!(fb.data(), &[0x0000, 0xF800, 0x001F, 0x0000]);
    }

    #[test]
    fn test_stretch_is_not_aspect_preserving() {
        // Left half red, right half green, stretched 2x wide and 4x tall.
        let mut img = RgbImage::from_pixel(2, 1, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        let fb = pack(&DynamicImage::ImageRgb8(img), 4, 4);
        for y in 0..4 {
            assert_eq!(fb.get_pixel(0, y), Some(0xF800));
            assert_eq!(fb.get_pixel(3, y), Some(0x07E0));
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        uniform(5, 5, [255, 0, 0]).save(&path).unwrap();

        let fb = load(&path, 8, 2).unwrap();
        assert_eq!((fb.width(), fb.height()), (8, 2));
        assert!(fb.data().iter().all(|&p| p == 0xF800));
    }

    #[test]
    fn test_load_missing_file_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("nope.png"), 8, 2).unwrap_err();
        assert!(matches!(err, crate::Error::Image(_)));
    }
}
