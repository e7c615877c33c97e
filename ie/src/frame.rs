//! Decoded screenshots and rectangular views into them.
//!
//! A screenshot is decoded once into an [`OwnedImage`]. Banner search works on
//! borrowed [`Image`] views, so dropping the status bar or cutting out the
//! banner copies nothing until the crop is re-encoded.

use anyhow::{Context, Result};
use image::{Pixel, RgbImage};

/// Decoded RGB frame. Alpha is discarded.
#[derive(Clone, Debug)]
pub struct OwnedImage {
    pixels: RgbImage,
}

impl OwnedImage {
    /// Decode PNG/JPEG/WebP bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        Ok(Self::from_rgb(image::load_from_memory(bytes)?.to_rgb8()))
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    /// Copy scaled to `height`, width following the aspect ratio.
    pub fn resized_h(&self, height: u32) -> Result<Self> {
        if self.height() == height {
            return Ok(self.clone());
        }
        let height = height.max(1);
        let width = ((self.width() as u64 * height as u64 / self.height().max(1) as u64) as u32).max(1);

        let src = fast_image_resize::images::ImageRef::new(
            self.width(),
            self.height(),
            self.pixels.as_raw(),
            fast_image_resize::PixelType::U8x3,
        )
        .context("wrap source pixels")?;
        let mut dst = fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let options = fast_image_resize::ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Interpolation(
            fast_image_resize::FilterType::CatmullRom,
        ));
        fast_image_resize::Resizer::new()
            .resize(&src, &mut dst, &options)
            .context("resize")?;

        let pixels = RgbImage::from_raw(width, height, dst.into_vec()).context("resized buffer has the wrong length")?;
        Ok(Self { pixels })
    }

    /// View of the whole frame.
    pub fn as_image(&self) -> Image<'_> {
        Image {
            pixels: &self.pixels,
            x: 0,
            y: 0,
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Rectangular window into an [`OwnedImage`].
#[derive(Clone, Copy)]
pub struct Image<'a> {
    pixels: &'a RgbImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> image::Rgb<u8> {
        *self.pixels.get_pixel(self.x + x, self.y + y)
    }

    pub fn to_gray_image(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| self.pixel(x, y).to_luma())
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| self.pixel(x, y))
    }

    pub fn encode(&self, format: image::ImageFormat) -> Result<Vec<u8>, image::ImageError> {
        let mut out = std::io::Cursor::new(Vec::new());
        self.to_rgb_image().write_to(&mut out, format)?;
        Ok(out.into_inner())
    }

    /// The bottom `height` rows (all of them if the view is shorter).
    pub fn trimmed_bottom(&self, height: u32) -> Self {
        let height = height.min(self.height);
        Self {
            y: self.y + self.height - height,
            height,
            ..*self
        }
    }

    /// Sub-rectangle in view coordinates, clamped to the view.
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width);
        let y = y.min(self.height);
        Self {
            pixels: self.pixels,
            x: self.x + x,
            y: self.y + y,
            width: width.min(self.width - x),
            height: height.min(self.height - y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 8×6 checkerboard, white where `x + y` is even.
    fn board() -> OwnedImage {
        OwnedImage::from_rgb(RgbImage::from_fn(8, 6, |x, y| {
            image::Rgb(if (x + y) % 2 == 0 { [255; 3] } else { [0; 3] })
        }))
    }

    #[test]
    fn views_share_pixels() {
        let img = board();
        let view = img.as_image().trimmed_bottom(4).sub_image(1, 1, 100, 2);
        assert_eq!((view.width(), view.height()), (7, 2));
        // View origin is (1, 3) in the frame.
        let gray = view.to_gray_image();
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn trimming_more_than_the_height_keeps_everything() {
        let img = board();
        let view = img.as_image().trimmed_bottom(100);
        assert_eq!((view.width(), view.height()), (8, 6));
    }

    #[test]
    fn encoded_crop_has_crop_size() {
        let png = board().as_image().sub_image(2, 1, 3, 4).encode(image::ImageFormat::Png).unwrap();
        let back = OwnedImage::decode(&png).unwrap();
        assert_eq!((back.width(), back.height()), (3, 4));
        assert_eq!(back.as_rgb().get_pixel(0, 0).0, [0; 3]);
    }

    #[test]
    fn resize_keeps_aspect() {
        let img = board().resized_h(12).unwrap();
        assert_eq!((img.width(), img.height()), (16, 12));
    }
}
