// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decodes input images with the `image` crate and prepares
// them for embedding as opaque RGB page content.

use image::{DynamicImage, Rgb, RgbImage};
use pagewright_core::error::PagewrightError;
use tracing::{debug, instrument};

/// A single decoded in-memory image.
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (JPEG, PNG, GIF, BMP, WebP, TIFF).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PagewrightError> {
        let img = image::load_from_memory(data).map_err(|err| {
            PagewrightError::Image(format!("failed to decode image: {}", err))
        })?;
        if img.width() == 0 || img.height() == 0 {
            return Err(PagewrightError::Image("image has zero area".into()));
        }
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Conversion -----------------------------------------------------------

    /// Composite the image over a white background and return opaque RGB.
    ///
    /// PDF image XObjects here carry no soft mask, so transparent regions
    /// must be resolved before embedding or they come out black.
    pub fn into_opaque_rgb(self) -> RgbImage {
        if !self.image.color().has_alpha() {
            return self.image.to_rgb8();
        }

        let rgba = self.image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut out = RgbImage::new(width, height);
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = a as u16;
            let blend = |channel: u8| -> u8 {
                ((channel as u16 * alpha + 255 * (255 - alpha)) / 255) as u8
            };
            out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decodes_png_dimensions() {
        let bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::new(40, 10)));
        let processor = ImageProcessor::from_bytes(&bytes).unwrap();
        assert_eq!((processor.width(), processor.height()), (40, 10));
    }

    #[test]
    fn garbage_is_image_error() {
        let err = ImageProcessor::from_bytes(b"not an image").err().unwrap();
        assert!(matches!(err, PagewrightError::Image(_)));
    }

    #[test]
    fn transparent_pixels_become_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let rgb = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(rgba)).into_opaque_rgb();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [10, 20, 30]);
    }
}
