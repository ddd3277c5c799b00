// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode uploaded images and JPEG-encode rendered pages
// for display. Operates on in-memory images using the `image` crate.

use image::DynamicImage;
use lesewerk_core::error::LesewerkError;
use tracing::{debug, instrument};

/// Codec wrapper around a single in-memory image.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&bytes)?.to_jpeg_bytes(80)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, LesewerkError> {
        let img = image::load_from_memory(data).map_err(|err| {
            LesewerkError::ImageError(format!("failed to decode image: {}", err))
        })?;
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

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, LesewerkError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            LesewerkError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn sample(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 200, 200])))
    }

    #[test]
    fn png_bytes_decode() {
        let mut png = Vec::new();
        sample(8, 4)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .expect("encode png");
        let decoded = ImageProcessor::from_bytes(&png).expect("decode png");
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[test]
    fn jpeg_bytes_are_jpeg() {
        let jpeg = ImageProcessor::from_dynamic(sample(16, 16))
            .to_jpeg_bytes(80)
            .expect("encode jpeg");
        assert_eq!(image::guess_format(&jpeg).ok(), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = ImageProcessor::from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(LesewerkError::ImageError(_))));
    }
}
