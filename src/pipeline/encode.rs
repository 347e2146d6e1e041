//! Image encoding for the vision engine: file → base64 PNG `ImageData`.
//!
//! Inputs may be PNG or JPEG of any size. Every image is decoded, capped to
//! `max_pixels` on its longest edge and re-encoded as PNG so the request body
//! stays bounded and the model always sees a lossless image.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::error::OcrError;

/// Decode an image file and downscale it if either edge exceeds `max_pixels`.
///
/// Blocking; call from `spawn_blocking`.
pub fn load_image(path: &Path, max_pixels: u32) -> Result<DynamicImage, OcrError> {
    let img = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => OcrError::Io {
            path: path.to_path_buf(),
            detail: io.to_string(),
        },
        other => OcrError::ImageDecode {
            path: path.to_path_buf(),
            detail: other.to_string(),
        },
    })?;

    if img.width() > max_pixels || img.height() > max_pixels {
        debug!(
            "Downscaling {} from {}x{} to fit {}px",
            path.display(),
            img.width(),
            img.height(),
            max_pixels
        );
        Ok(img.resize(max_pixels, max_pixels, FilterType::Lanczos3))
    } else {
        Ok(img)
    }
}

/// Encode an image as a base64 PNG ready for the vision API.
///
/// `detail: "high"` keeps fine print legible on tiling models.
pub fn encode_image(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let data = encode_image(&img).expect("encode should succeed");
        assert_eq!(data.mime_type, "image/png");
        let decoded = STANDARD.decode(&data.data).expect("valid base64");
        assert!(!decoded.is_empty());
    }

    #[test]
    fn large_images_are_downscaled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        RgbaImage::from_pixel(400, 100, Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let img = load_image(&path, 200).unwrap();
        assert_eq!(img.width(), 200);
        assert_eq!(img.height(), 50);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = load_image(&path, 2000).unwrap_err();
        assert!(matches!(err, OcrError::ImageDecode { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_image(&dir.path().join("nope.png"), 2000).unwrap_err();
        assert!(matches!(err, OcrError::Io { .. }));
    }
}
