//! §4.E step 5 — image transcoding: downscale to the 2-megapixel cap
//! preserving aspect ratio, re-encode the full-size copy, and generate a
//! thumbnail no larger than 64px on its longest side.
//!
//! The dependency stack carries `image` with `png`/`jpeg` (plus `bmp`, used
//! only in this crate's tests to exercise cross-encoding dedup) enabled;
//! there is no HEIC encoder anywhere in it, so the "HEIC quality 0.3"
//! full-size re-encode is approximated with JPEG at an equivalent quality
//! setting (documented in DESIGN.md).

use std::io::Cursor;

use clipkeep_error::Error;
use fast_image_resize as fir;
use fast_image_resize::images::Image as FirImage;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};

const MAX_FULL_SIZE_PIXELS: u32 = 2_000_000;
const MAX_THUMBNAIL_SIDE: u32 = 64;
const FULL_SIZE_JPEG_QUALITY: u8 = 30; // spec's HEIC quality 0.3, mapped 0-1 -> 0-100 like the other two quality constants
const THUMBNAIL_JPEG_QUALITY: u8 = 60;

pub struct Transcoded {
    pub bytes: Vec<u8>,
    pub thumbnail_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decodes raw pasteboard image bytes with no resizing or recompression.
/// §4.E step 3 hashes this plain decode (pre-downscale, pre-compression) so
/// that the dedup check — and its short-circuit of the expensive work
/// [`transcode`] does — never depends on [`transcode`] having already run.
pub fn decode_image(source_bytes: &[u8]) -> Result<DynamicImage, Error> {
    image::load_from_memory(source_bytes).map_err(transcode_err)
}

/// §4.E step 5: downscale to the 2-megapixel cap, re-encode the full-size
/// copy, and generate a thumbnail. Callers should only invoke this once a
/// dedup check against the plain decode (see [`decode_image`]) has confirmed
/// the paste is new.
pub fn transcode(decoded: &DynamicImage) -> Result<Transcoded, Error> {
    let (src_width, src_height) = decoded.dimensions();

    let full = downscale_to_pixel_cap(decoded, src_width, src_height, MAX_FULL_SIZE_PIXELS)?;
    let (width, height) = full.dimensions();

    let mut bytes = Vec::new();
    full.to_rgba8()
        .write_with_encoder(jpeg_encoder(&mut bytes, FULL_SIZE_JPEG_QUALITY))
        .map_err(transcode_err)?;

    let thumb = downscale_to_longest_side(&full, MAX_THUMBNAIL_SIDE)?;
    let mut thumbnail_bytes = Vec::new();
    thumb
        .to_rgba8()
        .write_with_encoder(jpeg_encoder(&mut thumbnail_bytes, THUMBNAIL_JPEG_QUALITY))
        .map_err(transcode_err)?;

    Ok(Transcoded {
        bytes,
        thumbnail_bytes,
        width,
        height,
    })
}

fn transcode_err(e: impl std::fmt::Display) -> Error {
    Error::Transcode(e.to_string())
}

fn jpeg_encoder(buf: &mut Vec<u8>, quality: u8) -> image::codecs::jpeg::JpegEncoder<&mut Vec<u8>> {
    image::codecs::jpeg::JpegEncoder::new_with_quality(buf, quality)
}

fn downscale_to_pixel_cap(
    img: &DynamicImage,
    width: u32,
    height: u32,
    max_pixels: u32,
) -> Result<DynamicImage, Error> {
    let pixels = width.saturating_mul(height);
    if pixels <= max_pixels || pixels == 0 {
        return Ok(img.clone());
    }
    let scale = ((max_pixels as f64) / (pixels as f64)).sqrt();
    let dst_width = ((width as f64 * scale).round() as u32).max(1);
    let dst_height = ((height as f64 * scale).round() as u32).max(1);
    resize(img, width, height, dst_width, dst_height)
}

fn downscale_to_longest_side(img: &DynamicImage, max_side: u32) -> Result<DynamicImage, Error> {
    let (width, height) = img.dimensions();
    if width.max(height) <= max_side {
        return Ok(img.clone());
    }
    let scale = max_side as f64 / width.max(height) as f64;
    let dst_width = ((width as f64 * scale).round() as u32).max(1);
    let dst_height = ((height as f64 * scale).round() as u32).max(1);
    resize(img, width, height, dst_width, dst_height)
}

fn resize(
    img: &DynamicImage,
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
) -> Result<DynamicImage, Error> {
    let rgba = img.to_rgba8();
    let src_image = FirImage::from_vec_u8(src_width, src_height, rgba.into_raw(), fir::PixelType::U8x4)
        .map_err(transcode_err)?;

    let mut dst_image = FirImage::new(dst_width, dst_height, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let options =
        fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(transcode_err)?;

    let resized = RgbaImage::from_raw(dst_image.width(), dst_image.height(), dst_image.into_vec())
        .expect("resizer produces a buffer exactly matching its declared dimensions");
    Ok(DynamicImage::ImageRgba8(resized))
}

/// Crops to the given aspect ratio by trimming the longer dimension's
/// excess from its center, then resizes to `max_side` on the longest edge.
/// Grounded on §4.F's link preview image handling.
pub fn crop_to_aspect_and_resize(
    source_bytes: &[u8],
    target_aspect: f64,
    max_side: u32,
    quality: u8,
) -> Result<Vec<u8>, Error> {
    let decoded = image::load_from_memory(source_bytes).map_err(transcode_err)?;
    let (width, height) = decoded.dimensions();
    let current_aspect = width as f64 / height as f64;

    let cropped = if current_aspect > target_aspect {
        let new_width = (height as f64 * target_aspect).round() as u32;
        let x = (width - new_width) / 2;
        decoded.crop_imm(x, 0, new_width, height)
    } else if current_aspect < target_aspect {
        let new_height = (width as f64 / target_aspect).round() as u32;
        let y = (height - new_height) / 2;
        decoded.crop_imm(0, y, width, new_height)
    } else {
        decoded
    };

    let resized = downscale_to_longest_side(&cropped, max_side)?;
    let mut out = Vec::new();
    resized
        .to_rgba8()
        .write_with_encoder(jpeg_encoder(&mut out, quality))
        .map_err(transcode_err)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn transcode_downscales_above_the_pixel_cap() {
        let bytes = sample_png(2000, 1500); // 3,000,000 px > 2,000,000 cap
        let decoded = decode_image(&bytes).unwrap();
        let out = transcode(&decoded).unwrap();
        assert!(out.width * out.height <= MAX_FULL_SIZE_PIXELS);
    }

    #[test]
    fn transcode_leaves_small_images_at_full_size() {
        let bytes = sample_png(100, 80);
        let decoded = decode_image(&bytes).unwrap();
        let out = transcode(&decoded).unwrap();
        assert_eq!((out.width, out.height), (100, 80));
    }

    #[test]
    fn thumbnail_never_exceeds_64px_on_its_longest_side() {
        let bytes = sample_png(800, 200);
        let decoded = decode_image(&bytes).unwrap();
        let out = transcode(&decoded).unwrap();
        let thumb = image::load_from_memory(&out.thumbnail_bytes).unwrap();
        let (w, h) = thumb.dimensions();
        assert!(w.max(h) <= MAX_THUMBNAIL_SIDE);
    }

    #[test]
    fn crop_to_aspect_produces_the_requested_ratio() {
        let bytes = sample_png(600, 200);
        let out = crop_to_aspect_and_resize(&bytes, 3.0 / 2.0, 400, 70).unwrap();
        let cropped = image::load_from_memory(&out).unwrap();
        let (w, h) = cropped.dimensions();
        assert!((w as f64 / h as f64 - 1.5).abs() < 0.05);
    }
}
