//! §4.F preview-image handling: center-crop to a 3:2 aspect ratio, trimming
//! whichever dimension has excess, then resize to <=400px on the longest
//! side and re-encode as JPEG.

use clipkeep_error::Error;
use fast_image_resize as fir;
use fast_image_resize::images::Image as FirImage;
use image::{DynamicImage, GenericImageView, RgbaImage};

const TARGET_ASPECT: f64 = 3.0 / 2.0;
const MAX_SIDE: u32 = 400;
const JPEG_QUALITY: u8 = 70;

pub fn crop_and_resize(source_bytes: &[u8]) -> Result<Vec<u8>, Error> {
    let decoded = image::load_from_memory(source_bytes).map_err(err)?;
    let (width, height) = decoded.dimensions();
    let current_aspect = width as f64 / height as f64;

    let cropped = if current_aspect > TARGET_ASPECT {
        let new_width = (height as f64 * TARGET_ASPECT).round() as u32;
        let x = (width - new_width) / 2;
        decoded.crop_imm(x, 0, new_width, height)
    } else if current_aspect < TARGET_ASPECT {
        let new_height = (width as f64 / TARGET_ASPECT).round() as u32;
        let y = (height - new_height) / 2;
        decoded.crop_imm(0, y, width, new_height)
    } else {
        decoded
    };

    let resized = downscale_to_longest_side(&cropped, MAX_SIDE)?;
    let mut out = Vec::new();
    resized
        .to_rgba8()
        .write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
        .map_err(err)?;
    Ok(out)
}

fn downscale_to_longest_side(img: &DynamicImage, max_side: u32) -> Result<DynamicImage, Error> {
    let (width, height) = img.dimensions();
    if width.max(height) <= max_side {
        return Ok(img.clone());
    }
    let scale = max_side as f64 / width.max(height) as f64;
    let dst_width = ((width as f64 * scale).round() as u32).max(1);
    let dst_height = ((height as f64 * scale).round() as u32).max(1);

    let rgba = img.to_rgba8();
    let src_image = FirImage::from_vec_u8(width, height, rgba.into_raw(), fir::PixelType::U8x4)
        .map_err(err)?;
    let mut dst_image = FirImage::new(dst_width, dst_height, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let options =
        fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(err)?;

    let resized = RgbaImage::from_raw(dst_image.width(), dst_image.height(), dst_image.into_vec())
        .expect("resizer produces a buffer exactly matching its declared dimensions");
    Ok(DynamicImage::ImageRgba8(resized))
}

fn err(e: impl std::fmt::Display) -> Error {
    Error::Transcode(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use std::io::Cursor;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img).write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn crop_and_resize_yields_a_3_to_2_aspect_image() {
        let bytes = sample_png(1000, 1000);
        let out = crop_and_resize(&bytes).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        let (w, h) = decoded.dimensions();
        assert!((w as f64 / h as f64 - TARGET_ASPECT).abs() < 0.05);
    }

    #[test]
    fn output_never_exceeds_400px_on_its_longest_side() {
        let bytes = sample_png(2000, 1000);
        let out = crop_and_resize(&bytes).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        let (w, h) = decoded.dimensions();
        assert!(w.max(h) <= MAX_SIDE);
    }
}
