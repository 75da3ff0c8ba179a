use anyhow::Context;
use base64ct::{Base64, Encoding};
use bytes::Bytes;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ImageConfig;
use crate::error::DiaryError;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// A normalized photo, stored as a JPEG data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn from_jpeg(jpeg: &[u8]) -> Self {
        Self(format!("{}{}", DATA_URL_PREFIX, Base64::encode_string(jpeg)))
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }

    /// The raw JPEG bytes behind the data URL.
    #[cfg(test)]
    pub fn jpeg_bytes(&self) -> Result<Vec<u8>, DiaryError> {
        let b64 = self
            .0
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| DiaryError::InvalidInput("not a jpeg data url".into()))?;
        Base64::decode_vec(b64).map_err(|e| DiaryError::InvalidInput(e.to_string()))
    }
}

/// Decodes `raw`, scales it so the long edge fits `cfg.max_edge` and re-encodes
/// it as JPEG. Runs on the blocking pool so the caller just awaits it.
pub async fn normalize_image(raw: Bytes, cfg: &ImageConfig) -> Result<EncodedImage, DiaryError> {
    let cfg = cfg.clone();
    tokio::task::spawn_blocking(move || normalize_blocking(&raw, &cfg))
        .await
        .context("image worker panicked")?
}

pub fn normalize_blocking(raw: &[u8], cfg: &ImageConfig) -> Result<EncodedImage, DiaryError> {
    let img = image::load_from_memory(raw).map_err(|e| DiaryError::ImageDecode(e.to_string()))?;
    let (width, height) = img.dimensions();
    let (w, h) = fit_within(width, height, cfg.max_edge);

    let resized = if (w, h) == (width, height) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, cfg.quality))
        .context("encode jpeg")?;

    debug!(from = ?(width, height), to = ?(w, h), bytes = jpeg.len(), "photo normalized");
    Ok(EncodedImage::from_jpeg(&jpeg))
}

/// Long-edge scale-to-fit; never upscales and never returns a zero side.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let long = width.max(height);
    if long <= max_edge || long == 0 {
        return (width, height);
    }
    let scale = f64::from(max_edge) / f64::from(long);
    let w = (f64::from(width) * scale).round().max(1.0) as u32;
    let h = (f64::from(height) * scale).round().max(1.0) as u32;
    (w, h)
}

#[cfg(test)]
mod image_tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 10]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn decoded_dims(img: &EncodedImage) -> (u32, u32) {
        let bytes = img.jpeg_bytes().unwrap();
        image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)
            .unwrap()
            .dimensions()
    }

    #[test]
    fn fit_within_scales_long_edge() {
        assert_eq!(fit_within(1040, 780, 520), (520, 390));
        assert_eq!(fit_within(780, 1040, 520), (390, 520));
        assert_eq!(fit_within(300, 200, 520), (300, 200));
        assert_eq!(fit_within(5000, 3, 520), (520, 1));
    }

    #[tokio::test]
    async fn large_photo_is_bounded_and_jpeg_encoded() {
        let cfg = ImageConfig::default();
        let out = normalize_image(Bytes::from(png(1000, 500)), &cfg).await.unwrap();
        assert!(out.as_data_url().starts_with("data:image/jpeg;base64,"));
        assert_eq!(decoded_dims(&out), (520, 260));
    }

    #[tokio::test]
    async fn small_photo_is_not_upscaled() {
        let cfg = ImageConfig::default();
        let out = normalize_image(Bytes::from(png(64, 48)), &cfg).await.unwrap();
        assert_eq!(decoded_dims(&out), (64, 48));
    }

    #[test]
    fn transparent_png_is_flattened() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        let out = normalize_blocking(&buf, &ImageConfig::default()).unwrap();
        assert_eq!(decoded_dims(&out), (10, 10));
    }

    #[tokio::test]
    async fn garbage_bytes_fail_to_decode() {
        let err = normalize_image(Bytes::from_static(b"definitely not a photo"), &ImageConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DiaryError::ImageDecode(_)));
    }

    #[test]
    fn jpeg_bytes_rejects_foreign_data_url() {
        let img = EncodedImage("data:image/png;base64,AAAA".into());
        assert!(img.jpeg_bytes().is_err());
    }
}
