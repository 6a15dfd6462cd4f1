//! Canonicalization: decode → RGB → contrast boost → bound size → PNG.
//!
//! Every outbound request in a run carries the same canonical bytes, so this
//! stage must be deterministic: identical input bytes always yield identical
//! PNG output (and therefore an identical content hash).

use std::io::Cursor;
use std::time::Duration;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage};
use tokio::time::timeout;

use crate::config::{CanonicalizeConfig, LimitsConfig};
use crate::error::{AnalysisError, RunResult};

use super::source::ImageSource;
use super::validate::Validator;

/// A drawing in its canonical, transmission-ready form.
#[derive(Debug, Clone)]
pub struct CanonicalImage {
    /// Losslessly encoded PNG bytes
    pub bytes: Vec<u8>,
    /// Canonical width in pixels
    pub width: u32,
    /// Canonical height in pixels
    pub height: u32,
    /// Width before any downscaling
    pub original_width: u32,
    /// Height before any downscaling
    pub original_height: u32,
    /// BLAKE3 hex digest of `bytes`
    pub content_hash: String,
}

impl CanonicalImage {
    /// Whether the image was downscaled to fit the dimension bound.
    pub fn was_resized(&self) -> bool {
        self.width != self.original_width || self.height != self.original_height
    }
}

/// Normalizes arbitrary input images into [`CanonicalImage`]s.
#[derive(Debug, Clone)]
pub struct ImageCanonicalizer {
    config: CanonicalizeConfig,
    limits: LimitsConfig,
    validator: Validator,
}

impl ImageCanonicalizer {
    pub fn new(config: CanonicalizeConfig, limits: LimitsConfig) -> Self {
        Self {
            validator: Validator::new(limits.clone()),
            config,
            limits,
        }
    }

    /// Validate, load and canonicalize a source.
    ///
    /// Decoding and resampling run on the blocking pool under
    /// `limits.decode_timeout_ms`.
    pub async fn canonicalize(&self, source: &ImageSource) -> RunResult<CanonicalImage> {
        let bytes = source.load(&self.validator).await?;
        let name = source.name();
        let config = self.config.clone();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let task_name = name.clone();
        let result = timeout(
            timeout_duration,
            tokio::task::spawn_blocking(move || canonicalize_bytes(&config, &bytes, &task_name)),
        )
        .await;

        match result {
            Ok(Ok(canonical)) => canonical,
            Ok(Err(e)) => Err(AnalysisError::Decode {
                source_name: name,
                message: format!("Task join error: {e}"),
            }),
            Err(_) => Err(AnalysisError::Timeout {
                source_name: name,
                stage: "canonicalize".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }
}

/// Synchronous canonicalization of an encoded image.
pub fn canonicalize_bytes(
    config: &CanonicalizeConfig,
    bytes: &[u8],
    name: &str,
) -> RunResult<CanonicalImage> {
    let decode_err = |message: String| AnalysisError::Decode {
        source_name: name.to_string(),
        message,
    };

    let decoded = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_err(format!("Cannot detect image format: {e}")))?
        .decode()
        .map_err(|e| decode_err(e.to_string()))?;

    let (original_width, original_height) = decoded.dimensions();
    let mut rgb = decoded.into_rgb8();
    enhance_contrast(&mut rgb, config.contrast_factor);

    let (width, height) = bounded_dimensions(original_width, original_height, config.max_dimension);
    if (width, height) != (original_width, original_height) {
        tracing::debug!(
            "Downscaling {name} from {original_width}x{original_height} to {width}x{height}"
        );
        rgb = image::imageops::resize(&rgb, width, height, FilterType::Lanczos3);
    }

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| decode_err(format!("PNG encode failed: {e}")))?;
    let bytes = buffer.into_inner();
    let content_hash = blake3::hash(&bytes).to_hex().to_string();

    Ok(CanonicalImage {
        bytes,
        width,
        height,
        original_width,
        original_height,
        content_hash,
    })
}

/// Scale contrast around the mean luminance, in place.
///
/// Each channel becomes `mean + factor * (value - mean)`, clamped to `0..=255`.
/// Luminance uses the ITU-R 601 weights.
pub fn enhance_contrast(image: &mut RgbImage, factor: f32) {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return;
    }

    let luma_sum: u64 = image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (u64::from(r) * 299 + u64::from(g) * 587 + u64::from(b) * 114 + 500) / 1000
        })
        .sum();
    let mean = (luma_sum as f64 / pixel_count as f64).round() as f32;

    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        let scaled = mean + factor * (value as f32 - mean);
        *slot = scaled.round().clamp(0.0, 255.0) as u8;
    }

    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = lut[*channel as usize];
        }
    }
}

/// Dimensions after bounding the longer side to `max_dim`.
///
/// Within bounds, returns the input unchanged. Otherwise the longer side
/// becomes exactly `max_dim` and the shorter side is scaled by the same ratio
/// (rounded down, never below 1).
pub fn bounded_dimensions(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_dim {
        return (width, height);
    }

    let scale = |side: u32| -> u32 {
        if side == longer {
            max_dim
        } else {
            ((u64::from(side) * u64::from(max_dim)) / u64::from(longer)).max(1) as u32
        }
    };
    (scale(width), scale(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn png_bytes(image: RgbImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_bounded_dimensions_within_limit() {
        assert_eq!(bounded_dimensions(4096, 2000, 4096), (4096, 2000));
        assert_eq!(bounded_dimensions(800, 600, 4096), (800, 600));
    }

    #[test]
    fn test_bounded_dimensions_landscape_and_portrait() {
        assert_eq!(bounded_dimensions(6000, 4000, 4096), (4096, 2730));
        assert_eq!(bounded_dimensions(4000, 6000, 4096), (2730, 4096));
        assert_eq!(bounded_dimensions(5000, 5000, 4096), (4096, 4096));
    }

    #[test]
    fn test_bounded_dimensions_never_zero() {
        assert_eq!(bounded_dimensions(100_000, 2, 4096), (4096, 1));
    }

    #[test]
    fn test_contrast_spreads_values_around_mean() {
        // Half black, half mid-grey: mean luma 64
        let mut image = RgbImage::from_fn(4, 1, |x, _| {
            if x < 2 {
                Rgb([0, 0, 0])
            } else {
                Rgb([128, 128, 128])
            }
        });
        enhance_contrast(&mut image, 1.5);
        // 64 + 1.5 * (0 - 64) = -32 → 0 ; 64 + 1.5 * (128 - 64) = 160
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(3, 0).0, [160, 160, 160]);
    }

    #[test]
    fn test_contrast_factor_one_is_identity() {
        let original = RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 77]));
        let mut image = original.clone();
        enhance_contrast(&mut image, 1.0);
        assert_eq!(image, original);
    }

    #[test]
    fn test_canonicalize_small_image_keeps_size() {
        let bytes = png_bytes(RgbImage::new(320, 200));
        let canonical = canonicalize_bytes(&CanonicalizeConfig::default(), &bytes, "small.png")
            .unwrap();
        assert_eq!((canonical.width, canonical.height), (320, 200));
        assert!(!canonical.was_resized());
        assert_eq!(&canonical.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_canonicalize_downscales_to_bound() {
        let config = CanonicalizeConfig {
            max_dimension: 64,
            ..CanonicalizeConfig::default()
        };
        let bytes = png_bytes(RgbImage::new(300, 200));
        let canonical = canonicalize_bytes(&config, &bytes, "wide.png").unwrap();
        assert_eq!((canonical.width, canonical.height), (64, 42));
        assert!(canonical.was_resized());

        let reloaded = image::load_from_memory(&canonical.bytes).unwrap();
        assert_eq!(reloaded.dimensions(), (64, 42));
    }

    #[test]
    fn test_canonicalize_is_deterministic() {
        let image = RgbImage::from_fn(97, 61, |x, y| Rgb([(x * 2) as u8, (y * 4) as u8, 200]));
        let bytes = png_bytes(image);
        let config = CanonicalizeConfig {
            max_dimension: 50,
            ..CanonicalizeConfig::default()
        };
        let first = canonicalize_bytes(&config, &bytes, "a.png").unwrap();
        let second = canonicalize_bytes(&config, &bytes, "a.png").unwrap();
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.content_hash, second.content_hash);
    }

    #[test]
    fn test_canonicalize_drops_alpha() {
        let rgba = image::RgbaImage::from_pixel(10, 10, image::Rgba([10, 20, 30, 0]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        let canonical =
            canonicalize_bytes(&CanonicalizeConfig::default(), &buffer.into_inner(), "rgba.png")
                .unwrap();
        let reloaded = image::load_from_memory(&canonical.bytes).unwrap();
        assert!(matches!(reloaded, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_canonicalize_rejects_garbage() {
        let mut garbage = vec![0x89, b'P', b'N', b'G'];
        garbage.extend_from_slice(&[0u8; 64]);
        let err = canonicalize_bytes(&CanonicalizeConfig::default(), &garbage, "broken.png")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Decode { .. }));
        assert!(err.to_string().contains("broken.png"));
    }

    #[tokio::test]
    async fn test_canonicalize_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.png");
        std::fs::write(&path, png_bytes(RgbImage::new(40, 30))).unwrap();

        let canonicalizer =
            ImageCanonicalizer::new(CanonicalizeConfig::default(), LimitsConfig::default());
        let canonical = canonicalizer
            .canonicalize(&ImageSource::from_path(&path))
            .await
            .unwrap();
        assert_eq!((canonical.width, canonical.height), (40, 30));
        assert_eq!(canonical.content_hash.len(), 64);
    }

    #[tokio::test]
    async fn test_canonicalize_decode_timeout_is_fatal() {
        let limits = LimitsConfig {
            decode_timeout_ms: 1,
            ..LimitsConfig::default()
        };
        let config = CanonicalizeConfig {
            max_dimension: 1024,
            ..CanonicalizeConfig::default()
        };
        let bytes = png_bytes(RgbImage::from_fn(4000, 3000, |x, y| {
            Rgb([(x % 251) as u8, (y % 241) as u8, 90])
        }));

        let err = ImageCanonicalizer::new(config, limits)
            .canonicalize(&ImageSource::from_bytes("survey.png", bytes))
            .await
            .unwrap_err();
        match &err {
            AnalysisError::Timeout {
                source_name,
                stage,
                timeout_ms,
            } => {
                assert_eq!(source_name, "survey.png");
                assert_eq!(stage, "canonicalize");
                assert_eq!(*timeout_ms, 1);
            }
            other => panic!("Expected timeout, got {other:?}"),
        }
        assert!(err.is_fatal());
    }
}
