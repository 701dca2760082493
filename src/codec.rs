//! # Image Codec Adapter Module
//!
//! Questo modulo isola tutto il lavoro sui pixel dietro due operazioni:
//! lettura delle dimensioni e rendering scalato nel formato di destinazione.
//!
//! ## Responsabilità:
//! - Inferenza MIME dall'estensione (nessun sniffing dei magic bytes)
//! - Decodifica header per ottenere le dimensioni senza decodificare i pixel
//! - Resampling di alta qualità (Lanczos3, mai nearest-neighbor)
//! - Encoding nel formato di output con la qualità richiesta
//!
//! ## Mappatura estensioni:
//! | Estensione    | MIME        |
//! |---------------|-------------|
//! | png           | image/png   |
//! | jpg, jpeg     | image/jpeg  |
//! | webp          | image/webp  |
//! | bmp           | image/bmp   |
//! | altro         | image/png (tentativo best-effort) |
//!
//! ## Qualità di output:
//! - **JPEG**: usa `quality` (1-100); il canale alpha viene scartato
//! - **WebP**: lossy via `libwebp` (crate `webp`) con la stessa `quality`
//! - **PNG / BMP**: lossless, `quality` ignorata

use crate::error::{ResizeError, Result};
use crate::planner::Dimensions;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Resampling filter used for every downscale
pub const RESAMPLING_FILTER: FilterType = FilterType::Lanczos3;

/// Raster formats understood by the resizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Png,
    Jpeg,
    WebP,
    Bmp,
}

impl ImageKind {
    /// Infer the format from a lowercased file extension.
    ///
    /// Unknown extensions fall back to PNG so that decoding is still attempted.
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "png" => ImageKind::Png,
            "jpg" | "jpeg" => ImageKind::Jpeg,
            "webp" => ImageKind::WebP,
            "bmp" => ImageKind::Bmp,
            _ => ImageKind::Png,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::WebP => "image/webp",
            ImageKind::Bmp => "image/bmp",
        }
    }

    /// Canonical extension written when a file changes format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::WebP => "webp",
            ImageKind::Bmp => "bmp",
        }
    }

    /// Whether the encoder honours a quality setting
    pub fn is_lossy(&self) -> bool {
        matches!(self, ImageKind::Jpeg | ImageKind::WebP)
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::WebP => ImageFormat::WebP,
            ImageKind::Bmp => ImageFormat::Bmp,
        }
    }
}

/// Read the pixel dimensions from the image header.
pub fn decode_dimensions(bytes: &[u8], kind: ImageKind) -> Result<Dimensions> {
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), kind.image_format())
        .into_dimensions()
        .map_err(|e| ResizeError::Decode(format!("{} header: {}", kind.mime_type(), e)))?;

    let dimensions = Dimensions::new(width, height);
    if dimensions.is_empty() {
        return Err(ResizeError::Decode(format!(
            "{} decoded to an empty image ({})",
            kind.mime_type(),
            dimensions
        )));
    }

    Ok(dimensions)
}

/// Decode `bytes`, scale to `target` and encode as `output`.
pub fn render_scaled(
    bytes: &[u8],
    kind: ImageKind,
    target: Dimensions,
    output: ImageKind,
    quality: u8,
) -> Result<Vec<u8>> {
    if target.is_empty() {
        return Err(ResizeError::Encode(format!("cannot render a {} canvas", target)));
    }

    let source = image::load_from_memory_with_format(bytes, kind.image_format())
        .map_err(|e| ResizeError::Decode(format!("{}: {}", kind.mime_type(), e)))?;

    debug!(
        quality = ?output.is_lossy().then_some(quality),
        "Rendering {}x{} {} -> {} {}",
        source.width(),
        source.height(),
        kind.mime_type(),
        target,
        output.mime_type()
    );

    let scaled = source.resize_exact(target.width, target.height, RESAMPLING_FILTER);
    encode(&scaled, output, quality)
}

fn encode(image: &DynamicImage, output: ImageKind, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    match output {
        ImageKind::Jpeg => {
            let rgb = image.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            encoder
                .encode_image(&rgb)
                .map_err(|e| ResizeError::Encode(format!("image/jpeg: {}", e)))?;
        }
        ImageKind::Png => {
            image
                .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .map_err(|e| ResizeError::Encode(format!("image/png: {}", e)))?;
        }
        ImageKind::WebP => {
            let rgba = image.to_rgba8();
            let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                .encode_simple(false, f32::from(quality.clamp(1, 100)))
                .map_err(|e| ResizeError::Encode(format!("image/webp: {:?}", e)))?;
            buf.extend_from_slice(&encoded);
        }
        ImageKind::Bmp => {
            // l'encoder BMP accetta solo 8 bit per canale
            let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
            rgba.write_to(&mut Cursor::new(&mut buf), ImageFormat::Bmp)
                .map_err(|e| ResizeError::Encode(format!("image/bmp: {}", e)))?;
        }
    }

    Ok(buf)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    /// Encode a gradient test image in memory
    pub(crate) fn sample_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let rgba = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        });
        let image = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(
                RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128])),
            ),
            _ => DynamicImage::ImageRgba8(rgba),
        };

        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn test_mime_inference() {
        assert_eq!(ImageKind::from_extension("png").mime_type(), "image/png");
        assert_eq!(ImageKind::from_extension("jpg").mime_type(), "image/jpeg");
        assert_eq!(ImageKind::from_extension("jpeg").mime_type(), "image/jpeg");
        assert_eq!(ImageKind::from_extension("webp").mime_type(), "image/webp");
        assert_eq!(ImageKind::from_extension("bmp").mime_type(), "image/bmp");
        assert_eq!(ImageKind::from_extension("tiff").mime_type(), "image/png");
        assert_eq!(ImageKind::from_extension("").mime_type(), "image/png");
    }

    #[test]
    fn test_decode_dimensions() {
        let png = sample_image(64, 32, ImageFormat::Png);
        assert_eq!(decode_dimensions(&png, ImageKind::Png).unwrap(), Dimensions::new(64, 32));

        let jpeg = sample_image(40, 50, ImageFormat::Jpeg);
        assert_eq!(decode_dimensions(&jpeg, ImageKind::Jpeg).unwrap(), Dimensions::new(40, 50));

        let bmp = sample_image(7, 9, ImageFormat::Bmp);
        assert_eq!(decode_dimensions(&bmp, ImageKind::Bmp).unwrap(), Dimensions::new(7, 9));
    }

    #[test]
    fn test_decode_corrupt_bytes() {
        let err = decode_dimensions(b"definitely not an image", ImageKind::Png).unwrap_err();
        assert!(matches!(err, ResizeError::Decode(_)));

        let err = decode_dimensions(&[], ImageKind::Jpeg).unwrap_err();
        assert!(matches!(err, ResizeError::Decode(_)));
    }

    #[test]
    fn test_render_png_to_png() {
        let png = sample_image(100, 50, ImageFormat::Png);
        let out = render_scaled(&png, ImageKind::Png, Dimensions::new(40, 20), ImageKind::Png, 85).unwrap();

        let decoded = image::load_from_memory_with_format(&out, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 20));
    }

    #[test]
    fn test_render_png_to_jpeg() {
        let png = sample_image(100, 50, ImageFormat::Png);
        let out = render_scaled(&png, ImageKind::Png, Dimensions::new(50, 25), ImageKind::Jpeg, 80).unwrap();

        // JPEG SOI marker
        assert_eq!(&out[..2], &[0xFF, 0xD8]);
        assert_eq!(decode_dimensions(&out, ImageKind::Jpeg).unwrap(), Dimensions::new(50, 25));
    }

    #[test]
    fn test_render_webp_and_bmp() {
        let png = sample_image(30, 30, ImageFormat::Png);

        let webp = render_scaled(&png, ImageKind::Png, Dimensions::new(10, 10), ImageKind::WebP, 80).unwrap();
        assert_eq!(decode_dimensions(&webp, ImageKind::WebP).unwrap(), Dimensions::new(10, 10));

        let bmp = render_scaled(&png, ImageKind::Png, Dimensions::new(15, 15), ImageKind::Bmp, 80).unwrap();
        assert_eq!(decode_dimensions(&bmp, ImageKind::Bmp).unwrap(), Dimensions::new(15, 15));
    }

    #[test]
    fn test_zero_area_canvas_rejected() {
        let png = sample_image(10, 10, ImageFormat::Png);
        let err = render_scaled(&png, ImageKind::Png, Dimensions::new(0, 5), ImageKind::Png, 85).unwrap_err();
        assert!(matches!(err, ResizeError::Encode(_)));
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let png = sample_image(200, 200, ImageFormat::Png);
        let target = Dimensions::new(150, 150);
        let high = render_scaled(&png, ImageKind::Png, target, ImageKind::Jpeg, 100).unwrap();
        let low = render_scaled(&png, ImageKind::Png, target, ImageKind::Jpeg, 10).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_webp_quality_applies() {
        let png = sample_image(200, 200, ImageFormat::Png);
        let target = Dimensions::new(150, 150);
        let high = render_scaled(&png, ImageKind::Png, target, ImageKind::WebP, 100).unwrap();
        let low = render_scaled(&png, ImageKind::Png, target, ImageKind::WebP, 10).unwrap();

        assert!(low.len() < high.len());
        assert_eq!(decode_dimensions(&low, ImageKind::WebP).unwrap(), target);
        assert!(ImageKind::WebP.is_lossy());
        assert!(!ImageKind::Png.is_lossy());
    }
}
