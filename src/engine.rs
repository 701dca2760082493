//! # Resize Engine Module
//!
//! Orchestratore per una singola immagine: decode → plan → scale → encode → risultato.
//!
//! ## Responsabilità:
//! - Costruisce un `ImageDescriptor` effimero da byte + nome file
//! - Interroga il planner e ritorna `None` quando il resize non serve
//! - Sceglie il formato di output (PNG → JPEG se la conversione è attiva)
//! - Produce un `ResizeOutcome` che il chiamante usa subito per il write-back
//!
//! ## Garanzie:
//! - Il percorso `None` non tocca mai i byte di input
//! - Nessuno stato mutabile condiviso: funzioni pure, sicure da chiamare in parallelo
//! - Errori di decode → `ResizeError::Decode`, errori di render → `ResizeError::Encode`
//!
//! ## Esempio:
//! ```ignore
//! match engine::resize(&bytes, "photo.png", &settings)? {
//!     Some(outcome) => vault.write_file(path, &outcome.encoded_bytes).await?,
//!     None => debug!("already within bounds"),
//! }
//! ```

use crate::codec::{self, ImageKind};
use crate::config::ResizeSettings;
use crate::error::Result;
use crate::planner::{self, Dimensions, ResizePlan};
use tracing::debug;

/// Extensions treated as resizable raster images
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// Lowercased extension of a file name or path, without the dot
pub fn extension_of(filename: &str) -> String {
    let name = filename.rsplit('/').next().unwrap_or(filename);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Check whether a file name has a supported image extension
pub fn is_supported_image(filename: &str) -> bool {
    let ext = extension_of(filename);
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Input image for one engine invocation
#[derive(Debug, Clone, Copy)]
pub struct ImageDescriptor<'a> {
    pub bytes: &'a [u8],
    pub kind: ImageKind,
}

impl<'a> ImageDescriptor<'a> {
    pub fn new(bytes: &'a [u8], filename: &str) -> Self {
        Self {
            bytes,
            kind: ImageKind::from_extension(&extension_of(filename)),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime_type()
    }
}

/// Result of a successful resize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub encoded_bytes: Vec<u8>,
    pub original: Dimensions,
    pub resized: Dimensions,
    /// Set only when the output format differs from the input (PNG → JPEG)
    pub output_extension: Option<String>,
}

/// Output format for an input kind under the given settings
pub fn output_kind(input: ImageKind, settings: &ResizeSettings) -> ImageKind {
    if input == ImageKind::Png && settings.convert_png_to_jpeg {
        ImageKind::Jpeg
    } else {
        input
    }
}

/// Resize one image so that it fits within the configured limits.
///
/// Returns `Ok(None)` when the image is already compliant.
pub fn resize(bytes: &[u8], filename: &str, settings: &ResizeSettings) -> Result<Option<ResizeOutcome>> {
    let descriptor = ImageDescriptor::new(bytes, filename);
    let original = codec::decode_dimensions(descriptor.bytes, descriptor.kind)?;

    let target = match planner::plan(original, settings.max_width, settings.max_height) {
        ResizePlan::NoResizeNeeded => {
            debug!("{} ({}) is {}, within limits", filename, descriptor.mime_type(), original);
            return Ok(None);
        }
        ResizePlan::Resize(target) => target,
    };

    let output = output_kind(descriptor.kind, settings);
    let encoded_bytes = codec::render_scaled(
        descriptor.bytes,
        descriptor.kind,
        target,
        output,
        settings.jpeg_quality,
    )?;

    debug!(
        "{} ({}): {} -> {} ({} -> {} bytes)",
        filename,
        descriptor.mime_type(),
        original,
        target,
        bytes.len(),
        encoded_bytes.len()
    );

    Ok(Some(ResizeOutcome {
        encoded_bytes,
        original,
        resized: target,
        output_extension: (output != descriptor.kind).then(|| output.extension().to_string()),
    }))
}
