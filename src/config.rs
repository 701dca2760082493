//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione del resizer.
//!
//! ## Responsabilità:
//! - Definisce la struct `ResizeSettings` con le opzioni esposte all'utente dall'host
//! - Definisce `Timings` con i ritardi di debounce, grace e pacing del batch
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione (chiavi JSON in camelCase, come lo schema dell'host):
//! - `maxWidth`: Larghezza massima in pixel (0 = nessun limite, default: 1920)
//! - `maxHeight`: Altezza massima in pixel (0 = nessun limite, default: 1080)
//! - `jpegQuality`: Qualità JPEG/WebP (1-100, default: 85)
//! - `convertPngToJpeg`: Converte i PNG ridimensionati in JPEG (default: false)
//! - `resizeOnPaste` / `resizeOnDrop`: Abilitano il resize automatico sugli eventi
//! - `showNotice`: Mostra un avviso per ogni file ridimensionato (default: true)
//!
//! ## Snapshot:
//! Le impostazioni sono una struttura semplice passata per riferimento a ogni
//! chiamata. Nessun componente le legge da stato globale.
//!
//! ## Esempio:
//! ```ignore
//! let settings = ResizeSettings {
//!     max_width: 1280,
//!     max_height: 0,
//!     ..Default::default()
//! };
//! settings.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// User-facing resize settings, owned by the host and read as a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResizeSettings {
    /// Maximum width in pixels (0 = unconstrained)
    pub max_width: u32,
    /// Maximum height in pixels (0 = unconstrained)
    pub max_height: u32,
    /// JPEG/WebP quality (1-100)
    pub jpeg_quality: u8,
    /// Re-encode resized PNG files as JPEG
    pub convert_png_to_jpeg: bool,
    /// Resize images that arrive through a paste
    pub resize_on_paste: bool,
    /// Resize images that arrive through a drag and drop
    pub resize_on_drop: bool,
    /// Show a notice for every single-file resize
    pub show_notice: bool,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            jpeg_quality: 85,
            convert_png_to_jpeg: false,
            resize_on_paste: true,
            resize_on_drop: true,
            show_notice: true,
        }
    }
}

impl ResizeSettings {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(anyhow::anyhow!("JPEG quality must be between 1 and 100"));
        }

        Ok(())
    }

    /// Whether create/modify events should trigger an automatic resize.
    ///
    /// A file event carries no information about how the file arrived, so
    /// either trigger flag enables the event path.
    pub fn auto_resize_enabled(&self) -> bool {
        self.resize_on_paste || self.resize_on_drop
    }

    /// True when neither axis is constrained
    pub fn is_unconstrained(&self) -> bool {
        self.max_width == 0 && self.max_height == 0
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let settings: ResizeSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Delays used by the scheduling and guard layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Quiet period before an event-triggered resize fires
    pub debounce: Duration,
    /// How long a single-file write-back stays in the guard set
    pub single_grace: Duration,
    /// How long each batch write-back stays in the guard set
    pub batch_grace: Duration,
    /// Pause after every successful batch resize
    pub batch_pause: Duration,
    /// Display time of per-file notices
    pub notice_duration: Duration,
    /// Display time of the batch summary notice
    pub summary_notice_duration: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            single_grace: Duration::from_millis(1000),
            batch_grace: Duration::from_millis(1000),
            batch_pause: Duration::from_millis(100),
            notice_duration: Duration::from_millis(4000),
            summary_notice_duration: Duration::from_millis(6000),
        }
    }
}
