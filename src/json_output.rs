//! # JSON Output Module
//!
//! Output strutturato in JSON (una riga per evento) per i batch avviati da script.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio batch con scope, numero di immagini e impostazioni
//! - `file_complete`: Fine elaborazione di un file (resized / skipped / error)
//! - `complete`: Fine batch con il `BatchReport`
//! - `error`: Errore generale (es. enumerazione fallita)

use crate::config::ResizeSettings;
use crate::planner::Dimensions;
use crate::progress::BatchReport;
use serde::Serialize;

/// Per-file result label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Resized,
    Skipped,
    Error,
}

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    #[serde(rename = "start")]
    Start {
        scope: String,
        total_files: usize,
        config: JsonConfig,
    },

    #[serde(rename = "file_complete")]
    FileComplete {
        path: String,
        status: FileStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        renamed_to: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        original: Option<Dimensions>,
        #[serde(skip_serializing_if = "Option::is_none")]
        resized: Option<Dimensions>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "complete")]
    Complete {
        scope: String,
        #[serde(flatten)]
        report: BatchReport,
        duration_seconds: f64,
    },

    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Settings echoed in the start message
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
    pub convert_png_to_jpeg: bool,
}

impl From<&ResizeSettings> for JsonConfig {
    fn from(settings: &ResizeSettings) -> Self {
        Self {
            max_width: settings.max_width,
            max_height: settings.max_height,
            jpeg_quality: settings.jpeg_quality,
            convert_png_to_jpeg: settings.convert_png_to_jpeg,
        }
    }
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(scope: &str, total_files: usize, settings: &ResizeSettings) -> Self {
        Self::Start {
            scope: scope.to_string(),
            total_files,
            config: settings.into(),
        }
    }

    pub fn resized(
        path: &str,
        renamed_to: Option<String>,
        original: Dimensions,
        resized: Dimensions,
    ) -> Self {
        Self::FileComplete {
            path: path.to_string(),
            status: FileStatus::Resized,
            renamed_to,
            original: Some(original),
            resized: Some(resized),
            error: None,
        }
    }

    pub fn skipped(path: &str) -> Self {
        Self::FileComplete {
            path: path.to_string(),
            status: FileStatus::Skipped,
            renamed_to: None,
            original: None,
            resized: None,
            error: None,
        }
    }

    pub fn failed(path: &str, error: String) -> Self {
        Self::FileComplete {
            path: path.to_string(),
            status: FileStatus::Error,
            renamed_to: None,
            original: None,
            resized: None,
            error: Some(error),
        }
    }

    pub fn complete(scope: &str, report: BatchReport, duration_seconds: f64) -> Self {
        Self::Complete {
            scope: scope.to_string(),
            report,
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}
