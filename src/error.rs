//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore del core di resize.
//!
//! ## Responsabilità:
//! - Definisce `ResizeError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Decode`: Byte corrotti o formato non supportato dal decoder
//! - `Encode`: Il codec rifiuta il formato di destinazione (es. canvas di area zero)
//! - `Storage`: Lettura/scrittura/rename falliti lato host
//! - `Clipboard`: Solo per il comando periferico "paste full size"
//! - `Validation`: Parametri di configurazione non validi
//! - `Io`: Errori di I/O generici (file non trovati, permessi, etc.)
//!
//! ## Propagazione:
//! Gli errori dell'engine vengono intercettati dal chiamante (handler single-file
//! o loop batch) e non arrivano mai a bloccare il dispatcher.
//!
//! ## Esempio:
//! ```ignore
//! if target.is_empty() {
//!     return Err(ResizeError::Encode("zero-area canvas".to_string()));
//! }
//! ```

/// Result alias used by the library core
pub type Result<T> = std::result::Result<T, ResizeError>;

/// Custom error types for image resizing
#[derive(thiserror::Error, Debug)]
pub enum ResizeError {
    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Image encode error: {0}")]
    Encode(String),

    #[error("Storage error on {path}: {message}")]
    Storage { path: String, message: String },

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResizeError {
    /// Builds a storage error for a vault path
    pub fn storage(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// True for failures that come from the image bytes themselves
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Encode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_message() {
        let err = ResizeError::storage("images/a.png", "permission denied");
        assert_eq!(err.to_string(), "Storage error on images/a.png: permission denied");
        assert!(!err.is_codec_error());
    }

    #[test]
    fn test_codec_errors() {
        assert!(ResizeError::Decode("bad header".into()).is_codec_error());
        assert!(ResizeError::Encode("zero area".into()).is_codec_error());
    }
}
