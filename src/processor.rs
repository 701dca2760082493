//! # File Processor Module
//!
//! Worker per il ridimensionamento di un singolo file del vault.
//! Condiviso dal percorso event-driven (dispatcher) e dal batch.
//!
//! ## Sequenza:
//! 1. Acquisisce l'entry del guard per il path (già presente → `Skipped(InProgress)`)
//! 2. Legge i byte e invoca l'engine su un worker bloccante
//! 3. `None` → rilascio immediato (nessuna scrittura) → `Skipped(WithinBounds)`
//! 4. Write-back sul path originale (mark-before-write)
//! 5. Cambio estensione: pre-mark del path di destinazione, poi rename
//! 6. Ogni entry viene rilasciata dopo il grace delay su tutti i percorsi di uscita
//!
//! ## Errori:
//! Decode/encode/storage vengono propagati al chiamante, che decide se notificare
//! (dispatcher) o contare e proseguire (batch).

use crate::config::ResizeSettings;
use crate::engine;
use crate::error::{ResizeError, Result};
use crate::guard::ProcessingGuard;
use crate::planner::Dimensions;
use crate::vault::{self, Vault};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A file that was written back with new dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedFile {
    /// Final vault path (after any rename)
    pub path: String,
    /// Path before an extension-changing rename
    pub renamed_from: Option<String>,
    pub original: Dimensions,
    pub resized: Dimensions,
    pub original_size: u64,
    pub resized_size: u64,
}

impl ResizedFile {
    pub fn file_name(&self) -> &str {
        vault::file_name(&self.path)
    }
}

/// Why a file was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Already fits within the configured limits
    WithinBounds,
    /// Another resize currently holds the path
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Resized(ResizedFile),
    Skipped(SkipReason),
}

/// Single-file read, resize and write-back under the processing guard
#[derive(Clone)]
pub struct FileProcessor {
    vault: Arc<dyn Vault>,
    guard: ProcessingGuard,
}

impl FileProcessor {
    pub fn new(vault: Arc<dyn Vault>, guard: ProcessingGuard) -> Self {
        Self { vault, guard }
    }

    pub fn guard(&self) -> &ProcessingGuard {
        &self.guard
    }

    /// Resize the image at `path` in place.
    ///
    /// Guard entries taken here are released `grace` after the call returns.
    pub async fn process(
        &self,
        path: &str,
        settings: &ResizeSettings,
        grace: Duration,
    ) -> Result<ProcessOutcome> {
        let entry = match self.guard.try_acquire(path, grace) {
            Some(entry) => entry,
            None => {
                debug!("Skipping {}: already being processed", path);
                return Ok(ProcessOutcome::Skipped(SkipReason::InProgress));
            }
        };

        let bytes = self.vault.read_file(path).await?;
        let original_size = bytes.len() as u64;

        let outcome = {
            let filename = vault::file_name(path).to_string();
            let settings = settings.clone();
            tokio::task::spawn_blocking(move || engine::resize(&bytes, &filename, &settings))
                .await
                .map_err(|e| ResizeError::Encode(format!("resize worker failed: {}", e)))??
        };

        let outcome = match outcome {
            Some(outcome) => outcome,
            None => {
                entry.release_now();
                return Ok(ProcessOutcome::Skipped(SkipReason::WithinBounds));
            }
        };

        self.vault.write_file(path, &outcome.encoded_bytes).await?;

        let (final_path, renamed_from) = match &outcome.output_extension {
            Some(extension) => {
                let desired = vault::with_extension(path, extension);
                let target = vault::available_path(self.vault.as_ref(), &desired).await;
                let _target_entry = self.guard.hold(&target, grace);
                self.vault.rename_file(path, &target).await?;
                debug!("Renamed {} -> {}", path, target);
                (target, Some(path.to_string()))
            }
            None => (path.to_string(), None),
        };

        info!(
            path = %final_path,
            original = %outcome.original,
            resized = %outcome.resized,
            "Resized image"
        );

        Ok(ProcessOutcome::Resized(ResizedFile {
            path: final_path,
            renamed_from,
            original: outcome.original,
            resized: outcome.resized,
            original_size,
            resized_size: outcome.encoded_bytes.len() as u64,
        }))
    }
}
