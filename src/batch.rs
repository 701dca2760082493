//! # Batch Coordinator Module
//!
//! Esegue il resize su un insieme esplicito di file (tutto il vault o una cartella).
//!
//! ## Responsabilità:
//! - Elaborazione **seriale**: un file alla volta, mai in parallelo
//! - Pausa fissa dopo ogni resize riuscito per non saturare lo storage
//! - Un errore su un file viene contato e il batch prosegue
//! - Un solo report aggregato (e un solo notice di riepilogo) alla fine
//!
//! ## Interazione con il guard:
//! Ogni file passa dal `FileProcessor`, quindi il path è marcato prima del
//! write-back e rilasciato dopo il grace delay del batch. Un file già in mano
//! al percorso event-driven viene contato come skipped.
//!
//! ## Esempio:
//! ```ignore
//! let report = coordinator.resize_folder("attachments", &settings).await?;
//! println!("{}", report.format_summary("attachments"));
//! ```

use crate::config::{ResizeSettings, Timings};
use crate::engine;
use crate::error::{ResizeError, Result};
use crate::json_output::JsonMessage;
use crate::processor::{FileProcessor, ProcessOutcome, SkipReason};
use crate::progress::{BatchReport, ProgressManager};
use crate::vault::{self, Vault, VaultFile};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Scope label used for vault-wide batches
pub const VAULT_SCOPE: &str = "vault";

/// Extra feedback produced while a batch runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchOutput {
    /// Logs and the summary notice only
    #[default]
    Silent,
    /// `indicatif` progress bar on stderr
    ProgressBar,
    /// One JSON line per event on stdout
    Json,
}

/// Serial batch driver
#[derive(Clone)]
pub struct BatchCoordinator {
    vault: Arc<dyn Vault>,
    processor: FileProcessor,
    timings: Timings,
    output: BatchOutput,
}

impl BatchCoordinator {
    pub fn new(vault: Arc<dyn Vault>, processor: FileProcessor, timings: Timings) -> Self {
        Self {
            vault,
            processor,
            timings,
            output: BatchOutput::default(),
        }
    }

    pub fn with_output(mut self, output: BatchOutput) -> Self {
        self.output = output;
        self
    }

    /// Resize every supported image in the vault
    pub async fn resize_all(&self, settings: &ResizeSettings) -> Result<BatchReport> {
        let files = self.supported_files(|_| true).await?;
        Ok(self.run_batch(&files, VAULT_SCOPE, settings).await)
    }

    /// Resize every supported image under `folder`, recursively
    pub async fn resize_folder(&self, folder: &str, settings: &ResizeSettings) -> Result<BatchReport> {
        let folder = folder.trim_matches('/');
        if !self.vault.folder_exists(folder).await {
            return Err(ResizeError::storage(folder, "folder not found"));
        }

        let files = self.supported_files(|file| vault::is_within(&file.path, folder)).await?;
        let scope = if folder.is_empty() { VAULT_SCOPE } else { folder };
        Ok(self.run_batch(&files, scope, settings).await)
    }

    async fn supported_files<F>(&self, in_scope: F) -> Result<Vec<VaultFile>>
    where
        F: Fn(&VaultFile) -> bool,
    {
        let files = self.vault.list_files().await?;
        Ok(files
            .into_iter()
            .filter(|file| engine::is_supported_image(&file.name) && in_scope(file))
            .collect())
    }

    /// Process `files` one after another and report the aggregate result.
    ///
    /// Never fails: per-file errors are counted and logged.
    pub async fn run_batch(
        &self,
        files: &[VaultFile],
        scope_label: &str,
        settings: &ResizeSettings,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        if files.is_empty() {
            info!("No images found in {}", scope_label);
            self.vault.notify(
                &format!("No images found in {}", scope_label),
                self.timings.notice_duration,
            );
            return report;
        }

        info!("🖼️  Resizing {} images in {}", files.len(), scope_label);
        let started = Instant::now();
        let progress = match self.output {
            BatchOutput::ProgressBar => ProgressManager::new(files.len() as u64),
            _ => ProgressManager::hidden(),
        };
        if self.output == BatchOutput::Json {
            JsonMessage::start(scope_label, files.len(), settings).emit();
        }

        for file in files {
            let result = self
                .processor
                .process(&file.path, settings, self.timings.batch_grace)
                .await;

            match result {
                Ok(ProcessOutcome::Resized(resized)) => {
                    report.add_resized(resized.original_size, resized.resized_size);
                    progress.update(&format!(
                        "{}: {} -> {}",
                        resized.file_name(),
                        resized.original,
                        resized.resized
                    ));
                    if self.output == BatchOutput::Json {
                        let renamed_to = resized.renamed_from.is_some().then(|| resized.path.clone());
                        JsonMessage::resized(&file.path, renamed_to, resized.original, resized.resized)
                            .emit();
                    }
                    tokio::time::sleep(self.timings.batch_pause).await;
                }
                Ok(ProcessOutcome::Skipped(reason)) => {
                    if reason == SkipReason::InProgress {
                        debug!("{} is being resized elsewhere, skipping", file.path);
                    }
                    report.add_skipped();
                    progress.update(&format!("{}: within limits", file.name));
                    if self.output == BatchOutput::Json {
                        JsonMessage::skipped(&file.path).emit();
                    }
                }
                Err(e) => {
                    warn!("Failed to resize {}: {}", file.path, e);
                    report.add_error();
                    progress.update(&format!("{}: failed", file.name));
                    if self.output == BatchOutput::Json {
                        JsonMessage::failed(&file.path, e.to_string()).emit();
                    }
                }
            }
        }

        let summary = report.format_summary(scope_label);
        progress.finish(&summary);
        if self.output == BatchOutput::Json {
            JsonMessage::complete(scope_label, report, started.elapsed().as_secs_f64()).emit();
        }

        info!(
            resized = report.resized_count,
            skipped = report.skipped_count,
            errors = report.error_count,
            "✅ Batch over {} complete",
            scope_label
        );
        self.vault.notify(&summary, self.timings.summary_notice_duration);

        report
    }
}
