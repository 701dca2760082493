//! # Event Dispatcher Module
//!
//! Radice del sistema: riceve eventi dell'host e comandi espliciti e li instrada.
//!
//! ## Responsabilità:
//! - Eventi `create`/`modify` su immagini → `DebounceScheduler` → percorso single-file
//! - Comandi "resize all" / "resize folder" → `BatchCoordinator`
//! - Comando periferico "paste full size" → `paste::paste_full_size`
//! - Possiede il `ReadyGate` (chiuso alla costruzione, aperto una sola volta da `mark_ready`)
//! - Possiede lo snapshot corrente di `ResizeSettings`, sostituito atomicamente
//!
//! ## Prevenzione loop:
//! Un path presente nel `ProcessingGuard` non viene mai schedulato né elaborato.
//! Il controllo è fatto all'arrivo dell'evento, allo scadere del debounce e,
//! in modo atomico, dal `FileProcessor` che acquisisce l'entry.
//!
//! ## Errori:
//! Gli errori del single-file vengono loggati e notificati (se `showNotice`),
//! mai propagati: il dispatcher non si ferma per un'immagine rotta.
//!
//! ## Esempio:
//! ```ignore
//! let dispatcher = EventDispatcher::new(vault, settings, Timings::default());
//! dispatcher.mark_ready();
//! dispatcher.handle_event(FileEvent::modify("attachments/photo.png"));
//! let outcome = dispatcher.run_command(Command::ResizeAll).await?;
//! ```

use crate::batch::{BatchCoordinator, BatchOutput};
use crate::config::{ResizeSettings, Timings};
use crate::debounce::{DebounceScheduler, ReadyGate};
use crate::engine;
use crate::error::Result;
use crate::guard::ProcessingGuard;
use crate::paste;
use crate::processor::{FileProcessor, ProcessOutcome};
use crate::progress::BatchReport;
use crate::vault::{self, Vault};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Kind of storage notification emitted by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Create,
    Modify,
}

/// A create or modify notification for one vault path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub kind: FileEventKind,
    pub path: String,
}

impl FileEvent {
    pub fn create(path: impl Into<String>) -> Self {
        Self {
            kind: FileEventKind::Create,
            path: path.into(),
        }
    }

    pub fn modify(path: impl Into<String>) -> Self {
        Self {
            kind: FileEventKind::Modify,
            path: path.into(),
        }
    }
}

/// Explicit user commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ResizeAll,
    ResizeFolder(String),
    PasteFullSize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Batch(BatchReport),
    /// Vault path of the pasted image
    Pasted(String),
}

/// Routes host events and commands to the scheduler, the batch coordinator and the guard
#[derive(Clone)]
pub struct EventDispatcher {
    vault: Arc<dyn Vault>,
    settings: Arc<RwLock<ResizeSettings>>,
    timings: Timings,
    guard: ProcessingGuard,
    ready: ReadyGate,
    scheduler: DebounceScheduler,
    processor: FileProcessor,
    batch: BatchCoordinator,
}

impl EventDispatcher {
    pub fn new(vault: Arc<dyn Vault>, settings: ResizeSettings, timings: Timings) -> Self {
        let guard = ProcessingGuard::new();
        let ready = ReadyGate::new();
        let scheduler = DebounceScheduler::new(timings.debounce, ready.clone());
        let processor = FileProcessor::new(vault.clone(), guard.clone());
        let batch = BatchCoordinator::new(vault.clone(), processor.clone(), timings);

        Self {
            vault,
            settings: Arc::new(RwLock::new(settings)),
            timings,
            guard,
            ready,
            scheduler,
            processor,
            batch,
        }
    }

    pub fn with_batch_output(mut self, output: BatchOutput) -> Self {
        self.batch = self.batch.with_output(output);
        self
    }

    /// Host finished its initial indexing; file events are accepted from now on
    pub fn mark_ready(&self) {
        self.ready.open();
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_open()
    }

    pub fn guard(&self) -> &ProcessingGuard {
        &self.guard
    }

    pub fn scheduler(&self) -> &DebounceScheduler {
        &self.scheduler
    }

    /// Copy of the current settings
    pub fn settings(&self) -> ResizeSettings {
        self.settings.read().clone()
    }

    /// Replace the settings used by every later invocation
    pub fn update_settings(&self, settings: ResizeSettings) -> anyhow::Result<()> {
        settings.validate()?;
        *self.settings.write() = settings;
        debug!("Settings updated");
        Ok(())
    }

    /// Handle a storage notification.
    ///
    /// Returns `true` when a debounced resize was scheduled.
    pub fn handle_event(&self, event: FileEvent) -> bool {
        let path = event.path;

        if !engine::is_supported_image(&path) {
            return false;
        }
        if self.guard.is_marked(&path) {
            trace!("Ignoring {:?} for {}: held by the guard", event.kind, path);
            return false;
        }
        if !self.settings.read().auto_resize_enabled() {
            return false;
        }

        let dispatcher = self.clone();
        let task_path = path.clone();
        self.scheduler.schedule(&path, async move {
            dispatcher.process_single(&task_path).await;
        })
    }

    /// Debounced single-file path; errors are reported, never propagated
    async fn process_single(&self, path: &str) {
        if self.guard.is_marked(path) {
            debug!("Skipping {}: held by the guard", path);
            return;
        }

        let settings = self.settings();
        let name = vault::file_name(path);

        match self
            .processor
            .process(path, &settings, self.timings.single_grace)
            .await
        {
            Ok(ProcessOutcome::Resized(file)) => {
                if settings.show_notice {
                    self.vault.notify(
                        &format!("Resized {}: {} → {}", file.file_name(), file.original, file.resized),
                        self.timings.notice_duration,
                    );
                }
            }
            Ok(ProcessOutcome::Skipped(reason)) => {
                trace!("{} left untouched ({:?})", path, reason);
            }
            Err(e) => {
                error!("Failed to resize {}: {}", path, e);
                if settings.show_notice {
                    self.vault.notify(
                        &format!("Failed to resize {}: {}", name, e),
                        self.timings.notice_duration,
                    );
                }
            }
        }
    }

    /// Run an explicit command against the current settings
    pub async fn run_command(&self, command: Command) -> Result<CommandOutcome> {
        let settings = self.settings();

        match command {
            Command::ResizeAll => self.batch.resize_all(&settings).await.map(CommandOutcome::Batch),
            Command::ResizeFolder(folder) => self
                .batch
                .resize_folder(&folder, &settings)
                .await
                .map(CommandOutcome::Batch),
            Command::PasteFullSize => {
                paste::paste_full_size(self.vault.as_ref(), &self.guard, &settings, &self.timings)
                    .await
                    .map(CommandOutcome::Pasted)
            }
        }
    }
}
