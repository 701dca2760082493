//! # Watcher Module
//!
//! Sorgente di eventi per il `LocalVault`: il filesystem fa da host.
//!
//! ## Responsabilità:
//! - Watcher ricorsivo `notify` sulla root del vault
//! - Bridge dal thread del watcher a un canale tokio
//! - Traduzione degli eventi in `FileEvent` con path relativi al vault
//! - Apertura del ready gate solo dopo che il watch è armato

use crate::dispatcher::{EventDispatcher, FileEvent, FileEventKind};
use crate::vault::LocalVault;
use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Translate a raw filesystem notification into dispatcher events
pub fn map_event(vault: &LocalVault, event: &Event) -> Vec<FileEvent> {
    let (kind, paths) = match &event.kind {
        EventKind::Create(_) => (FileEventKind::Create, &event.paths[..]),
        // la sorgente di un rename non esiste più: conta solo la destinazione
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => return Vec::new(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let destination = event.paths.len().saturating_sub(1);
            (FileEventKind::Create, &event.paths[destination..])
        }
        EventKind::Modify(ModifyKind::Name(_)) => (FileEventKind::Create, &event.paths[..]),
        EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(_) => (FileEventKind::Modify, &event.paths[..]),
        _ => return Vec::new(),
    };

    paths
        .iter()
        .filter_map(|path| vault.relative(path))
        .map(|path| FileEvent { kind, path })
        .collect()
}

/// Watch the vault root and feed events to `dispatcher` until the watcher stops
pub async fn watch(vault: &LocalVault, dispatcher: EventDispatcher) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        // il receiver chiuso significa che stiamo uscendo
        let _ = tx.send(result);
    })
    .context("Failed to create filesystem watcher")?;

    watcher
        .watch(vault.root(), RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", vault.root().display()))?;

    dispatcher.mark_ready();
    info!("👀 Watching {} for new images", vault.root().display());

    while let Some(result) = rx.recv().await {
        match result {
            Ok(event) => {
                for file_event in map_event(vault, &event) {
                    if dispatcher.handle_event(file_event.clone()) {
                        debug!("Scheduled {:?} {}", file_event.kind, file_event.path);
                    }
                }
            }
            Err(e) => warn!("Watcher error: {}", e),
        }
    }

    Ok(())
}
