//! # Processing Guard Module
//!
//! Insieme dei path che questo processo sta scrivendo in questo momento.
//!
//! ## Responsabilità:
//! - Sopprime gli eventi "eco" generati dai nostri stessi write-back
//! - Mark prima della scrittura, unmark dopo un grace delay
//! - Pre-mark del path di destinazione prima di un rename (cambio estensione)
//! - `GuardEntry` RAII: il rilascio avviene su ogni percorso di uscita, anche in errore
//!
//! ## Generazioni:
//! Ogni `mark` incrementa la generazione del path. Un `unmark_after` programmato
//! rimuove l'entry solo se nel frattempo nessuno l'ha marcata di nuovo, così un
//! rilascio ritardato non cancella un mark più recente.
//!
//! ## Concorrenza:
//! La mappa è protetta da un `parking_lot::Mutex`: i task tokio girano su
//! thread reali, quindi niente stato condiviso senza lock.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Process-wide set of paths currently being written by the resizer
#[derive(Debug, Clone, Default)]
pub struct ProcessingGuard {
    entries: Arc<Mutex<GuardState>>,
}

#[derive(Debug, Default)]
struct GuardState {
    marked: HashMap<String, u64>,
    next_generation: u64,
}

impl GuardState {
    fn insert(&mut self, path: &str) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.marked.insert(path.to_string(), generation);
        generation
    }
}

impl ProcessingGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as being written by us
    pub fn mark(&self, path: &str) {
        let generation = self.entries.lock().insert(path);
        trace!("Guard mark {} (gen {})", path, generation);
    }

    pub fn is_marked(&self, path: &str) -> bool {
        self.entries.lock().marked.contains_key(path)
    }

    /// Remove `path` from the set; no-op if absent
    pub fn unmark(&self, path: &str) {
        if self.entries.lock().marked.remove(path).is_some() {
            trace!("Guard unmark {}", path);
        }
    }

    /// Release `path` once `delay` has elapsed.
    ///
    /// Must be called from within a tokio runtime; outside one the path is
    /// released immediately.
    pub fn unmark_after(&self, path: &str, delay: Duration) {
        let generation = match self.entries.lock().marked.get(path) {
            Some(generation) => *generation,
            None => return,
        };
        self.release_generation_after(path.to_string(), generation, delay);
    }

    /// Number of paths currently marked
    pub fn len(&self) -> usize {
        self.entries.lock().marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark `path` only if nobody holds it yet.
    ///
    /// The returned entry releases the path after `grace` when dropped.
    pub fn try_acquire(&self, path: &str, grace: Duration) -> Option<GuardEntry> {
        let mut state = self.entries.lock();
        if state.marked.contains_key(path) {
            return None;
        }
        let generation = state.insert(path);
        drop(state);

        debug!("Guard acquired {}", path);
        Some(GuardEntry {
            guard: self.clone(),
            path: path.to_string(),
            generation,
            grace,
            released: false,
        })
    }

    /// Mark `path` unconditionally and return a scoped entry for it.
    ///
    /// Used for rename targets and freshly created files.
    pub fn hold(&self, path: &str, grace: Duration) -> GuardEntry {
        let generation = self.entries.lock().insert(path);
        debug!("Guard holding {}", path);
        GuardEntry {
            guard: self.clone(),
            path: path.to_string(),
            generation,
            grace,
            released: false,
        }
    }

    fn release_generation(&self, path: &str, generation: u64) {
        let mut state = self.entries.lock();
        if state.marked.get(path) == Some(&generation) {
            state.marked.remove(path);
            trace!("Guard released {} (gen {})", path, generation);
        }
    }

    fn release_generation_after(&self, path: String, generation: u64, delay: Duration) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let guard = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    guard.release_generation(&path, generation);
                });
            }
            Err(_) => self.release_generation(&path, generation),
        }
    }
}

/// Scoped guard mark; released after its grace delay on drop
#[derive(Debug)]
pub struct GuardEntry {
    guard: ProcessingGuard,
    path: String,
    generation: u64,
    grace: Duration,
    released: bool,
}

impl GuardEntry {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Release immediately, skipping the grace delay.
    ///
    /// Only valid when nothing was written for this path.
    pub fn release_now(mut self) {
        self.guard.release_generation(&self.path, self.generation);
        self.released = true;
    }
}

impl Drop for GuardEntry {
    fn drop(&mut self) {
        if !self.released {
            self.guard
                .release_generation_after(std::mem::take(&mut self.path), self.generation, self.grace);
        }
    }
}
