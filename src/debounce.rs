//! # Debounce Scheduler Module
//!
//! Raggruppa raffiche di eventi sullo stesso path in una singola invocazione ritardata.
//!
//! ## Macchina a stati per path:
//! ```text
//! Idle -> Pending -> (nuovo evento: timer riarmato, resta Pending) -> Fired -> Idle
//! ```
//!
//! ## Regole:
//! - Al massimo un timer pendente per path; un nuovo `schedule` cancella il precedente
//! - Allo scadere il timer si rimuove dalla mappa, poi esegue il task
//! - Nessuno scheduling finché il `ReadyGate` è chiuso (evita la tempesta di resize
//!   durante l'indicizzazione iniziale dell'host)
//! - Un task già partito non viene mai cancellato

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// One-way gate opened when the host has finished its initial indexing
#[derive(Debug, Clone, Default)]
pub struct ReadyGate {
    open: Arc<AtomicBool>,
}

impl ReadyGate {
    /// A closed gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate; there is no way to close it again
    pub fn open(&self) {
        if !self.open.swap(true, Ordering::SeqCst) {
            debug!("Ready gate opened");
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

struct PendingTimer {
    id: u64,
    handle: JoinHandle<()>,
}

/// Per-path debouncer backed by tokio timers
#[derive(Clone)]
pub struct DebounceScheduler {
    quiet_period: Duration,
    gate: ReadyGate,
    pending: Arc<Mutex<HashMap<String, PendingTimer>>>,
    next_id: Arc<AtomicU64>,
}

impl DebounceScheduler {
    pub fn new(quiet_period: Duration, gate: ReadyGate) -> Self {
        Self {
            quiet_period,
            gate,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Run `task` once `path` has been quiet for the configured period.
    ///
    /// Timers run on the current tokio runtime. Returns `false` when the
    /// request was ignored because the gate is closed or no runtime is active.
    pub fn schedule<F>(&self, path: &str, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.gate.is_open() {
            trace!("Ignoring schedule for {} before ready", path);
            return false;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No tokio runtime, dropping schedule for {}", path);
                return false;
            }
        };

        self.arm(&runtime, path.to_string(), task.boxed());
        true
    }

    fn arm(&self, runtime: &tokio::runtime::Handle, path: String, task: BoxFuture<'static, ()>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let quiet_period = self.quiet_period;
        let pending = Arc::clone(&self.pending);

        // Il lock resta preso fino all'inserimento: il timer non può
        // controllare la mappa prima di esserci.
        let mut timers = self.pending.lock();

        let timer_path = path.clone();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(quiet_period).await;

            let fired = {
                let mut timers = pending.lock();
                match timers.get(&timer_path) {
                    Some(timer) if timer.id == id => {
                        timers.remove(&timer_path);
                        true
                    }
                    _ => false,
                }
            };

            if fired {
                trace!("Debounce fired for {}", timer_path);
                task.await;
            }
        });

        if let Some(previous) = timers.insert(path.clone(), PendingTimer { id, handle }) {
            previous.handle.abort();
            trace!("Debounce re-armed for {}", path);
        }
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.pending.lock().contains_key(path)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Cancel every timer that has not fired yet
    pub fn cancel_all(&self) {
        let mut timers = self.pending.lock();
        for (path, timer) in timers.drain() {
            timer.handle.abort();
            trace!("Debounce cancelled for {}", path);
        }
    }
}
