//! # Vault Image Resizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare del resizer
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri host
//!
//! ## Architettura dei moduli:
//! - `planner`: Calcolo puro delle dimensioni di destinazione
//! - `codec`: Decode/encode in memoria e inferenza MIME dall'estensione
//! - `engine`: decode → plan → scale → encode per una singola immagine
//! - `guard`: Insieme dei path in scrittura, soppressione degli eventi eco
//! - `debounce`: Coalescenza degli eventi per path + ready gate
//! - `processor`: Lettura, resize e write-back di un file sotto il guard
//! - `batch`: Resize seriale su tutto il vault o una cartella
//! - `dispatcher`: Radice: instrada eventi e comandi
//! - `paste`: Comando periferico "paste full size"
//! - `vault`: Interfaccia verso l'host + implementazione su filesystem
//! - `watcher`: Eventi del filesystem per il vault locale
//! - `config`, `error`, `progress`, `json_output`: supporto
//!
//! ## Utilizzo:
//! ```ignore
//! use vault_image_resizer::{EventDispatcher, LocalVault, ResizeSettings, Timings};
//!
//! let vault = Arc::new(LocalVault::new("/path/to/vault"));
//! let dispatcher = EventDispatcher::new(vault, ResizeSettings::default(), Timings::default());
//! let outcome = dispatcher.run_command(Command::ResizeAll).await?;
//! ```

pub mod batch;
pub mod codec;
pub mod config;
pub mod debounce;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod guard;
pub mod json_output;
pub mod paste;
pub mod planner;
pub mod processor;
pub mod progress;
pub mod vault;
pub mod watcher;

pub use batch::{BatchCoordinator, BatchOutput};
pub use config::{ResizeSettings, Timings};
pub use dispatcher::{Command, CommandOutcome, EventDispatcher, FileEvent, FileEventKind};
pub use engine::{is_supported_image, resize, ResizeOutcome};
pub use error::ResizeError;
pub use guard::ProcessingGuard;
pub use planner::{Dimensions, ResizePlan};
pub use progress::BatchReport;
pub use vault::{LocalVault, Vault, VaultFile};
