//! # Vault (Host Interface) Module
//!
//! Interfaccia stretta verso l'applicazione host che possiede lo storage.
//!
//! ## Responsabilità:
//! - `Vault` trait: lettura/scrittura/rename/creazione file, cartelle, enumerazione
//! - Avvisi per l'utente (`notify`) best-effort: un fallimento non è mai fatale
//! - Accesso al file attivo, cartella allegati e clipboard (solo per "paste full size")
//! - Utility per path relativi al vault separati da `/`
//!
//! ## Implementazioni:
//! - `LocalVault`: directory su disco via `tokio::fs` + `walkdir`
//! - `MemoryVault` (solo test): storage in memoria che registra ogni operazione
//!
//! ## Eventi:
//! Le sottoscrizioni create/modify e il segnale "ready" non passano da qui:
//! l'host chiama direttamente `EventDispatcher::handle_event` e `mark_ready`.

pub mod local;
#[cfg(test)]
pub mod memory;

pub use local::LocalVault;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A file listed by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFile {
    /// Vault-relative path, `/`-separated
    pub path: String,
    /// File name including extension
    pub name: String,
    /// Vault-relative parent folder ("" for the root)
    pub parent: String,
}

impl VaultFile {
    pub fn from_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: file_name(path).to_string(),
            parent: parent_folder(path).to_string(),
        }
    }
}

/// Image bytes read from the system clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardImage {
    pub bytes: Vec<u8>,
    /// Lowercased extension matching the bytes, e.g. "png"
    pub extension: String,
}

/// Storage and UI capabilities provided by the host application
#[async_trait]
pub trait Vault: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Overwrite an existing file
    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<()>;

    async fn rename_file(&self, from: &str, to: &str) -> Result<()>;

    /// Create a new file; fails if it already exists
    async fn create_file(&self, path: &str, bytes: &[u8]) -> Result<()>;

    async fn exists(&self, path: &str) -> bool;

    async fn folder_exists(&self, path: &str) -> bool;

    async fn create_folder(&self, path: &str) -> Result<()>;

    async fn list_files(&self) -> Result<Vec<VaultFile>>;

    /// Best-effort user-visible notice
    fn notify(&self, message: &str, duration: Duration);

    fn active_file(&self) -> Option<String>;

    /// Folder where attachments for the note at `path` are stored
    fn attachment_folder_for(&self, path: &str) -> String;

    async fn read_clipboard_image(&self) -> Result<Option<ClipboardImage>>;
}

/// Last component of a vault path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Parent folder of a vault path ("" for top-level files)
pub fn parent_folder(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..index],
        None => "",
    }
}

/// Join a folder and a file name
pub fn join(folder: &str, name: &str) -> String {
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// File name without its final extension
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Same folder and stem, different extension
pub fn with_extension(path: &str, extension: &str) -> String {
    join(parent_folder(path), &format!("{}.{}", file_stem(path), extension))
}

/// True when `path` is inside `folder` (recursively)
pub fn is_within(path: &str, folder: &str) -> bool {
    let folder = folder.trim_matches('/');
    folder.is_empty() || path.starts_with(&format!("{}/", folder))
}

/// First path derived from `path` that does not exist yet.
///
/// Tries `name.ext`, then `name 1.ext`, `name 2.ext`, ...
pub async fn available_path(vault: &dyn Vault, path: &str) -> String {
    if !vault.exists(path).await {
        return path.to_string();
    }

    let folder = parent_folder(path);
    let stem = file_stem(path);
    let name = file_name(path);
    let extension = name.strip_prefix(stem).unwrap_or("");

    let mut counter = 1u32;
    loop {
        let candidate = join(folder, &format!("{} {}{}", stem, counter, extension));
        if !vault.exists(&candidate).await {
            return candidate;
        }
        counter += 1;
    }
}
