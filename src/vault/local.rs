//! # Local Vault Module
//!
//! Implementazione di `Vault` su una directory locale.
//!
//! ## Responsabilità:
//! - Traduce path relativi al vault (`/`) in path del filesystem sotto la root
//! - Enumerazione ricorsiva con `walkdir`, saltando cartelle nascoste (`.git`, `.obsidian`, ...)
//! - I/O asincrono con `tokio::fs`
//! - Gli avvisi diventano record `info!` sul target `notice`
//!
//! ## Limitazioni:
//! - Nessun accesso alla clipboard: `read_clipboard_image` ritorna `ResizeError::Clipboard`
//! - La cartella allegati è la cartella della nota

use super::{ClipboardImage, Vault, VaultFile};
use crate::error::{ResizeError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Vault backed by a directory on disk
#[derive(Debug, Clone)]
pub struct LocalVault {
    root: PathBuf,
    active_file: Option<String>,
}

impl LocalVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active_file: None,
        }
    }

    /// Set the note that "paste full size" attaches to
    pub fn with_active_file(mut self, path: impl Into<String>) -> Self {
        self.active_file = Some(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a vault-relative path
    pub fn absolute(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    /// Vault-relative path for a path under the root, if it is one
    pub fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
                _ => return None,
            }
        }
        (!segments.is_empty()).then(|| segments.join("/"))
    }

    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
    }
}

#[async_trait]
impl Vault for LocalVault {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        fs::read(self.absolute(path))
            .await
            .map_err(|e| ResizeError::storage(path, e))
    }

    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<()> {
        fs::write(self.absolute(path), bytes)
            .await
            .map_err(|e| ResizeError::storage(path, e))
    }

    async fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        let target = self.absolute(to);
        if fs::try_exists(&target).await.unwrap_or(false) {
            return Err(ResizeError::storage(to, "destination already exists"));
        }
        fs::rename(self.absolute(from), target)
            .await
            .map_err(|e| ResizeError::storage(from, e))
    }

    async fn create_file(&self, path: &str, bytes: &[u8]) -> Result<()> {
        use tokio::io::AsyncWriteExt;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.absolute(path))
            .await
            .map_err(|e| ResizeError::storage(path, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| ResizeError::storage(path, e))?;
        file.flush().await.map_err(|e| ResizeError::storage(path, e))
    }

    async fn exists(&self, path: &str) -> bool {
        fs::try_exists(self.absolute(path)).await.unwrap_or(false)
    }

    async fn folder_exists(&self, path: &str) -> bool {
        fs::metadata(self.absolute(path))
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false)
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.absolute(path))
            .await
            .map_err(|e| ResizeError::storage(path, e))
    }

    async fn list_files(&self) -> Result<Vec<VaultFile>> {
        let root = self.root.clone();
        let entries = tokio::task::spawn_blocking(move || {
            WalkDir::new(&root)
                .into_iter()
                .filter_entry(|entry| !Self::is_hidden(entry))
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| ResizeError::storage(self.root.display().to_string(), e))?;

        let mut files: Vec<VaultFile> = entries
            .iter()
            .filter_map(|path| self.relative(path))
            .map(|path| VaultFile::from_path(&path))
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        debug!("Listed {} files under {}", files.len(), self.root.display());
        Ok(files)
    }

    fn notify(&self, message: &str, duration: Duration) {
        info!(target: "notice", duration_ms = duration.as_millis() as u64, "{}", message);
    }

    fn active_file(&self) -> Option<String> {
        self.active_file.clone()
    }

    fn attachment_folder_for(&self, path: &str) -> String {
        super::parent_folder(path).to_string()
    }

    async fn read_clipboard_image(&self) -> Result<Option<ClipboardImage>> {
        Err(ResizeError::Clipboard(
            "clipboard is not available for a local vault".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn vault_with_files(files: &[&str]) -> (TempDir, LocalVault) {
        let temp_dir = TempDir::new().unwrap();
        let vault = LocalVault::new(temp_dir.path());
        for file in files {
            let path = vault.absolute(file);
            fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            fs::write(&path, b"data").await.unwrap();
        }
        (temp_dir, vault)
    }

    #[tokio::test]
    async fn test_list_files_recursive_and_sorted() {
        let (_dir, vault) =
            vault_with_files(&["b.png", "notes/a.md", "notes/img/c.jpg", ".obsidian/x.png"]).await;

        let files = vault.list_files().await.unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["b.png", "notes/a.md", "notes/img/c.jpg"]);
        assert_eq!(files[2].parent, "notes/img");
        assert_eq!(files[2].name, "c.jpg");
    }

    #[tokio::test]
    async fn test_read_write_rename() {
        let (_dir, vault) = vault_with_files(&["img/a.png"]).await;

        vault.write_file("img/a.png", b"resized").await.unwrap();
        assert_eq!(vault.read_file("img/a.png").await.unwrap(), b"resized");

        vault.rename_file("img/a.png", "img/a.jpg").await.unwrap();
        assert!(!vault.exists("img/a.png").await);
        assert!(vault.exists("img/a.jpg").await);
    }

    #[tokio::test]
    async fn test_rename_refuses_to_overwrite() {
        let (_dir, vault) = vault_with_files(&["a.png", "a.jpg"]).await;
        let err = vault.rename_file("a.png", "a.jpg").await.unwrap_err();
        assert!(matches!(err, ResizeError::Storage { .. }));
        assert_eq!(vault.read_file("a.jpg").await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_create_file_is_exclusive() {
        let (_dir, vault) = vault_with_files(&["a.png"]).await;
        assert!(vault.create_file("a.png", b"new").await.is_err());

        vault.create_folder("pasted").await.unwrap();
        assert!(vault.folder_exists("pasted").await);
        vault.create_file("pasted/b.png", b"new").await.unwrap();
        assert_eq!(vault.read_file("pasted/b.png").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_missing_file_is_storage_error() {
        let (_dir, vault) = vault_with_files(&[]).await;
        let err = vault.read_file("nope.png").await.unwrap_err();
        assert!(matches!(err, ResizeError::Storage { ref path, .. } if path == "nope.png"));
    }

    #[tokio::test]
    async fn test_relative_paths() {
        let (dir, vault) = vault_with_files(&[]).await;
        assert_eq!(
            vault.relative(&dir.path().join("a").join("b.png")).as_deref(),
            Some("a/b.png")
        );
        assert_eq!(vault.relative(dir.path()), None);
        assert_eq!(vault.relative(Path::new("/elsewhere/x.png")), None);
    }

    #[tokio::test]
    async fn test_clipboard_unavailable() {
        let (_dir, vault) = vault_with_files(&[]).await;
        assert!(matches!(
            vault.read_clipboard_image().await,
            Err(ResizeError::Clipboard(_))
        ));
        assert_eq!(vault.attachment_folder_for("notes/day.md"), "notes");
    }

    #[test]
    fn test_active_file() {
        assert_eq!(LocalVault::new("/vault").active_file(), None);

        let vault = LocalVault::new("/vault").with_active_file("journal/2024/day.md");
        assert_eq!(vault.active_file().as_deref(), Some("journal/2024/day.md"));
        assert_eq!(vault.attachment_folder_for("journal/2024/day.md"), "journal/2024");
    }
}
