//! In-memory vault used by the unit tests

use super::{ClipboardImage, Vault, VaultFile};
use crate::error::{ResizeError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Duration;

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    folders: BTreeSet<String>,
    reads: Vec<String>,
    writes: Vec<String>,
    renames: Vec<(String, String)>,
    creates: Vec<String>,
    notices: Vec<String>,
    failing_writes: HashSet<String>,
    clipboard: Option<ClipboardImage>,
    active_file: Option<String>,
}

/// Vault double that records every mutation
#[derive(Debug, Default)]
pub struct MemoryVault {
    state: Mutex<MemoryState>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, bytes: Vec<u8>) {
        self.state.lock().files.insert(path.to_string(), bytes);
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.state.lock().files.keys().cloned().collect()
    }

    pub fn reads(&self) -> Vec<String> {
        self.state.lock().reads.clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.state.lock().writes.clone()
    }

    pub fn renames(&self) -> Vec<(String, String)> {
        self.state.lock().renames.clone()
    }

    pub fn creates(&self) -> Vec<String> {
        self.state.lock().creates.clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.state.lock().notices.clone()
    }

    pub fn fail_writes_to(&self, path: &str) {
        self.state.lock().failing_writes.insert(path.to_string());
    }

    pub fn set_clipboard(&self, image: Option<ClipboardImage>) {
        self.state.lock().clipboard = image;
    }

    pub fn set_active_file(&self, path: Option<&str>) {
        self.state.lock().active_file = path.map(str::to_string);
    }
}

#[async_trait]
impl Vault for MemoryVault {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let mut state = self.state.lock();
        state.reads.push(path.to_string());
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ResizeError::storage(path, "no such file"))
    }

    async fn write_file(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        if state.failing_writes.contains(path) {
            return Err(ResizeError::storage(path, "write refused"));
        }
        state.writes.push(path.to_string());
        state.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        let mut state = self.state.lock();
        let bytes = state
            .files
            .remove(from)
            .ok_or_else(|| ResizeError::storage(from, "no such file"))?;
        state.files.insert(to.to_string(), bytes);
        state.renames.push((from.to_string(), to.to_string()));
        Ok(())
    }

    async fn create_file(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        if state.files.contains_key(path) {
            return Err(ResizeError::storage(path, "already exists"));
        }
        state.files.insert(path.to_string(), bytes.to_vec());
        state.creates.push(path.to_string());
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        self.state.lock().files.contains_key(path)
    }

    async fn folder_exists(&self, path: &str) -> bool {
        let state = self.state.lock();
        path.is_empty()
            || state.folders.contains(path)
            || state.files.keys().any(|file| file.starts_with(&format!("{}/", path)))
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        self.state.lock().folders.insert(path.to_string());
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<VaultFile>> {
        Ok(self
            .state
            .lock()
            .files
            .keys()
            .map(|path| VaultFile::from_path(path))
            .collect())
    }

    fn notify(&self, message: &str, _duration: Duration) {
        self.state.lock().notices.push(message.to_string());
    }

    fn active_file(&self) -> Option<String> {
        self.state.lock().active_file.clone()
    }

    fn attachment_folder_for(&self, path: &str) -> String {
        format!("{}/attachments", super::parent_folder(path)).trim_start_matches('/').to_string()
    }

    async fn read_clipboard_image(&self) -> Result<Option<ClipboardImage>> {
        Ok(self.state.lock().clipboard.clone())
    }
}
