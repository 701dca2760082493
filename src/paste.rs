//! # Paste Full Size Module
//!
//! Comando periferico "incolla immagine a piena risoluzione": salva l'immagine
//! della clipboard nella cartella allegati della nota attiva senza ridimensionarla.
//!
//! ## Sequenza:
//! 1. Nota attiva → cartella allegati (creata se manca)
//! 2. Nome `Pasted image <unix-millis>.<ext>`, con suffisso ` 1`, ` 2`, ... se occupato
//! 3. Il nuovo path entra nel guard prima di `create_file`, così l'evento di
//!    creazione non fa partire un resize
//! 4. Rilascio dopo il grace delay

use crate::config::{ResizeSettings, Timings};
use crate::error::{ResizeError, Result};
use crate::guard::ProcessingGuard;
use crate::vault::{self, Vault};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Store the clipboard image next to the active note, bypassing the resizer.
///
/// Returns the vault path of the created file.
pub async fn paste_full_size(
    vault: &dyn Vault,
    guard: &ProcessingGuard,
    settings: &ResizeSettings,
    timings: &Timings,
) -> Result<String> {
    let active = vault
        .active_file()
        .ok_or_else(|| ResizeError::Validation("no active note to paste into".to_string()))?;

    let image = vault
        .read_clipboard_image()
        .await?
        .ok_or_else(|| ResizeError::Clipboard("clipboard does not contain an image".to_string()))?;

    let folder = vault.attachment_folder_for(&active);
    if !folder.is_empty() && !vault.folder_exists(&folder).await {
        vault.create_folder(&folder).await?;
    }

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let desired = vault::join(&folder, &format!("Pasted image {}.{}", millis, image.extension));
    let path = vault::available_path(vault, &desired).await;

    let _entry = guard.hold(&path, timings.single_grace);
    vault.create_file(&path, &image.bytes).await?;

    info!(path = %path, bytes = image.bytes.len(), "Pasted full-size image");
    if settings.show_notice {
        vault.notify(
            &format!("Pasted full-size image {}", vault::file_name(&path)),
            timings.notice_duration,
        );
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::memory::MemoryVault;
    use crate::vault::ClipboardImage;
    use std::time::Duration;

    fn timings() -> Timings {
        Timings {
            single_grace: Duration::from_millis(100),
            ..Default::default()
        }
    }

    fn clipboard_png() -> ClipboardImage {
        ClipboardImage {
            bytes: vec![0x89, b'P', b'N', b'G'],
            extension: "png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_paste_creates_guarded_file() {
        let vault = MemoryVault::new();
        vault.set_active_file(Some("notes/today.md"));
        vault.set_clipboard(Some(clipboard_png()));
        let guard = ProcessingGuard::new();

        let path = paste_full_size(&vault, &guard, &ResizeSettings::default(), &timings())
            .await
            .unwrap();

        assert!(path.starts_with("notes/attachments/Pasted image "));
        assert!(path.ends_with(".png"));
        assert_eq!(vault.creates(), vec![path.clone()]);
        assert_eq!(vault.get(&path).unwrap(), clipboard_png().bytes);
        assert!(guard.is_marked(&path));
        assert_eq!(vault.notices().len(), 1);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!guard.is_marked(&path));
    }

    #[tokio::test]
    async fn test_paste_without_image_fails() {
        let vault = MemoryVault::new();
        vault.set_active_file(Some("note.md"));
        let guard = ProcessingGuard::new();

        let err = paste_full_size(&vault, &guard, &ResizeSettings::default(), &timings())
            .await
            .unwrap_err();
        assert!(matches!(err, ResizeError::Clipboard(_)));
        assert!(vault.creates().is_empty());
    }

    #[tokio::test]
    async fn test_paste_without_active_note_fails() {
        let vault = MemoryVault::new();
        vault.set_clipboard(Some(clipboard_png()));
        let guard = ProcessingGuard::new();

        let result = paste_full_size(&vault, &guard, &ResizeSettings::default(), &timings()).await;
        assert!(matches!(result, Err(ResizeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_paste_respects_show_notice() {
        let vault = MemoryVault::new();
        vault.set_active_file(Some("note.md"));
        vault.set_clipboard(Some(clipboard_png()));
        let settings = ResizeSettings {
            show_notice: false,
            ..Default::default()
        };

        paste_full_size(&vault, &ProcessingGuard::new(), &settings, &timings())
            .await
            .unwrap();
        assert!(vault.notices().is_empty());
    }
}
