//! # Vault Image Resizer - Main Entry Point
//!
//! Host a riga di comando: una directory locale fa da vault.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del logging con `tracing` (`RUST_LOG` o `--verbose`)
//! - Caricamento della configurazione JSON e override dai flag
//! - Avvio del comando richiesto sul `LocalVault`
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (vault, limiti, qualità, sottocomando)
//! 2. Configura il logging
//! 3. Valida che il vault esista e carica/valida le impostazioni
//! 4. Crea `LocalVault` + `EventDispatcher` ed esegue il comando
//!
//! ## Esempio di utilizzo:
//! ```text
//! vault-resizer ~/Notes --max-width 1600 --png-to-jpeg resize-all
//! vault-resizer ~/Notes watch --verbose
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vault_image_resizer::json_output::JsonMessage;
use vault_image_resizer::{
    watcher, BatchOutput, Command, CommandOutcome, EventDispatcher, LocalVault, ResizeSettings,
    Timings,
};

/// Default settings file, relative to the vault root
const DEFAULT_CONFIG_FILE: &str = ".image-resizer.json";

#[derive(Parser)]
#[command(name = "vault-resizer")]
#[command(about = "Downsize oversized images in a notes vault")]
struct Args {
    /// Vault root directory
    vault: PathBuf,

    /// Settings file (default: <VAULT>/.image-resizer.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum width in pixels (0 = unconstrained)
    #[arg(long)]
    max_width: Option<u32>,

    /// Maximum height in pixels (0 = unconstrained)
    #[arg(long)]
    max_height: Option<u32>,

    /// JPEG quality (1-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Re-encode resized PNG files as JPEG
    #[arg(long)]
    png_to_jpeg: bool,

    /// Emit JSON lines instead of a progress bar
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Resize every image in the vault
    ResizeAll,
    /// Resize every image under a vault folder
    ResizeFolder {
        /// Vault-relative folder path
        folder: String,
    },
    /// Watch the vault and resize new or modified images
    Watch,
    /// Write the effective settings to the config file
    InitConfig,
}

impl Args {
    fn apply_overrides(&self, settings: &mut ResizeSettings) {
        if let Some(max_width) = self.max_width {
            settings.max_width = max_width;
        }
        if let Some(max_height) = self.max_height {
            settings.max_height = max_height;
        }
        if let Some(quality) = self.quality {
            settings.jpeg_quality = quality;
        }
        if self.png_to_jpeg {
            settings.convert_png_to_jpeg = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !args.vault.is_dir() {
        return Err(anyhow::anyhow!("Vault directory does not exist: {}", args.vault.display()));
    }
    let root = args
        .vault
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", args.vault.display()))?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| root.join(DEFAULT_CONFIG_FILE));
    let mut settings = ResizeSettings::from_file(&config_path)
        .await
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    args.apply_overrides(&mut settings);
    settings.validate()?;

    let vault = LocalVault::new(root);
    let output = if args.json {
        BatchOutput::Json
    } else {
        BatchOutput::ProgressBar
    };
    let dispatcher = EventDispatcher::new(Arc::new(vault.clone()), settings.clone(), Timings::default())
        .with_batch_output(output);

    let command = match args.command {
        CliCommand::ResizeAll => Command::ResizeAll,
        CliCommand::ResizeFolder { ref folder } => Command::ResizeFolder(folder.clone()),
        CliCommand::Watch => {
            tokio::select! {
                result = watcher::watch(&vault, dispatcher.clone()) => result?,
                _ = tokio::signal::ctrl_c() => info!("Stopping watcher"),
            }
            dispatcher.scheduler().cancel_all();
            return Ok(());
        }
        CliCommand::InitConfig => {
            settings.save_to_file(&config_path).await?;
            info!("Settings written to {}", config_path.display());
            return Ok(());
        }
    };

    match dispatcher.run_command(command).await {
        Ok(CommandOutcome::Batch(report)) => {
            if report.error_count > 0 {
                info!("{} images could not be resized, see the log above", report.error_count);
            }
            Ok(())
        }
        Ok(CommandOutcome::Pasted(path)) => {
            info!("Pasted {}", path);
            Ok(())
        }
        Err(e) => {
            if args.json {
                JsonMessage::error(e.to_string(), None).emit();
            }
            Err(e.into())
        }
    }
}
