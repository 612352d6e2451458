//! Configuration file I/O operations

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.skipfeed/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".skipfeed")
    }

    /// Get the global config file path (~/.skipfeed/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load the config at `path` (global config when `None`), defaults if missing
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file_or_default(path),
            None => Self::from_file_or_default(&Self::global_config_path()),
        }
    }

    /// Save configuration to a file with atomic write and file locking.
    ///
    /// Concurrent writers serialize on a sibling `.lock` file; readers never
    /// see a partially written config because the content lands via rename.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        let _lock = lock_config(path)?;
        write_atomic(path, &content)
    }

    /// Create the config file at `path` with a fresh device ID.
    ///
    /// An existing file is left alone unless `force` is set. Returns the
    /// config now on disk and whether it was written.
    pub fn init(path: &Path, force: bool) -> Result<(Self, bool)> {
        let _lock = lock_config(path)?;

        // Re-check under the lock; another process may have created it
        if path.exists() && !force {
            return Ok((Self::from_file(path)?, false));
        }

        let mut config = Self::default();
        config.settings.device_id = uuid::Uuid::new_v4().to_string();
        let content =
            toml::to_string_pretty(&config).with_context(|| "Failed to serialize default config")?;
        write_atomic(path, &content)?;

        tracing::info!("Created {}", path.display());
        Ok((config, true))
    }
}

/// Exclusive lock on `<path>.lock`, released when the returned file is dropped
fn lock_config(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    // Separate from the config itself so the rename below cannot drop the lock
    let lock_path = path.with_extension("toml.lock");
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

    lock_file
        .lock_exclusive()
        .with_context(|| "Failed to acquire config lock")?;
    Ok(lock_file)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("toml.tmp");
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

    temp_file
        .write_all(content.as_bytes())
        .with_context(|| "Failed to write config content")?;
    temp_file
        .sync_all()
        .with_context(|| "Failed to sync config file")?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename config file: {}", path.display()))?;
    Ok(())
}
