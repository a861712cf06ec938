//! Bottle extraction
//!
//! Blobs are plain (uncompressed) tar archives laid out as
//! `<package>/<version>/...`. Each is unpacked into the per-platform staging
//! directory; re-extraction overwrites whatever a previous run left behind.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Archive error: {0}")]
    Archive(String),
}

/// Unpack a raw tar blob into `dest_dir`, creating it if absent.
pub fn extract_bottle(archive_path: &Path, dest_dir: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(dest_dir)?;

    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(BufReader::new(file));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();

        if entry.header().entry_type().is_dir() {
            continue;
        }

        // Sanitize path to prevent Zip Slip; `..` and absolute components
        // would land outside the staging directory.
        let escapes = entry_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ExtractError::Archive(format!(
                "Invalid path in archive: {}",
                entry_path.display()
            )));
        }

        let dest = dest_dir.join(&entry_path);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        // Idempotency: a previous run's file (or symlink) must not block
        // re-extraction.
        if dest.symlink_metadata().is_ok() {
            fs::remove_file(&dest)?;
        }

        entry.unpack(&dest)?;
    }

    Ok(())
}
