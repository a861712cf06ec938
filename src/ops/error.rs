//! Domain-specific errors for the build pipeline

use std::path::PathBuf;

use thiserror::Error;

use crate::io::download::DownloadError;
use crate::io::extract::ExtractError;
use crate::registry::RegistryError;
use crate::relink::RelinkError;
use crate::universal::MergeError;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Metadata resolution failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Patching failed: {0}")]
    Relink(#[from] RelinkError),

    #[error("Packaging failed: {0}")]
    Merge(#[from] MergeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Expected artifact missing from staging: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("Unknown target label: {0}")]
    UnknownTarget(String),
}
