//! Filesystem layout
//!
//! All paths the pipeline touches derive from a single root, passed
//! explicitly into each stage:
//!
//! ```text
//! <root>/
//! ├── artifacts/
//! │   ├── <sha256>.tar                        # raw downloaded blobs
//! │   ├── <platform>/<pkg>/<version>/<item>   # staged per-variant files
//! │   └── toolchain_<label>.tar.gz            # final archives
//! └── bin/                                    # merged universal outputs
//! ```

use std::path::{Path, PathBuf};

use crate::types::{Platform, Sha256Hash};

/// Path configuration for one build root.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Working directory for downloads, staging, and final archives.
    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join("artifacts")
    }

    /// Output directory for merged binaries.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// On-disk path of a raw downloaded blob, named by its content hash.
    pub fn blob_path(&self, sha256: &Sha256Hash) -> PathBuf {
        self.artifacts_dir().join(format!("{sha256}.tar"))
    }

    /// Extraction root for one platform variant.
    pub fn staging_dir(&self, platform: Platform) -> PathBuf {
        self.artifacts_dir().join(platform.tag())
    }

    /// A staged item inside an extracted bottle's install layout.
    pub fn staged_item(
        &self,
        platform: Platform,
        package: &str,
        version: &str,
        item: &str,
    ) -> PathBuf {
        self.staging_dir(platform)
            .join(package)
            .join(version)
            .join(item)
    }

    /// A merged output binary, by bare filename.
    pub fn output_binary(&self, filename: &str) -> PathBuf {
        self.bin_dir().join(filename)
    }

    /// Final compressed archive for a target label.
    pub fn archive_path(&self, label: &str) -> PathBuf {
        self.artifacts_dir().join(format!("toolchain_{label}.tar.gz"))
    }

    /// The build root itself.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
