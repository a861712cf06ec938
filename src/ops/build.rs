//! The build pipeline
//!
//! Runs the fixed manifest top to bottom: resolve, fetch, extract, patch,
//! merge, archive. Every step is sequential and fail-fast; a failure aborts
//! the whole run and the next run starts from a wiped working directory.

use std::fs;
use std::path::PathBuf;

use crate::core::formula::Formula;
use crate::core::layout::Layout;
use crate::core::manifest::{self, item_filename, ArtifactKind, PackageSpec, Target};
use crate::io::archive::compress_dir;
use crate::io::download::BlobClient;
use crate::io::extract::extract_bottle;
use crate::ops::BuildError;
use crate::registry::RegistryClient;
use crate::relink::Relinker;
use crate::tools::ToolRunner;
use crate::universal::merge;

/// Pick targets from the manifest by label; an empty filter selects all.
pub fn select_targets(labels: &[String]) -> Result<Vec<Target>, BuildError> {
    if labels.is_empty() {
        return Ok(manifest::TARGETS.to_vec());
    }

    labels
        .iter()
        .map(|label| {
            manifest::TARGETS
                .iter()
                .find(|t| t.label == label.as_str())
                .copied()
                .ok_or_else(|| BuildError::UnknownTarget(label.clone()))
        })
        .collect()
}

/// Executes the pipeline for a set of targets.
#[derive(Debug)]
pub struct Builder {
    layout: Layout,
    registry: RegistryClient,
    blobs: BlobClient,
    tools: Box<dyn ToolRunner>,
}

impl Builder {
    /// Assemble a builder from its collaborators.
    pub fn new(
        layout: Layout,
        registry: RegistryClient,
        blobs: BlobClient,
        tools: Box<dyn ToolRunner>,
    ) -> Self {
        Self {
            layout,
            registry,
            blobs,
            tools,
        }
    }

    /// Run the full pipeline for every target, in order.
    ///
    /// The artifacts directory is wiped once per run; each target wipes the
    /// output directory before filling it.
    pub async fn run(&self, targets: &[Target]) -> Result<(), BuildError> {
        let artifacts = self.layout.artifacts_dir();
        if artifacts.exists() {
            fs::remove_dir_all(&artifacts)?;
        }
        fs::create_dir_all(&artifacts)?;

        for target in targets {
            self.build_target(target).await?;
        }

        Ok(())
    }

    /// Build one target: all its packages, aliases, and the final archive.
    pub async fn build_target(&self, target: &Target) -> Result<(), BuildError> {
        tracing::info!("Building target {}", target.label);

        let bin_dir = self.layout.bin_dir();
        if bin_dir.exists() {
            fs::remove_dir_all(&bin_dir)?;
        }
        fs::create_dir_all(&bin_dir)?;

        for pkg in target.packages {
            self.build_package(target, pkg).await?;
        }

        for (link, points_to) in target.aliases {
            std::os::unix::fs::symlink(points_to, bin_dir.join(link))?;
        }

        let archive = self.layout.archive_path(target.label);
        tracing::info!("Archiving {} -> {}", target.label, archive.display());
        compress_dir(&bin_dir, "bin", &archive)?;

        Ok(())
    }

    async fn build_package(&self, target: &Target, pkg: &PackageSpec) -> Result<(), BuildError> {
        let formula = self.registry.resolve(pkg, target.platforms).await?;
        tracing::info!("Building {} {}", formula.name, formula.version);

        for bottle in &formula.bottles {
            let blob = self.layout.blob_path(&bottle.sha256);
            self.blobs.fetch(&formula.name, &bottle.sha256, &blob).await?;
            extract_bottle(&blob, &self.layout.staging_dir(bottle.platform))?;
        }

        let relinker = Relinker::new(self.tools.as_ref(), target.policy);

        for item in pkg.items {
            let variants = self.staged_variants(&formula, item)?;

            if let Some(kind) = ArtifactKind::of(item) {
                for variant in &variants {
                    relinker.patch(variant, kind)?;
                }
            }

            let dest = self.layout.output_binary(item_filename(item));
            tracing::debug!("Packaging {} -> {}", item, dest.display());
            merge(self.tools.as_ref(), &variants, &dest)?;
        }

        Ok(())
    }

    /// Staged per-platform copies of an item, verified to exist for every
    /// declared platform. A missing copy is fatal.
    fn staged_variants(
        &self,
        formula: &Formula,
        item: &str,
    ) -> Result<Vec<PathBuf>, BuildError> {
        let mut variants = Vec::with_capacity(formula.bottles.len());

        for bottle in &formula.bottles {
            let path =
                self.layout
                    .staged_item(bottle.platform, &formula.name, &formula.version, item);
            if !path.exists() {
                return Err(BuildError::MissingArtifact { path });
            }
            variants.push(path);
        }

        Ok(variants)
    }
}
