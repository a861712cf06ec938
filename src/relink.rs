//! Mach-O patching using install_name_tool
//!
//! Makes staged binaries relocatable before they are merged:
//! 1. Executables: mode 755. Libraries: mode 644, then `-id` rewritten to
//!    the bare filename.
//! 2. Both: every dependent-library path still carrying the registry's
//!    install-prefix placeholder is rewritten to a relocatable token.
//!
//! Two rewrite policies exist, reflecting the two packaging strategies the
//! toolchain consumers use; the manifest selects one per target.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use thiserror::Error;

use crate::core::manifest::ArtifactKind;
use crate::tools::{ToolError, ToolRunner};

/// Marker the registry embeds in dependency paths of bottled binaries
/// (`@@HOMEBREW_PREFIX@@`, `@@HOMEBREW_CELLAR@@`, ...).
pub const PLACEHOLDER_PREFIX: &str = "@@HOMEBREW_";

/// Token substituted by the consuming build system at install time.
pub const SUBSTITUTION_TOKEN: &str = "@@TOOLCHAIN@@";

/// Token the dynamic loader resolves against the binary's rpath entries.
pub const RPATH_TOKEN: &str = "@rpath";

#[derive(Error, Debug)]
pub enum RelinkError {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Artifact path has no filename: {0}")]
    InvalidPath(String),
}

/// How marked dependency paths are made relocatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelinkPolicy {
    /// Rewrite to [`SUBSTITUTION_TOKEN`]; the consumer replaces the token
    /// with a concrete directory when it unpacks the toolchain.
    Substitution,
    /// Rewrite to [`RPATH_TOKEN`] and inject a relative runtime search path
    /// so the loader can resolve siblings directly.
    Rpath,
}

impl RelinkPolicy {
    fn token(self) -> &'static str {
        match self {
            Self::Substitution => SUBSTITUTION_TOKEN,
            Self::Rpath => RPATH_TOKEN,
        }
    }
}

/// Patches one staged artifact file.
#[derive(Debug)]
pub struct Relinker<'a> {
    runner: &'a dyn ToolRunner,
    policy: RelinkPolicy,
}

impl<'a> Relinker<'a> {
    /// Create a relinker over a tool runner with the target's policy.
    pub fn new(runner: &'a dyn ToolRunner, policy: RelinkPolicy) -> Self {
        Self { runner, policy }
    }

    /// Apply all patches appropriate to the artifact's kind.
    ///
    /// Applied to every platform-variant copy of an artifact before merging.
    pub fn patch(&self, path: &Path, kind: ArtifactKind) -> Result<(), RelinkError> {
        match kind {
            ArtifactKind::Executable => {
                fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
                if self.policy == RelinkPolicy::Rpath {
                    self.add_rpath(path, "@executable_path")?;
                }
            }
            ArtifactKind::Library => {
                fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
                self.set_id(path)?;
                if self.policy == RelinkPolicy::Rpath {
                    self.add_rpath(path, "@loader_path")?;
                }
            }
        }

        self.rewrite_dependencies(path)
    }

    /// Rewrite the library's self-identifying install name to its bare
    /// filename, dropping the install-prefix directory.
    fn set_id(&self, path: &Path) -> Result<(), RelinkError> {
        let name = path
            .file_name()
            .ok_or_else(|| RelinkError::InvalidPath(path.display().to_string()))?;

        self.runner.run(
            "install_name_tool",
            &[OsString::from("-id"), name.into(), path.into()],
        )?;
        Ok(())
    }

    fn add_rpath(&self, path: &Path, entry: &str) -> Result<(), RelinkError> {
        self.runner.run(
            "install_name_tool",
            &[OsString::from("-add_rpath"), entry.into(), path.into()],
        )?;
        Ok(())
    }

    /// Scan declared dependencies and rewrite every marked path.
    fn rewrite_dependencies(&self, path: &Path) -> Result<(), RelinkError> {
        let listing = self
            .runner
            .capture("otool", &[OsString::from("-L"), path.into()])?;

        for (old, new) in rewrite_plan(&listing, self.policy) {
            self.runner.run(
                "install_name_tool",
                &[
                    OsString::from("-change"),
                    old.into(),
                    new.into(),
                    path.into(),
                ],
            )?;
        }

        Ok(())
    }
}

/// Compute `(old, new)` dependency rewrites from an `otool -L` listing.
///
/// Each listing line holds a dependency path followed by version details;
/// only paths carrying [`PLACEHOLDER_PREFIX`] are rewritten, to
/// `<token>/<bare filename>`.
pub fn rewrite_plan(listing: &str, policy: RelinkPolicy) -> Vec<(String, String)> {
    let token = policy.token();
    let mut plan = Vec::new();

    for line in listing.lines() {
        let dep = line.trim().split(' ').next().unwrap_or_default();
        if dep.contains(PLACEHOLDER_PREFIX) {
            let lib = dep.rsplit('/').next().unwrap_or(dep);
            plan.push((dep.to_string(), format!("{token}/{lib}")));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
/work/artifacts/catalina/cairo/1.16.0/lib/libcairo.2.dylib:
\t@@HOMEBREW_PREFIX@@/opt/libpng/lib/libpng16.16.dylib (compatibility version 54.0.0, current version 54.0.0)
\t@@HOMEBREW_CELLAR@@/fontconfig/2.14.1/lib/libfontconfig.1.dylib (compatibility version 13.0.0, current version 13.1.0)
\t/usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1311.0.0)
";

    #[test]
    fn test_plan_rewrites_marked_paths_only() {
        let plan = rewrite_plan(LISTING, RelinkPolicy::Substitution);

        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan[0],
            (
                "@@HOMEBREW_PREFIX@@/opt/libpng/lib/libpng16.16.dylib".to_string(),
                "@@TOOLCHAIN@@/libpng16.16.dylib".to_string()
            )
        );
        assert_eq!(plan[1].1, "@@TOOLCHAIN@@/libfontconfig.1.dylib");
    }

    #[test]
    fn test_plan_rpath_policy() {
        let plan = rewrite_plan(LISTING, RelinkPolicy::Rpath);
        assert_eq!(plan[0].1, "@rpath/libpng16.16.dylib");
    }

    #[test]
    fn test_plan_leaves_system_libs_alone() {
        let plan = rewrite_plan(LISTING, RelinkPolicy::Substitution);
        assert!(plan.iter().all(|(old, _)| !old.starts_with("/usr/lib")));
    }

    #[test]
    fn test_plan_empty_listing() {
        assert!(rewrite_plan("", RelinkPolicy::Substitution).is_empty());
    }
}
