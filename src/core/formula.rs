//! Resolved package formulae
//!
//! A [`Formula`] is the immutable result of metadata resolution: the package
//! name, the version actually published (including any rebuild revision), and
//! one content hash per requested platform. Downstream stages never care
//! whether it came from the registry or from a pinned override.

use crate::types::{Platform, Sha256Hash};

/// Where formula metadata comes from.
///
/// Most packages are resolved dynamically against the registry. A few have
/// drifted upstream (the registry no longer serves a bottle for an older
/// platform) and carry their last known-good version and hashes inline.
#[derive(Debug, Clone, Copy)]
pub enum FormulaSource {
    /// Look the package up in the formula registry.
    Registry,
    /// Skip the registry entirely and use these values as-is.
    Pinned {
        /// Published version string, revision suffix included if any.
        version: &'static str,
        /// Content hash per platform the pin covers.
        sha256: &'static [(Platform, &'static str)],
    },
}

/// One platform variant of a resolved package.
#[derive(Debug, Clone)]
pub struct Bottle {
    /// Platform the prebuilt binary targets.
    pub platform: Platform,
    /// Content hash addressing the archive blob.
    pub sha256: Sha256Hash,
}

/// Resolved package metadata. Immutable after resolution.
#[derive(Debug, Clone)]
pub struct Formula {
    /// Package name.
    pub name: String,
    /// Resolved version, with `_<revision>` appended when the registry
    /// reports a nonzero rebuild revision.
    pub version: String,
    /// One bottle per requested platform, in request order.
    pub bottles: Vec<Bottle>,
}

impl Formula {
    /// Bottle for a given platform, if it was part of the resolution.
    pub fn bottle(&self, platform: Platform) -> Option<&Bottle> {
        self.bottles.iter().find(|b| b.platform == platform)
    }
}

/// Combine an upstream version string with its rebuild revision.
///
/// Revision 0 means the bottle was never rebuilt and the version is used
/// bare; any other revision is appended as `_<revision>`, matching the
/// directory name inside the bottle archive.
pub fn resolved_version(stable: &str, revision: u32) -> String {
    if revision == 0 {
        stable.to_string()
    } else {
        format!("{stable}_{revision}")
    }
}
