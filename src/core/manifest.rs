//! Declarative build manifest
//!
//! One data-driven list of targets drives the whole pipeline: each target
//! names its platforms, relink policy, packages, and the artifacts to lift
//! out of each package. Adding a package is a one-line edit here.

use crate::core::formula::FormulaSource;
use crate::relink::RelinkPolicy;
use crate::types::Platform;

/// Artifact classification, derived from the leading path component of the
/// item's install-layout path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `bin/…` — executable, mode 755, dependency rewrite only.
    Executable,
    /// `lib/…` — shared library, mode 644, identity rewrite + dependency rewrite.
    Library,
}

impl ArtifactKind {
    /// Classify an item path. Items outside `bin/` and `lib/` are not
    /// patchable and pass through the packager untouched.
    pub fn of(item: &str) -> Option<Self> {
        match item.split('/').next() {
            Some("bin") => Some(Self::Executable),
            Some("lib") => Some(Self::Library),
            _ => None,
        }
    }
}

/// Bare filename of an item path (the final path component).
pub fn item_filename(item: &str) -> &str {
    item.rsplit('/').next().unwrap_or(item)
}

/// One package to pull into the toolchain.
#[derive(Debug, Clone, Copy)]
pub struct PackageSpec {
    /// Registry name of the package.
    pub name: &'static str,
    /// Artifacts to lift out of the package's install layout.
    pub items: &'static [&'static str],
    /// Dynamic registry lookup or pinned override.
    pub source: FormulaSource,
}

impl PackageSpec {
    const fn registry(name: &'static str, items: &'static [&'static str]) -> Self {
        Self {
            name,
            items,
            source: FormulaSource::Registry,
        }
    }

    const fn pinned(
        name: &'static str,
        items: &'static [&'static str],
        version: &'static str,
        sha256: &'static [(Platform, &'static str)],
    ) -> Self {
        Self {
            name,
            items,
            source: FormulaSource::Pinned { version, sha256 },
        }
    }
}

/// One toolchain archive to produce.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    /// Label naming the output archive (`toolchain_<label>.tar.gz`).
    pub label: &'static str,
    /// Platforms whose bottles are merged into each output binary.
    pub platforms: &'static [Platform],
    /// How dependent-library paths are made relocatable.
    pub policy: RelinkPolicy,
    /// Packages to build, in order.
    pub packages: &'static [PackageSpec],
    /// Unversioned symlink aliases created in the output directory,
    /// as `(link name, points to)` pairs.
    pub aliases: &'static [(&'static str, &'static str)],
}

const CAIRO_ITEMS: &[&str] = &["lib/libcairo.2.dylib"];
const LIBPNG_ITEMS: &[&str] = &["lib/libpng16.16.dylib"];
const FREETYPE_ITEMS: &[&str] = &["lib/libfreetype.6.dylib"];
const FONTCONFIG_ITEMS: &[&str] = &["lib/libfontconfig.1.dylib"];
const PIXMAN_ITEMS: &[&str] = &["lib/libpixman-1.0.dylib"];
const LIBXCB_ITEMS: &[&str] = &[
    "lib/libxcb-shm.0.dylib",
    "lib/libxcb.1.dylib",
    "lib/libxcb-render.0.dylib",
];
const LIBX11_ITEMS: &[&str] = &["lib/libX11.6.dylib"];
const LIBXEXT_ITEMS: &[&str] = &["lib/libXext.6.dylib"];
const LIBXRENDER_ITEMS: &[&str] = &["lib/libXrender.1.dylib"];
const LIBXAU_ITEMS: &[&str] = &["lib/libXau.6.dylib"];
const LIBXDMCP_ITEMS: &[&str] = &["lib/libXdmcp.6.dylib"];
const DFU_UTIL_ITEMS: &[&str] = &["bin/dfu-util"];
const LIBUSB_ITEMS: &[&str] = &["lib/libusb-1.0.0.dylib"];

/// Unversioned library names some build systems expect to find.
const LIB_ALIASES: &[(&str, &str)] = &[
    ("libcairo.dylib", "libcairo.2.dylib"),
    ("libfreetype.dylib", "libfreetype.6.dylib"),
];

/// Packages for the Catalina (Intel-only) toolchain. Several registry
/// entries no longer carry Catalina bottles, so those are pinned to the
/// last published version and hash.
const CATALINA_PACKAGES: &[PackageSpec] = &[
    PackageSpec::registry("cairo", CAIRO_ITEMS),
    PackageSpec::pinned(
        "libpng",
        LIBPNG_ITEMS,
        "1.6.39",
        &[(
            Platform::Catalina,
            "13780286d987167f7e50aea65947e1460a6616d0f1b224b37f8351775eab72f3",
        )],
    ),
    PackageSpec::pinned(
        "freetype",
        FREETYPE_ITEMS,
        "2.12.1",
        &[(
            Platform::Catalina,
            "cafa6fee3a0ca54b1659f433667a145acef2c2d2061292d2f8bc088db7f0ea4f",
        )],
    ),
    PackageSpec::pinned(
        "fontconfig",
        FONTCONFIG_ITEMS,
        "2.14.1",
        &[(
            Platform::Catalina,
            "1d6767bcdcf4390f88c120ca0beff6104d3339880950342802ad8b4b51520a6e",
        )],
    ),
    PackageSpec::pinned(
        "pixman",
        PIXMAN_ITEMS,
        "0.40.0",
        &[(
            Platform::Catalina,
            "1862e6826a4bedb97af8dcb9ab849c69754226ed92e5ee19267fa33ee96f94f8",
        )],
    ),
    PackageSpec::pinned(
        "libxcb",
        LIBXCB_ITEMS,
        "1.15",
        &[(
            Platform::Catalina,
            "035b1d299e3f1b41581e759981cf9a83aee2754c4b744cdcad4c7fe32de83ffb",
        )],
    ),
    PackageSpec::pinned(
        "libx11",
        LIBX11_ITEMS,
        "1.8.2",
        &[(
            Platform::Catalina,
            "83b5c84a2f595ddb273b9eb9790109e542da3c21832df5cc6c90a1c328050389",
        )],
    ),
    PackageSpec::registry("libxext", LIBXEXT_ITEMS),
    PackageSpec::pinned(
        "libxrender",
        LIBXRENDER_ITEMS,
        "0.9.10",
        &[(
            Platform::Catalina,
            "cb7f48876d362f919ed1c34ece8ec5abb16f6e414a6119655e3948fffab5dfab",
        )],
    ),
    PackageSpec::pinned(
        "libxau",
        LIBXAU_ITEMS,
        "1.0.10",
        &[(
            Platform::Catalina,
            "1fc57a7cb97c7e4eecbd4b569070c36d12d9dd7f0d185a6513edf3fdc1b5696a",
        )],
    ),
    PackageSpec::pinned(
        "libxdmcp",
        LIBXDMCP_ITEMS,
        "1.1.3",
        &[(
            Platform::Catalina,
            "123c77fba2179591f3c1588808f33d231e9e04d8a91c99f6684d2c7eb64626b0",
        )],
    ),
    PackageSpec::registry("dfu-util", DFU_UTIL_ITEMS),
    PackageSpec::registry("libusb", LIBUSB_ITEMS),
];

/// Packages for the Big Sur universal toolchain, all resolved dynamically.
const BIG_SUR_PACKAGES: &[PackageSpec] = &[
    PackageSpec::registry("cairo", CAIRO_ITEMS),
    PackageSpec::registry("libpng", LIBPNG_ITEMS),
    PackageSpec::registry("freetype", FREETYPE_ITEMS),
    PackageSpec::registry("fontconfig", FONTCONFIG_ITEMS),
    PackageSpec::registry("pixman", PIXMAN_ITEMS),
    PackageSpec::registry("libxcb", LIBXCB_ITEMS),
    PackageSpec::registry("libx11", LIBX11_ITEMS),
    PackageSpec::registry("libxext", LIBXEXT_ITEMS),
    PackageSpec::registry("libxrender", LIBXRENDER_ITEMS),
    PackageSpec::registry("libxau", LIBXAU_ITEMS),
    PackageSpec::registry("libxdmcp", LIBXDMCP_ITEMS),
    PackageSpec::registry("dfu-util", DFU_UTIL_ITEMS),
    PackageSpec::registry("libusb", LIBUSB_ITEMS),
];

/// The full fixed build list, in build order.
pub const TARGETS: &[Target] = &[
    Target {
        label: "catalina",
        platforms: &[Platform::Catalina],
        policy: RelinkPolicy::Substitution,
        packages: CATALINA_PACKAGES,
        aliases: LIB_ALIASES,
    },
    Target {
        label: "big_sur",
        platforms: &[Platform::BigSur, Platform::Arm64BigSur],
        policy: RelinkPolicy::Substitution,
        packages: BIG_SUR_PACKAGES,
        aliases: LIB_ALIASES,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_bin() {
        assert_eq!(ArtifactKind::of("bin/dfu-util"), Some(ArtifactKind::Executable));
    }

    #[test]
    fn test_kind_of_lib() {
        assert_eq!(
            ArtifactKind::of("lib/libcairo.2.dylib"),
            Some(ArtifactKind::Library)
        );
    }

    #[test]
    fn test_kind_of_other() {
        assert_eq!(ArtifactKind::of("share/doc/README"), None);
    }

    #[test]
    fn test_item_filename() {
        assert_eq!(item_filename("lib/libcairo.2.dylib"), "libcairo.2.dylib");
        assert_eq!(item_filename("dfu-util"), "dfu-util");
    }

    #[test]
    fn test_targets_are_patchable() {
        // Every declared item must classify as bin or lib, otherwise it
        // would silently skip patching.
        for target in TARGETS {
            for pkg in target.packages {
                for item in pkg.items {
                    assert!(
                        ArtifactKind::of(item).is_some(),
                        "unpatchable item {item} in {}",
                        pkg.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_pinned_hashes_are_valid() {
        use crate::core::formula::FormulaSource;
        use crate::types::Sha256Hash;

        for target in TARGETS {
            for pkg in target.packages {
                if let FormulaSource::Pinned { sha256, .. } = pkg.source {
                    for (_, hash) in sha256 {
                        assert!(Sha256Hash::validated(hash).is_ok(), "bad pin in {}", pkg.name);
                    }
                }
            }
        }
    }
}
