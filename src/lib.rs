//! unibottle - universal toolchain bottler
//!
//! Builds a distributable macOS toolchain out of prebuilt registry bottles.
//! One fixed, declarative manifest drives a linear pipeline per package:
//!
//! 1. **Resolve** version + per-platform content hashes (registry API or
//!    pinned override)
//! 2. **Fetch** each content-addressed bottle blob (authenticated, streamed,
//!    digest-verified)
//! 3. **Extract** into per-platform staging directories
//! 4. **Patch** staged binaries to be relocatable (permissions, install-name
//!    identity, dependency rewriting)
//! 5. **Merge** platform variants into a universal binary (or copy directly)
//! 6. **Archive** the output directory as `toolchain_<label>.tar.gz`
//!
//! Execution is strictly sequential and fail-fast: there is no retry, no
//! parallelism, and no partial-success mode.
//!
//! # Directory Layout
//!
//! ```text
//! <root>/
//! ├── artifacts/
//! │   ├── <sha256>.tar                        # raw downloaded blobs
//! │   ├── <platform>/<pkg>/<version>/<item>   # staged per-variant files
//! │   └── toolchain_<label>.tar.gz            # final archives
//! └── bin/                                    # merged universal outputs
//! ```

pub mod core;
pub mod io;
pub mod ops;
pub mod registry;
pub mod relink;
pub mod tools;
pub mod types;
pub mod universal;

// Re-exports for convenience
pub use crate::core::layout::Layout;
pub use crate::core::manifest;
pub use crate::ops::{select_targets, Builder};

/// User Agent string
pub const USER_AGENT: &str = concat!("unibottle/", env!("CARGO_PKG_VERSION"));
