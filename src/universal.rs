//! Universal binary packaging
//!
//! Collapses the per-platform variants of one artifact into a single output
//! file: a direct copy when only one variant exists, a `lipo -create` fat
//! binary when two do. Any other variant count is rejected.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::tools::{ToolError, ToolRunner};

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported variant count: {0}")]
    UnsupportedVariantCount(usize),
}

/// Produce one output binary from the patched per-platform variants.
pub fn merge(
    runner: &dyn ToolRunner,
    variants: &[PathBuf],
    dest: &Path,
) -> Result<(), MergeError> {
    match variants {
        [single] => {
            fs::copy(single, dest)?;
            Ok(())
        }
        [_, _] => {
            let mut args: Vec<OsString> = variants.iter().map(Into::into).collect();
            args.push("-output".into());
            args.push(dest.into());
            args.push("-create".into());
            runner.run("lipo", &args)?;
            Ok(())
        }
        other => Err(MergeError::UnsupportedVariantCount(other.len())),
    }
}
