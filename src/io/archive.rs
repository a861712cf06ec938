//! Final toolchain archive
//!
//! Compresses the merged output directory into a single distributable
//! `.tar.gz`, stored under the member name `bin` so consumers unpack into a
//! predictable layout.

use std::fs::File;
use std::io;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

/// Create a gzip-compressed tar of `src_dir` at `dest`, with all entries
/// rooted under `member_name`.
pub fn compress_dir(src_dir: &Path, member_name: &str, dest: &Path) -> io::Result<()> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    // Alias symlinks must stay symlinks in the archive.
    builder.follow_symlinks(false);
    builder.append_dir_all(member_name, src_dir)?;

    let encoder = builder.into_inner()?;
    encoder.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_compress_dir_roundtrip() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir(&bin).unwrap();
        fs::write(bin.join("libcairo.2.dylib"), b"fat binary").unwrap();
        fs::write(bin.join("dfu-util"), b"tool").unwrap();

        let dest = dir.path().join("toolchain_test.tar.gz");
        compress_dir(&bin, "bin", &dest).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&dest).unwrap()));
        let names: BTreeSet<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().display().to_string())
            .collect();

        assert!(names.contains("bin/libcairo.2.dylib"));
        assert!(names.contains("bin/dfu-util"));
    }

    #[test]
    fn test_compress_dir_preserves_symlinks() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir(&bin).unwrap();
        fs::write(bin.join("libcairo.2.dylib"), b"fat binary").unwrap();
        std::os::unix::fs::symlink("libcairo.2.dylib", bin.join("libcairo.dylib")).unwrap();

        let dest = dir.path().join("toolchain_test.tar.gz");
        compress_dir(&bin, "bin", &dest).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&dest).unwrap()));
        let mut found_link = false;
        for entry in archive.entries().unwrap() {
            let entry = entry.unwrap();
            if entry.path().unwrap().ends_with("libcairo.dylib") {
                assert!(entry.header().entry_type().is_symlink());
                found_link = true;
            }
        }
        assert!(found_link);
    }
}
