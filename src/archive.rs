use crate::error::UpdateError;
use flate2::read::GzDecoder;
use fs_err as fs;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tar::Archive;
use walkdir::WalkDir;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub extracted: usize,
    pub skipped: usize,
}

fn open_tar(path: &Path) -> std::io::Result<Archive<Box<dyn Read>>> {
    let mut reader = BufReader::new(fs::File::open(path)?);
    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    let inner: Box<dyn Read> = if gzipped {
        Box::new(GzDecoder::new(reader))
    } else {
        Box::new(reader)
    };
    Ok(Archive::new(inner))
}

/// Unpacks every entry of `archive` into `dest` except those whose path
/// contains `exclusion`. An empty exclusion skips nothing.
pub fn extract_tar(
    archive: &Path,
    exclusion: &str,
    dest: &Path,
) -> Result<ExtractSummary, UpdateError> {
    let wrap = |source: std::io::Error| UpdateError::Extract {
        archive: archive.display().to_string(),
        source,
    };
    fs::create_dir_all(dest).map_err(wrap)?;
    let mut tar = open_tar(archive).map_err(wrap)?;
    let mut summary = ExtractSummary::default();
    for entry in tar.entries().map_err(wrap)? {
        let mut e = entry.map_err(wrap)?;
        let name = String::from_utf8_lossy(&e.path_bytes()).into_owned();
        if !exclusion.is_empty() && name.contains(exclusion) {
            tracing::debug!(entry = %name, "excluded");
            summary.skipped += 1;
            continue;
        }
        if e.unpack_in(dest).map_err(wrap)? {
            summary.extracted += 1;
        } else {
            tracing::warn!(entry = %name, "entry points outside destination, skipped");
            summary.skipped += 1;
        }
    }
    Ok(summary)
}

/// Copies the tree under `src` onto `dst`. Same-path files are overwritten,
/// existing directories are merged, anything only in `dst` is left alone.
/// Returns the number of files copied.
pub fn overlay_dir(src: &Path, dst: &Path) -> Result<usize, UpdateError> {
    let wrap = |path: &Path| {
        let path = path.display().to_string();
        move |source: std::io::Error| UpdateError::Overlay { path, source }
    };
    if !src.is_dir() {
        return Err(wrap(src)(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing from the extracted archive",
        )));
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            wrap(&path)(e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| wrap(entry.path())(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(wrap(&target))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(wrap(parent))?;
            }
            fs::copy(entry.path(), &target).map_err(wrap(&target))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Deletes the staging tree and the downloaded archive.
pub fn remove_temporaries(staging: &Path, archive: &Path) -> Result<(), UpdateError> {
    fs::remove_dir_all(staging).map_err(|source| UpdateError::Cleanup { source })?;
    fs::remove_file(archive).map_err(|source| UpdateError::Cleanup { source })?;
    Ok(())
}
