//! Repository Snapshotter (C1).
//!
//! Produces a single deterministic textual blob of the working tree for LLM
//! context: a sorted walk, explicit ignore lists, one size cap.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How an oversized file is represented in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OversizePolicy {
    /// Include the file, truncated to the cap, with a trailing marker.
    Truncate,
    /// Omit the file body entirely; the path still appears with a marker.
    Skip,
}

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub ignore_dirs: Vec<String>,
    pub ignore_files: Vec<String>,
    pub size_cap_bytes: usize,
    pub oversize_policy: OversizePolicy,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            ignore_dirs: default_ignore_dirs(),
            ignore_files: default_ignore_files(),
            size_cap_bytes: 20_000,
            oversize_policy: OversizePolicy::Truncate,
        }
    }
}

fn default_ignore_dirs() -> Vec<String> {
    [
        ".git",
        "node_modules",
        "target",
        "dist",
        "build",
        ".next",
        ".cache",
        ".othala",
        ".turbo",
        "vendor",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_ignore_files() -> Vec<String> {
    [
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "Cargo.lock",
        "poetry.lock",
        "Gemfile.lock",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const TRUNCATION_MARKER: &str = "\n[... truncated: file exceeds snapshot size cap ...]\n";
const SKIPPED_MARKER: &str = "[skipped: file exceeds snapshot size cap]";

/// Produce the textual snapshot blob for `root`.
///
/// Deterministic given the working tree: entries are visited in sorted
/// order at every directory level.
pub fn capture_snapshot(root: &Path, options: &SnapshotOptions) -> Result<String, SnapshotError> {
    let mut entries = Vec::new();
    walk(root, root, options, &mut entries)?;
    entries.sort();

    let mut out = String::new();
    for rel_path in entries {
        let full_path = root.join(&rel_path);
        let body = render_file(&full_path, options)?;
        out.push_str(&rel_path.to_string_lossy());
        out.push_str("\n---\n");
        out.push_str(&body);
        out.push_str("\n\n");
    }
    Ok(out)
}

fn walk(
    root: &Path,
    dir: &Path,
    options: &SnapshotOptions,
    entries: &mut Vec<PathBuf>,
) -> Result<(), SnapshotError> {
    let read_dir = std::fs::read_dir(dir).map_err(|source| SnapshotError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in read_dir {
        let entry = entry.map_err(|source| SnapshotError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let file_type = entry.file_type().map_err(|source| SnapshotError::Io {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            if options.ignore_dirs.iter().any(|d| d == &name) {
                continue;
            }
            walk(root, &path, options, entries)?;
        } else if file_type.is_file() {
            if options.ignore_files.iter().any(|f| f == &name) {
                continue;
            }
            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_path_buf();
            entries.push(rel);
        }
    }
    Ok(())
}

fn render_file(path: &Path, options: &SnapshotOptions) -> Result<String, SnapshotError> {
    let bytes = std::fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.len() <= options.size_cap_bytes {
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    match options.oversize_policy {
        OversizePolicy::Truncate => {
            let mut truncated = String::from_utf8_lossy(&bytes[..options.size_cap_bytes]).into_owned();
            truncated.push_str(TRUNCATION_MARKER);
            Ok(truncated)
        }
        OversizePolicy::Skip => Ok(SKIPPED_MARKER.to_string()),
    }
}
