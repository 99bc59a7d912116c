//! File discovery for the configuration pipeline.
//!
//! Structured files (by extension) are parsed as YAML documents; every other
//! file is an opaque single value, the way orchestrators mount config maps and
//! secrets.

use std::io;
use std::path::{Path, PathBuf};

/// How a discovered file contributes to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Parsed as a YAML document and merged structurally
    Structured,
    /// Whole content becomes one leaf keyed by the file name
    Opaque,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Structured => write!(f, "structured"),
            FileKind::Opaque => write!(f, "opaque"),
        }
    }
}

impl FileKind {
    /// Classify `path` by its extension. `extensions` carry the leading dot.
    pub fn of(path: &Path, extensions: &[String]) -> Self {
        let matches = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .is_some_and(|ext| extensions.iter().any(|known| *known == ext));
        if matches {
            FileKind::Structured
        } else {
            FileKind::Opaque
        }
    }
}

/// List the regular files directly inside `dir`, sorted by file name.
///
/// Symlinks are followed, so orchestrator-mounted entries count as files
/// while their `..data` directory links do not.
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Find the first `<base_name><extension>` file.
///
/// Directories are tried in order, and within each directory the extensions
/// in order.
pub fn find_local_file(
    search_dirs: &[PathBuf],
    base_name: &str,
    extensions: &[String],
) -> Option<PathBuf> {
    search_dirs
        .iter()
        .flat_map(|dir| {
            extensions
                .iter()
                .map(move |ext| dir.join(format!("{}{}", base_name, ext)))
        })
        .find(|candidate| candidate.is_file())
}
