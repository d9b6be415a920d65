//! Typed-tree file loading.
//!
//! The semantic analyzer writes one JSON document per source file. This
//! module finds and parses them.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::nodes::SourceFile;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum FileError {
    /// File or directory not found.
    #[error("file not found: {path}")]
    NotFound { path: String },

    /// A document that is not a typed tree.
    #[error("malformed typed tree {path}: {message}")]
    Parse { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type FileResult<T> = Result<T, FileError>;

// ============================================================================
// Loading
// ============================================================================

/// Parse one typed-tree document.
pub fn load_tree(path: &Path) -> FileResult<SourceFile> {
    if !path.is_file() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    parse_tree(&content, &path.display().to_string())
}

/// Parse typed-tree JSON; `origin` names the document in errors.
pub fn parse_tree(content: &str, origin: &str) -> FileResult<SourceFile> {
    serde_json::from_str(content).map_err(|e| FileError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

/// Load every `*.json` typed tree below `dir`, sorted by path.
///
/// Hidden directories are skipped.
pub fn load_trees(dir: &Path) -> FileResult<Vec<SourceFile>> {
    if !dir.is_dir() {
        return Err(FileError::NotFound {
            path: dir.display().to_string(),
        });
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let Ok(rel_path) = path.strip_prefix(dir) else {
            continue;
        };
        if rel_path
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            continue;
        }
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    let mut trees = Vec::with_capacity(paths.len());
    for path in &paths {
        trees.push(load_tree(path)?);
    }
    debug!(count = trees.len(), dir = %dir.display(), "loaded typed trees");
    Ok(trees)
}

// ============================================================================
// Tests
// ============================================================================
