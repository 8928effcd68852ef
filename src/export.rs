//! Writing finished Markdown to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

/// File name used when the output path is a directory.
pub const README_FILE_NAME: &str = "README.md";

/// MIME type for exported documents.
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Resolves the file to write: a directory gets `README.md` appended.
pub fn resolve_output_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(README_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

/// Writes `markdown` to `path`, creating parent directories as needed.
///
/// Returns the path actually written.
pub fn write_readme(path: &Path, markdown: &str) -> io::Result<PathBuf> {
    let target = resolve_output_path(path);
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, markdown)?;
    info!(path = ?target, bytes = markdown.len(), mime = MARKDOWN_MIME, "readme_written");
    Ok(target)
}
