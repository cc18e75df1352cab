use std::fs;
use std::io;
use std::path::Path;

use crate::errors::SplitterError;

/// Read a whole source file, reporting missing or unreadable files as
/// `SourceUnavailable` for `source_id`.
pub fn read_source_text(source_id: &str, path: &Path) -> Result<String, SplitterError> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidData => {
            SplitterError::SourceUnavailable {
                source_id: source_id.to_string(),
                reason: format!("{}: {err}", path.display()),
            }
        }
        _ => SplitterError::Io(err),
    })
}

/// True if the path has the given extension (case-insensitive).
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
