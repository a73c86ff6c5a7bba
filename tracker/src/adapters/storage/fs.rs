use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::PersistenceError;

/// Write `contents` to a sibling temp file, then rename it over `path`.
///
/// Readers never observe a half-written file.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PersistenceError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, contents)
        .await
        .map_err(|e| PersistenceError::io(&tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| PersistenceError::io(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
