//! Blocking file helpers shared by the file-backed adapters.
//! Call these from `spawn_blocking`.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::StoreError;

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// `checkpoint.json` -> `checkpoint.json.lock`
pub(crate) fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Take the advisory lock guarding `path` without waiting.
/// The lock is held until the returned handle is dropped.
pub(crate) fn try_lock(path: &Path) -> Result<File, StoreError> {
    let lock_path = lock_path(path);
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| io_error(&lock_path, e))?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(file),
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
            Err(StoreError::Locked(path.display().to_string()))
        }
        Err(e) => Err(io_error(&lock_path, e)),
    }
}

/// File contents, or `None` if it does not exist yet.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}

/// Atomic write using temp file and rename.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).map_err(|e| io_error(&temp_path, e))?;
    file.write_all(content.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| io_error(&temp_path, e))?;
    drop(file);
    fs::rename(&temp_path, path).map_err(|e| io_error(path, e))
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::Join(e.to_string())
}
