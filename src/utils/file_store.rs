//! Filesystem helpers for persisting captured data (cookies, responses).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error_handling::FileStoreError;

fn io_error(path: &Path, source: std::io::Error) -> FileStoreError {
    FileStoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> FileStoreError {
    FileStoreError::Json {
        path: path.display().to_string(),
        source,
    }
}

/// Whether anything exists at `path`.
pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

pub fn read(path: impl AsRef<Path>) -> Result<Vec<u8>, FileStoreError> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| io_error(path, e))
}

/// Reads and deserializes a JSON file.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, FileStoreError> {
    let path = path.as_ref();
    let data = read(path)?;
    serde_json::from_slice(&data).map_err(|e| json_error(path, e))
}

/// Writes `data`, replacing any existing file.
pub fn write(path: impl AsRef<Path>, data: &[u8]) -> Result<(), FileStoreError> {
    let path = path.as_ref();
    fs::write(path, data).map_err(|e| io_error(path, e))
}

/// Serializes `value` as pretty-printed JSON and writes it.
pub fn write_json<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
) -> Result<(), FileStoreError> {
    let path = path.as_ref();
    let data = serde_json::to_vec_pretty(value).map_err(|e| json_error(path, e))?;
    write(path, &data)
}

/// Removes a file or a directory tree. Missing paths are not an error.
pub fn remove(path: impl AsRef<Path>) -> Result<(), FileStoreError> {
    let path = path.as_ref();
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(io_error(path, e)),
        _ => Ok(()),
    }
}

/// Creates `path` and all missing parents.
pub fn mkdir(path: impl AsRef<Path>) -> Result<(), FileStoreError> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| io_error(path, e))
}

/// Appends `line` plus a newline, creating the file if needed.
pub fn append_line(path: impl AsRef<Path>, line: &str) -> Result<(), FileStoreError> {
    let path = path.as_ref();
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    writeln!(file, "{line}").map_err(|e| io_error(path, e))
}

/// Splits a file name into stem and extension (with its dot).
///
/// `"archive.tar.gz"` gives `("archive.tar", ".gz")`; a name without a dot
/// gives an empty extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Directory containing the running executable.
pub fn root_path() -> Result<PathBuf, FileStoreError> {
    let exe = std::env::current_exe().map_err(|e| io_error(Path::new("<current_exe>"), e))?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}
