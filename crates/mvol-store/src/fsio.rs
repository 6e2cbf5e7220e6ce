//! Small file helpers shared by the stores and the ledger.

use crate::error::StoreResult;
use std::ffi::OsString;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Read a whole file, treating a missing file as `None`.
pub(crate) fn read_if_exists(path: &Path) -> StoreResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write a whole file and flush it to disk before returning.
pub(crate) fn write_synced(path: &Path, contents: &str) -> StoreResult<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Remove a file, ignoring "not found".
pub(crate) fn remove_if_exists(path: &Path) -> StoreResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// `Markets.txt` -> `Markets.txt.staged`
pub(crate) fn staged_path(target: &Path) -> PathBuf {
    let mut name: OsString = target.as_os_str().to_owned();
    name.push(".staged");
    PathBuf::from(name)
}

/// Join lines with a trailing newline; no lines renders as an empty file.
pub(crate) fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line.as_ref());
        out.push('\n');
    }
    out
}
