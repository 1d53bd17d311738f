//! Atomic file replacement via tmp → rename
//!
//! Readers only ever see the previous complete file or the new complete
//! file. A crash mid-write leaves a `.tmp` sibling behind, which the next
//! writer removes.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary sibling used while `path` is being written (`name.ext.tmp`)
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("unnamed"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Remove a stale tmp file left by an interrupted write.
///
/// Returns `true` if a file was removed.
pub fn remove_stale_tmp(tmp: &Path) -> io::Result<bool> {
    match fs::remove_file(tmp) {
        Ok(()) => {
            log::warn!("Removing stale tmp file: {}", tmp.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Atomically move a fully written tmp file over its final path
pub fn commit(tmp: &Path, final_path: &Path) -> io::Result<()> {
    fs::rename(tmp, final_path)
}

/// Write `bytes` to `path` atomically: tmp write, fsync, rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = tmp_path(path);
    remove_stale_tmp(&tmp)?;

    let mut file = File::create(&tmp)?;
    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    drop(file);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    commit(&tmp, path)
}
