//! Whole-file replacement that never leaves a partially written target.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use rocket::tokio::{fs, io::AsyncWriteExt};

use crate::error::{Error, Result};

/// Atomically replace `target` with `content`.
///
/// The bytes go to a sibling temp file which is synced and then renamed over
/// the target, so readers see either the old file or the new one. The
/// containing directory is synced after the rename.
pub async fn atomic_write(target: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(Error::storage("creating data directory"))?;
    }

    let temp_path = temp_path_for(target);
    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(Error::storage("creating temp file"))?;
    file.write_all(content)
        .await
        .map_err(Error::storage("writing temp file"))?;
    file.sync_all()
        .await
        .map_err(Error::storage("syncing temp file"))?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, target).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(Error::storage("replacing file")(e));
    }
    sync_parent(target).await
}

/// Flush the directory entry created by the rename.
#[cfg(unix)]
async fn sync_parent(target: &Path) -> Result<()> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::File::open(parent)
        .await
        .map_err(Error::storage("opening data directory"))?
        .sync_all()
        .await
        .map_err(Error::storage("syncing data directory"))
}

/// Directories cannot be opened for syncing here; the rename is as durable
/// as the platform makes it.
#[cfg(not(unix))]
async fn sync_parent(_target: &Path) -> Result<()> {
    Ok(())
}

/// `<target>.tmp`, in the same directory so the rename stays on one filesystem.
pub fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}
