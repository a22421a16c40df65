//! Persistence of the contest document and its backups.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use rocket::tokio::{fs, sync::Mutex};

use crate::error::{Error, Result};
use crate::model::document::ContestDocument;

mod atomic;
mod backup;

pub use atomic::atomic_write;
pub use backup::{BackupManager, BACKUP_PREFIX, BACKUP_SUFFIX};

/// The contest document on disk.
///
/// The document is always read and written whole. All writes go through an
/// internal lock, so a [`ContestStore::mutate`] sees the effect of every
/// mutation that completed before it and none are lost to interleaving.
#[derive(Debug)]
pub struct ContestStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ContestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document, or a default one if none has been saved yet.
    pub async fn load(&self) -> Result<ContestDocument> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No contest document at {}, using defaults", self.path.display());
                Ok(ContestDocument::default())
            }
            Err(e) => Err(Error::storage("reading contest document")(e)),
        }
    }

    /// Replace the stored document.
    pub async fn save(&self, doc: &ContestDocument) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(doc).await
    }

    /// Load, apply `f`, and save, holding the write lock throughout.
    ///
    /// If `f` fails nothing is written and its error is returned.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut ContestDocument) -> Result<T> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let output = f(&mut doc)?;
        self.write(&doc).await?;
        Ok(output)
    }

    async fn write(&self, doc: &ContestDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        atomic_write(&self.path, &bytes).await
    }
}
