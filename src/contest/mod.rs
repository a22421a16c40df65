//! The contest service: the operations every endpoint is built from.
//!
//! Each mutating operation is one load-mutate-save cycle on the
//! [`ContestStore`], which serialises them.

use std::path::{Path, PathBuf};

use log::error;

use crate::config::DataLayout;
use crate::error::Result;
use crate::model::{api::entry::EntryListing, document::ContestDocument};
use crate::store::{BackupManager, ContestStore};

mod ballot;
mod registry;
mod settings;

/// Managed state shared by all requests.
#[derive(Debug)]
pub struct Contest {
    store: ContestStore,
    backups: BackupManager,
    uploads: PathBuf,
}

impl Contest {
    pub fn new(layout: &DataLayout, backup_retention: usize) -> Self {
        Self {
            store: ContestStore::new(layout.document()),
            backups: BackupManager::new(layout.document(), layout.backups(), backup_retention),
            uploads: layout.uploads(),
        }
    }

    pub fn store(&self) -> &ContestStore {
        &self.store
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads
    }

    /// The full stored document.
    pub async fn document(&self) -> Result<ContestDocument> {
        self.store.load().await
    }

    /// Every entry with its tally, plus the settings.
    pub async fn listing(&self) -> Result<EntryListing> {
        Ok(self.store.load().await?.into())
    }

    /// Take a backup; failures are logged and never reach the caller.
    async fn backup(&self) {
        if let Err(e) = self.backups.snapshot().await {
            error!("Backup failed: {e}");
        }
    }
}
