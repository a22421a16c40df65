use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use rocket::tokio::{fs, sync::Mutex};

use crate::error::{Error, Result};

use super::atomic::atomic_write;

pub const BACKUP_PREFIX: &str = "contest_backup_";
pub const BACKUP_SUFFIX: &str = ".json";

/// Timestamped copies of the contest document with bounded retention.
///
/// Backup names embed a fixed-width UTC timestamp, so lexicographic order is
/// chronological order.
#[derive(Debug)]
pub struct BackupManager {
    source: PathBuf,
    dir: PathBuf,
    retention: usize,
    lock: Mutex<()>,
}

impl BackupManager {
    pub fn new(source: impl Into<PathBuf>, dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            source: source.into(),
            dir: dir.into(),
            retention,
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// The backup filename for a snapshot taken at `at`.
    pub fn backup_name(at: DateTime<Utc>) -> String {
        format!(
            "{BACKUP_PREFIX}{}{BACKUP_SUFFIX}",
            at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Copy the current document into the backup directory and prune old
    /// backups. Returns `None` if there is no document yet.
    pub async fn snapshot(&self) -> Result<Option<PathBuf>> {
        self.snapshot_at(Utc::now()).await
    }

    /// As [`BackupManager::snapshot`], tagged with the given time. A second
    /// snapshot within the same second replaces the first.
    pub async fn snapshot_at(&self, at: DateTime<Utc>) -> Result<Option<PathBuf>> {
        let _guard = self.lock.lock().await;

        let contents = match fs::read(&self.source).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No contest document yet; skipping backup");
                return Ok(None);
            }
            Err(e) => return Err(Error::storage("reading contest document for backup")(e)),
        };

        let path = self.dir.join(Self::backup_name(at));
        atomic_write(&path, &contents).await?;
        let pruned = self.prune().await?;
        info!(
            "Backed up contest document to {} (pruned {pruned} old backups)",
            path.display()
        );
        Ok(Some(path))
    }

    /// Names of the retained backups, oldest first.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::storage("listing backups")(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(Error::storage("listing backups"))?
        {
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete all but the newest `retention` backups.
    async fn prune(&self) -> Result<usize> {
        let names = self.list().await?;
        let excess = names.len().saturating_sub(self.retention);
        for name in &names[..excess] {
            fs::remove_file(self.dir.join(name))
                .await
                .map_err(Error::storage("pruning old backup"))?;
        }
        Ok(excess)
    }
}
