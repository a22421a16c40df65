use std::path::{Path, PathBuf};

use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    figment::{providers::Env, Figment},
    fs::FileServer,
    tokio::fs,
    Build, Rocket,
};
use serde::Deserialize;

use crate::contest::Contest;
use crate::error::{Error, Result};

/// Application configuration, derived from `Rocket.toml`, `ROCKET_*`
/// environment variables, and the plain `DATA_DIR` / `PORT` variables that
/// hosting platforms set. This struct becomes managed state.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_backup_retention")]
    backup_retention: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_backup_retention() -> usize {
    10
}

impl Config {
    /// Base directory holding the document, uploads and backups.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// How many backups are kept.
    pub fn backup_retention(&self) -> usize {
        self.backup_retention
    }
}

/// Rocket's own configuration sources, plus the unprefixed environment
/// variables for the data directory and port.
pub fn figment() -> Figment {
    rocket::Config::figment().merge(Env::raw().only(&["DATA_DIR", "PORT"]).global())
}

/// Where everything lives under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub const DOCUMENT: &'static str = "contest_data.json";
    pub const UPLOADS: &'static str = "uploads";
    pub const BACKUPS: &'static str = "backups";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document(&self) -> PathBuf {
        self.root.join(Self::DOCUMENT)
    }

    pub fn uploads(&self) -> PathBuf {
        self.root.join(Self::UPLOADS)
    }

    pub fn backups(&self) -> PathBuf {
        self.root.join(Self::BACKUPS)
    }

    /// Create the upload and backup directories if missing.
    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.uploads(), self.backups()] {
            fs::create_dir_all(&dir)
                .await
                .map_err(Error::storage("creating data directories"))?;
        }
        Ok(())
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that prepares the data directory, checks the stored document is
/// readable, places the [`Contest`] into managed state, and serves uploaded
/// photos from `/uploads`.
///
/// Must be attached after [`ConfigFairing`].
pub struct ContestFairing;

#[rocket::async_trait]
impl Fairing for ContestFairing {
    fn info(&self) -> Info {
        Info {
            name: "Contest data",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let (layout, retention) = match rocket.state::<Config>() {
            Some(config) => (
                DataLayout::new(config.data_dir()),
                config.backup_retention(),
            ),
            None => {
                error!("Contest fairing ran before the config was loaded");
                return Err(rocket);
            }
        };
        info!("Using data directory {}", layout.root().display());

        if let Err(e) = layout.ensure_dirs().await {
            error!("Failed to prepare data directory: {e}");
            return Err(rocket);
        }

        // Refuse to launch over a document we cannot read.
        let contest = Contest::new(&layout, retention);
        match contest.document().await {
            Ok(doc) => info!(
                "Loaded contest document: {} entries, {} ballots, voting {}",
                doc.entries.len(),
                doc.votes.total(),
                if doc.settings.voting_enabled {
                    "open"
                } else {
                    "closed"
                }
            ),
            Err(e) => {
                error!("Failed to load contest document: {e}");
                return Err(rocket);
            }
        }

        rocket = rocket
            .manage(contest)
            .mount("/uploads", FileServer::from(layout.uploads()));
        Ok(rocket)
    }
}
