use serde::{Deserialize, Serialize};

use crate::model::settings::Settings;

/// Response to a settings update, carrying the settings now in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdated {
    pub success: bool,
    pub settings: Settings,
}

impl From<Settings> for SettingsUpdated {
    fn from(settings: Settings) -> Self {
        Self {
            success: true,
            settings,
        }
    }
}

/// The retained backups, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupList {
    pub backups: Vec<String>,
    /// How many backups are kept before the oldest is pruned.
    pub retention: usize,
}
