use serde::{Deserialize, Serialize};

/// Contest-wide flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether vote counts should be shown on the results page.
    pub show_votes: bool,
    /// Whether ballots are currently accepted.
    pub voting_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_votes: false,
            voting_enabled: true,
        }
    }
}

/// A partial update to [`Settings`]. Absent fields are left unchanged.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_votes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_enabled: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.show_votes.is_none() && self.voting_enabled.is_none()
    }
}

impl Settings {
    /// Apply only the fields present in `patch`, returning the resulting settings.
    pub fn apply(&mut self, patch: SettingsPatch) -> Settings {
        if let Some(show_votes) = patch.show_votes {
            self.show_votes = show_votes;
        }
        if let Some(voting_enabled) = patch.voting_enabled {
            self.voting_enabled = voting_enabled;
        }
        *self
    }
}
