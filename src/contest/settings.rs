use log::info;

use crate::error::Result;
use crate::model::settings::{Settings, SettingsPatch};

use super::Contest;

impl Contest {
    /// Apply a partial settings update and return the settings now in force.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings> {
        let settings = self
            .store
            .mutate(|doc| Ok(doc.update_settings(patch)))
            .await?;
        info!(
            "Settings updated: voting_enabled={}, show_votes={}",
            settings.voting_enabled, settings.show_votes
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use crate::contest::test_support::temp_contest;

    use super::*;

    #[rocket::async_test]
    async fn partial_updates_accumulate() {
        let (_dir, contest) = temp_contest();

        let settings = contest
            .update_settings(SettingsPatch {
                show_votes: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            settings,
            Settings {
                show_votes: true,
                voting_enabled: true,
            }
        );

        contest
            .update_settings(SettingsPatch {
                voting_enabled: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        let stored = contest.document().await.unwrap().settings;
        assert_eq!(
            stored,
            Settings {
                show_votes: true,
                voting_enabled: false,
            }
        );
    }
}
