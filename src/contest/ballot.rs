use log::{debug, info};

use crate::error::Result;
use crate::model::ledger::BallotChange;

use super::Contest;

impl Contest {
    /// Cast `voter_id`'s ballot for `entry_id`, replacing any earlier ballot.
    ///
    /// Vote-only mutations are not backed up.
    pub async fn cast_vote(&self, entry_id: &str, voter_id: &str) -> Result<BallotChange> {
        let change = self
            .store
            .mutate(|doc| doc.cast_vote(entry_id, voter_id))
            .await?;
        match &change {
            BallotChange::New => info!("Ballot recorded for entry {}", entry_id.trim()),
            BallotChange::Moved { from } => {
                info!("Ballot moved from entry {from} to entry {}", entry_id.trim())
            }
            BallotChange::Unchanged => debug!("Repeat ballot for entry {}", entry_id.trim()),
        }
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use crate::contest::test_support::temp_contest;
    use crate::error::Error;
    use crate::model::{document::ContestDocument, settings::SettingsPatch};

    use super::*;

    #[rocket::async_test]
    async fn revote_replaces_earlier_ballot() {
        let (_dir, contest) = temp_contest();
        contest.store().save(&ContestDocument::example()).await.unwrap();

        contest.cast_vote("2", "v9").await.unwrap();
        contest.cast_vote("3", "v9").await.unwrap();

        let doc = contest.document().await.unwrap();
        assert!(!doc.votes.voters("2").any(|v| v == "v9"));
        assert!(doc.votes.voters("3").any(|v| v == "v9"));
        assert_eq!(doc.votes.choice_of("v9"), Some("3"));
    }

    #[rocket::async_test]
    async fn repeat_ballot_is_idempotent() {
        let (_dir, contest) = temp_contest();
        contest.store().save(&ContestDocument::example()).await.unwrap();

        contest.cast_vote("1", "v9").await.unwrap();
        let once = contest.document().await.unwrap();
        assert_eq!(
            contest.cast_vote("1", "v9").await.unwrap(),
            BallotChange::Unchanged
        );
        assert_eq!(contest.document().await.unwrap(), once);
        assert_eq!(once.vote_count("1"), 3);
    }

    #[rocket::async_test]
    async fn closed_voting_is_refused() {
        let (_dir, contest) = temp_contest();
        contest.store().save(&ContestDocument::example()).await.unwrap();
        contest
            .update_settings(SettingsPatch {
                voting_enabled: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        let before = contest.document().await.unwrap().votes;

        let result = contest.cast_vote("2", "v1").await;
        assert!(matches!(result, Err(Error::VotingClosed)));
        assert_eq!(contest.document().await.unwrap().votes, before);
    }

    #[rocket::async_test]
    async fn votes_are_not_backed_up() {
        let (_dir, contest) = temp_contest();
        contest.store().save(&ContestDocument::example()).await.unwrap();
        contest.cast_vote("1", "v9").await.unwrap();
        assert!(contest.backups().list().await.unwrap().is_empty());
    }
}
