use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    entry::{Entry, EntrySpec},
    ledger::{BallotChange, VoteLedger},
    settings::{Settings, SettingsPatch},
};

/// The whole contest: the single unit that is loaded and saved.
///
/// Every field defaults when missing so that documents written by older
/// versions load without migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContestDocument {
    /// Entries in submission order.
    pub entries: Vec<Entry>,
    pub votes: VoteLedger,
    pub settings: Settings,
    /// Lower bound for the next entry ID. Never decreases.
    pub next_entry_id: u64,
}

impl ContestDocument {
    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn vote_count(&self, entry_id: &str) -> usize {
        self.votes.count(entry_id)
    }

    /// Reserve a fresh entry ID.
    ///
    /// For a document that only ever grew this is `entries.len() + 1`; the
    /// persisted counter and the highest existing numeric ID keep IDs unique
    /// even if entries are removed or the counter is missing.
    pub fn allocate_entry_id(&mut self) -> Result<String> {
        let highest = self
            .entries
            .iter()
            .filter_map(|entry| entry.id.parse::<u64>().ok())
            .max();
        let after_highest = match highest {
            Some(highest) => highest.checked_add(1).ok_or(Error::IdsExhausted)?,
            None => 1,
        };
        let by_count = self.entries.len() as u64 + 1;
        let id = self.next_entry_id.max(after_highest).max(by_count);
        self.next_entry_id = id.checked_add(1).ok_or(Error::IdsExhausted)?;
        Ok(id.to_string())
    }

    /// Append a validated entry with its already-stored photos.
    pub fn add_entry(
        &mut self,
        spec: EntrySpec,
        photos: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Entry> {
        let id = self.allocate_entry_id()?;
        let entry = spec.into_entry(id, photos, timestamp);
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Record a ballot, replacing any earlier ballot from the same voter.
    pub fn cast_vote(&mut self, entry_id: &str, voter_id: &str) -> Result<BallotChange> {
        let entry_id = entry_id.trim();
        let voter_id = voter_id.trim();
        if entry_id.is_empty() || voter_id.is_empty() {
            return Err(Error::validation("Entry ID and voter ID required"));
        }
        if !self.settings.voting_enabled {
            return Err(Error::VotingClosed);
        }
        if self.entry(entry_id).is_none() {
            return Err(Error::not_found(format!("Entry '{entry_id}'")));
        }
        Ok(self.votes.cast(entry_id, voter_id))
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Settings {
        self.settings.apply(patch)
    }
}

#[cfg(test)]
impl ContestDocument {
    /// Three entries, four ballots, voting open.
    pub fn example() -> Self {
        let mut doc = Self {
            entries: vec![
                Entry::example("1", "Mina"),
                Entry::example("2", "Jonathan"),
                Entry::example("3", "Lucy"),
            ],
            next_entry_id: 4,
            ..Default::default()
        };
        for (entry, voter) in [("1", "v1"), ("1", "v2"), ("2", "v3"), ("3", "v4")] {
            doc.votes.cast(entry, voter);
        }
        doc
    }
}
