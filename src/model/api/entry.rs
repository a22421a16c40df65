use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::model::{document::ContestDocument, entry::Entry, settings::Settings};

/// An entry together with its current tally. The tally is derived from the
/// vote ledger on every read and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryWithVotes {
    #[serde(flatten)]
    pub entry: Entry,
    pub vote_count: usize,
}

impl Deref for EntryWithVotes {
    type Target = Entry;

    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}

/// The public read model: every entry with its tally, plus the settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryListing {
    pub entries: Vec<EntryWithVotes>,
    pub settings: Settings,
}

impl From<ContestDocument> for EntryListing {
    fn from(doc: ContestDocument) -> Self {
        let votes = doc.votes;
        let entries = doc
            .entries
            .into_iter()
            .map(|entry| {
                let vote_count = votes.count(&entry.id);
                EntryWithVotes { entry, vote_count }
            })
            .collect();
        Self {
            entries,
            settings: doc.settings,
        }
    }
}

/// Response to a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySubmitted {
    pub success: bool,
    pub entry: Entry,
}

impl From<Entry> for EntrySubmitted {
    fn from(entry: Entry) -> Self {
        Self {
            success: true,
            entry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_tallies_each_entry() {
        let listing = EntryListing::from(ContestDocument::example());
        let counts: Vec<(&str, usize)> = listing
            .entries
            .iter()
            .map(|e| (e.id.as_str(), e.vote_count))
            .collect();
        assert_eq!(counts, vec![("1", 2), ("2", 1), ("3", 1)]);
        assert!(listing.settings.voting_enabled);
    }

    #[test]
    fn vote_count_is_flattened_into_entry() {
        let listing = EntryListing::from(ContestDocument::example());
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["entries"][0]["id"], "1");
        assert_eq!(json["entries"][0]["vote_count"], 2);
        assert_eq!(json["settings"]["show_votes"], false);
    }
}
