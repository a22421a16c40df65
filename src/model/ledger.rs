use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The live ballots: for each entry ID, the set of voters currently backing it.
///
/// A voter appears in at most one set. Ordered collections keep the
/// serialised form deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteLedger(BTreeMap<String, BTreeSet<String>>);

/// What happened to a voter's ballot when they voted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BallotChange {
    /// The voter had no live ballot before.
    New,
    /// The voter already backed this entry; nothing changed.
    Unchanged,
    /// The voter's ballot moved away from the given entry.
    Moved { from: String },
}

impl VoteLedger {
    /// Record `voter_id` as backing `entry_id`, removing any ballot they cast before.
    pub fn cast(&mut self, entry_id: &str, voter_id: &str) -> BallotChange {
        let mut previous = None;
        let mut already_cast = false;
        for (eid, voters) in self.0.iter_mut() {
            if eid == entry_id {
                already_cast = voters.contains(voter_id);
            } else if voters.remove(voter_id) {
                previous = Some(eid.clone());
            }
        }
        self.0.retain(|_, voters| !voters.is_empty());

        self.0
            .entry(entry_id.to_string())
            .or_default()
            .insert(voter_id.to_string());

        match (previous, already_cast) {
            (Some(from), _) => BallotChange::Moved { from },
            (None, true) => BallotChange::Unchanged,
            (None, false) => BallotChange::New,
        }
    }

    /// Number of live ballots for an entry.
    pub fn count(&self, entry_id: &str) -> usize {
        self.0.get(entry_id).map_or(0, BTreeSet::len)
    }

    pub fn voters<'a>(&'a self, entry_id: &str) -> impl Iterator<Item = &'a str> {
        self.0
            .get(entry_id)
            .into_iter()
            .flat_map(|voters| voters.iter().map(String::as_str))
    }

    /// The entry a voter currently backs, if any.
    pub fn choice_of(&self, voter_id: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, voters)| voters.contains(voter_id))
            .map(|(eid, _)| eid.as_str())
    }

    /// Total number of live ballots across all entries.
    pub fn total(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn entry_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
