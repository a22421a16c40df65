use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

/// A ballot the voter wishes to cast.
///
/// Both fields are optional on the wire so that a missing field is reported
/// as a validation error rather than a malformed body. Either may be sent as
/// a JSON number, which is read as its decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotSpec {
    #[serde(default, deserialize_with = "text_or_number")]
    pub entry_id: Option<String>,
    /// Client-chosen identifier, e.g. a browser session ID or the voter's name.
    #[serde(default, deserialize_with = "text_or_number")]
    pub voter_id: Option<String>,
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(Number),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    }))
}

impl BallotSpec {
    pub fn new(entry_id: &str, voter_id: &str) -> Self {
        Self {
            entry_id: Some(entry_id.to_string()),
            voter_id: Some(voter_id.to_string()),
        }
    }
}

/// Acknowledgement for a mutation that returns no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Success = Success { success: true };
}
