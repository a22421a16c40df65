use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A contest entry as stored in the contest document.
///
/// Every field defaults when missing, so one incomplete entry never makes the
/// whole document unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub costume_name: String,
    #[serde(default)]
    pub description: String,
    /// Stored filenames in the uploads directory, in upload order.
    /// Older documents carried a single `photo` string instead.
    #[serde(default, alias = "photo", deserialize_with = "one_or_many")]
    pub photos: Vec<String>,
    /// The Unix epoch when missing.
    #[serde(default = "unknown_timestamp", with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// The caller-supplied text of a new entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpec {
    pub name: String,
    pub costume_name: String,
    #[serde(default)]
    pub description: String,
}

impl EntrySpec {
    /// Trim all fields, rejecting the entry if a required field is blank.
    pub fn validated(self) -> Result<Self> {
        let spec = Self {
            name: self.name.trim().to_string(),
            costume_name: self.costume_name.trim().to_string(),
            description: self.description.trim().to_string(),
        };
        if spec.name.is_empty() || spec.costume_name.is_empty() {
            return Err(Error::validation("Name and costume name are required"));
        }
        Ok(spec)
    }

    pub fn into_entry(
        self,
        id: String,
        photos: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Entry {
        Entry {
            id,
            name: self.name,
            costume_name: self.costume_name,
            description: self.description,
            photos,
            timestamp,
        }
    }
}

fn unknown_timestamp() -> DateTime<Utc> {
    DateTime::<Utc>::from(std::time::UNIX_EPOCH)
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(photo) if photo.is_empty() => Vec::new(),
        OneOrMany::One(photo) => vec![photo],
        OneOrMany::Many(photos) => photos,
    })
}

/// RFC 3339 timestamps, also accepting the offset-less ISO-8601 form that
/// older documents were written with (read as UTC).
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
impl Entry {
    pub fn example(id: &str, name: &str) -> Self {
        use chrono::TimeZone;

        Self {
            id: id.to_string(),
            name: name.to_string(),
            costume_name: format!("{name}'s costume"),
            description: String::new(),
            photos: vec![format!("20241031_190000_00000000_0_{name}.png")],
            timestamp: Utc.with_ymd_and_hms(2024, 10, 31, 19, 0, 0).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        let spec = EntrySpec {
            name: "   ".to_string(),
            costume_name: "Dracula".to_string(),
            description: String::new(),
        };
        assert!(matches!(spec.validated(), Err(Error::Validation(_))));

        let spec = EntrySpec {
            name: "Mina".to_string(),
            costume_name: "\t\n".to_string(),
            description: String::new(),
        };
        assert!(matches!(spec.validated(), Err(Error::Validation(_))));
    }

    #[test]
    fn fields_are_trimmed() {
        let spec = EntrySpec {
            name: "  Mina ".to_string(),
            costume_name: " Dracula".to_string(),
            description: " Fangs and a cape \n".to_string(),
        }
        .validated()
        .unwrap();
        assert_eq!(spec.name, "Mina");
        assert_eq!(spec.costume_name, "Dracula");
        assert_eq!(spec.description, "Fangs and a cape");
    }

    #[test]
    fn reads_legacy_entries() {
        let entry: Entry = serde_json::from_str(
            r#"{
                "id": "3",
                "name": "Jon",
                "costume_name": "Scarecrow",
                "photo": "20231031_201500_scarecrow.jpg",
                "timestamp": "2023-10-31T20:15:00.123456"
            }"#,
        )
        .unwrap();
        assert_eq!(entry.description, "");
        assert_eq!(entry.photos, vec!["20231031_201500_scarecrow.jpg"]);
        assert_eq!(
            entry.timestamp,
            Utc.with_ymd_and_hms(2023, 10, 31, 20, 15, 0).unwrap()
                + chrono::Duration::microseconds(123456)
        );
    }

    #[test]
    fn missing_fields_default() {
        let entry: Entry = serde_json::from_str(
            r#"{"id": "1", "name": "A", "costume_name": "B", "photos": ["x.png"]}"#,
        )
        .unwrap();
        assert_eq!(entry.timestamp, Utc.timestamp_opt(0, 0).unwrap());
        assert_eq!(entry.photos, vec!["x.png"]);

        let entry: Entry = serde_json::from_str("{}").unwrap();
        assert_eq!(entry.id, "");
        assert_eq!(entry.name, "");
        assert_eq!(entry.costume_name, "");
        assert!(entry.photos.is_empty());
    }

    #[test]
    fn timestamp_round_trip_is_stable() {
        let entry = Entry::example("1", "Mina");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""timestamp":"2024-10-31T19:00:00Z""#));
        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
    }
}
