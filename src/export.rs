//! Results export for organisers.

use std::borrow::Cow;

use chrono::SecondsFormat;

use crate::model::document::ContestDocument;

pub const CSV_HEADER: [&str; 7] = [
    "ID",
    "Name",
    "Costume Name",
    "Description",
    "Photo Count",
    "Votes",
    "Timestamp",
];

/// Render every entry with its tally as CSV (RFC 4180, CRLF line endings).
pub fn results_csv(doc: &ContestDocument) -> String {
    let mut out = String::new();
    write_row(&mut out, CSV_HEADER.iter().map(|field| Cow::Borrowed(*field)));
    for entry in &doc.entries {
        write_row(
            &mut out,
            [
                Cow::Borrowed(entry.id.as_str()),
                Cow::Borrowed(entry.name.as_str()),
                Cow::Borrowed(entry.costume_name.as_str()),
                Cow::Borrowed(entry.description.as_str()),
                Cow::Owned(entry.photos.len().to_string()),
                Cow::Owned(doc.vote_count(&entry.id).to_string()),
                Cow::Owned(
                    entry
                        .timestamp
                        .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                ),
            ],
        );
    }
    out
}

fn write_row<'a>(out: &mut String, fields: impl IntoIterator<Item = Cow<'a, str>>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote(&field));
    }
    out.push_str("\r\n");
}

/// Quote a field if it contains a delimiter, quote, or line break.
fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
