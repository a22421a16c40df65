use rocket::{form::Form, fs::TempFile, serde::json::Json, Route, State};

use crate::contest::Contest;
use crate::error::Result;
use crate::model::{api::entry::EntrySubmitted, entry::EntrySpec};

pub fn routes() -> Vec<Route> {
    routes![submit_entry]
}

/// The multipart submission form. Every field is optional here so that
/// missing ones are reported by validation with a useful message.
#[derive(Debug, FromForm)]
struct Submission<'r> {
    name: Option<String>,
    costume_name: Option<String>,
    description: Option<String>,
    photos: Vec<TempFile<'r>>,
}

#[post("/api/submit", data = "<submission>")]
async fn submit_entry(
    mut submission: Form<Submission<'_>>,
    contest: &State<Contest>,
) -> Result<Json<EntrySubmitted>> {
    let spec = EntrySpec {
        name: submission.name.take().unwrap_or_default(),
        costume_name: submission.costume_name.take().unwrap_or_default(),
        description: submission.description.take().unwrap_or_default(),
    };
    let entry = contest
        .submit(spec, submission.photos.as_mut_slice())
        .await?;
    Ok(Json(entry.into()))
}
