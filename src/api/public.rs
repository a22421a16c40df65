use rocket::{serde::json::Json, Route, State};

use crate::contest::Contest;
use crate::error::Result;
use crate::model::api::entry::EntryListing;

pub fn routes() -> Vec<Route> {
    routes![entries]
}

#[get("/api/entries")]
async fn entries(contest: &State<Contest>) -> Result<Json<EntryListing>> {
    Ok(Json(contest.listing().await?))
}
