use rocket::{serde::json::Json, Route, State};

use crate::contest::Contest;
use crate::error::Result;
use crate::model::api::ballot::{BallotSpec, Success};

pub fn routes() -> Vec<Route> {
    routes![cast_vote]
}

#[post("/api/vote", data = "<ballot>", format = "json")]
async fn cast_vote(ballot: Json<BallotSpec>, contest: &State<Contest>) -> Result<Json<Success>> {
    let entry_id = ballot.entry_id.as_deref().unwrap_or_default();
    let voter_id = ballot.voter_id.as_deref().unwrap_or_default();
    contest.cast_vote(entry_id, voter_id).await?;
    Ok(Json(Success::OK))
}
