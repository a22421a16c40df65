use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;

mod admin;
mod participant;
mod public;
mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(participant::routes());
    routes.extend(public::routes());
    routes.extend(voter::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Turn framework-level failures (unknown route, malformed body, oversize
/// upload) into the same JSON shape as handler errors.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let message = match status.code {
        400 => "Malformed request",
        404 => "Not found",
        413 => "Upload too large",
        415 => "Unsupported content type",
        422 => "Request body could not be understood",
        _ => status.reason().unwrap_or("Unexpected error"),
    };
    (status, Json(ErrorBody::new(message)))
}
