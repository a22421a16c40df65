use std::io::Error as IoError;

use log::{error, warn};
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input from the caller.
    #[error("{0}")]
    Validation(String),
    #[error("Voting is currently disabled")]
    VotingClosed,
    #[error("Not found: {0}")]
    NotFound(String),
    /// The data directory could not be read or written.
    #[error("Storage failure while {action}: {source}")]
    Storage {
        action: &'static str,
        #[source]
        source: IoError,
    },
    /// The contest document exists but cannot be parsed or serialised.
    #[error("Contest document is corrupt: {0}")]
    Corrupt(#[from] JsonError),
    /// Every entry ID up to `u64::MAX` is taken.
    #[error("No entry IDs left to allocate")]
    IdsExhausted,
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Build a closure that wraps an I/O error with the action being attempted,
    /// for use with `map_err`.
    pub fn storage(action: &'static str) -> impl FnOnce(IoError) -> Self {
        move |source| Self::Storage { action, source }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::VotingClosed => Status::Forbidden,
            Self::NotFound(_) => Status::NotFound,
            Self::Storage { .. } | Self::Corrupt(_) | Self::IdsExhausted => {
                Status::InternalServerError
            }
        }
    }
}

/// The body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let message = if status.class() == StatusClass::ServerError {
            // Internal details go to the log, not to the client.
            error!("{} {}: {self}", req.method(), req.uri());
            "Internal server error".to_string()
        } else {
            warn!("{} {}: {self}", req.method(), req.uri());
            self.to_string()
        };
        (status, Json(ErrorBody::new(message))).respond_to(req)
    }
}
