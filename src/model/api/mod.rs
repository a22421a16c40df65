//! API-compatible types.
//!
//! The types in this module are what the HTTP endpoints accept and return;
//! they wrap the stored model with derived fields such as vote counts.

pub mod admin;
pub mod ballot;
pub mod entry;
