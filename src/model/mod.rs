//! The contest data model.
//!
//! [`document::ContestDocument`] is the only unit of persistence; everything
//! else here is a part of it or a view derived from it.

pub mod api;
pub mod document;
pub mod entry;
pub mod ledger;
pub mod photo;
pub mod settings;
