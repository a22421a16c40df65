#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use std::path::Path;

use rocket::{
    figment::{providers::Serialized, Figment},
    Build, Rocket,
};

pub mod api;
pub mod config;
pub mod contest;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod store;

use config::{ConfigFairing, ContestFairing};
use logging::LoggerFairing;

/// Build the server from the standard configuration sources.
pub fn build() -> Rocket<Build> {
    rocket_for_figment(config::figment())
}

/// Build the server over the given data directory, other settings as usual.
pub fn rocket_for_data_dir(data_dir: &Path) -> Rocket<Build> {
    rocket_for_figment(config::figment().merge(Serialized::global("data_dir", data_dir)))
}

fn rocket_for_figment(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(ConfigFairing)
        .attach(ContestFairing)
        .attach(LoggerFairing)
}
