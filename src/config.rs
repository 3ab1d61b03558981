//! Rocket configuration, overlaid with the deployment's legacy variables.
//!
//! `Rocket.toml` and `ROCKET_*` variables are read first. When `DBUSER`,
//! `DBPASS`, `DBADRESS` and `DBNAME` are all set they replace the `rsvp`
//! database url, and `LOCALPORT` (`":8080"` or `"8080"`) replaces the port.

use std::env;

use rocket::figment::Figment;
use tracing::{info, warn};

/// Pool cap used when no `max_connections` is configured.
pub const DEFAULT_MAX_CONNECTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub user: String,
    pub password: String,
    pub address: String,
    pub name: String,
}

impl DatabaseSettings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let mut missing = Vec::new();
        let mut get = |key: &'static str| {
            let value = lookup(key);
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let settings = DatabaseSettings {
            user: get("DBUSER"),
            password: get("DBPASS"),
            address: get("DBADRESS"),
            name: get("DBNAME"),
        };

        match missing.len() {
            0 => Some(settings),
            4 => None,
            _ => {
                warn!(?missing, "Incomplete database variables, using Rocket.toml");
                None
            }
        }
    }

    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@{}/{}",
            self.user, self.password, self.address, self.name
        )
    }
}

/// Accepts `":8080"`, `"8080"` or `"0.0.0.0:8080"`.
pub fn parse_port(value: &str) -> Option<u16> {
    value.trim().rsplit(':').next()?.parse().ok()
}

pub fn figment() -> Figment {
    overlay(rocket::Config::figment(), |key| env::var(key).ok())
}

fn overlay(mut figment: Figment, lookup: impl Fn(&str) -> Option<String>) -> Figment {
    if let Some(db) = DatabaseSettings::from_lookup(&lookup) {
        info!(address = %db.address, name = %db.name, "Using database from environment");
        figment = figment.merge(("databases.rsvp.url", db.url()));
    }

    if let Some(value) = lookup("LOCALPORT") {
        match parse_port(&value) {
            Some(port) => {
                figment = figment
                    .merge(("port", port))
                    .merge(("address", "0.0.0.0"));
            }
            None => warn!(value = %value, "Invalid LOCALPORT, keeping configured port"),
        }
    }

    figment.join(("databases.rsvp.max_connections", DEFAULT_MAX_CONNECTIONS))
}
