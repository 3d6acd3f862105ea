use serde::{Deserialize, Serialize};

use crate::view::state::Page;

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;
#[cfg(not(target_arch = "wasm32"))]
use directories_next::ProjectDirs;
#[cfg(not(target_arch = "wasm32"))]
use std::{fs, path::PathBuf};

/// Environment variables that override the config file.
#[cfg(not(target_arch = "wasm32"))]
const SESSION_ENV: &str = "RIDEPOOL_SESSION";
#[cfg(not(target_arch = "wasm32"))]
const RIDES_ENV: &str = "RIDEPOOL_RIDES";

/// Which backend route a booking button posts to. Both routes answer with a
/// plain status code and an optional `message`, they only differ in wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingEndpoint {
    /// `/bookings/request/{id}`, the driver still has to accept the request
    #[default]
    RequestBooking,
    /// `/rides/book/{id}`
    BookRide,
}

impl BookingEndpoint {
    pub fn path(self, ride_id: u64) -> String {
        match self {
            BookingEndpoint::RequestBooking => format!("/bookings/request/{ride_id}"),
            BookingEndpoint::BookRide => format!("/rides/book/{ride_id}"),
        }
    }

    /// Label a button keeps forever once its booking went through.
    pub fn booked_label(self) -> &'static str {
        match self {
            BookingEndpoint::RequestBooking => "Requested",
            BookingEndpoint::BookRide => "Already booked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix for every request. Empty means "same origin", which is what
    /// the browser build wants.
    pub base_url: String,
    /// Country whose cities feed the autocomplete inputs.
    pub country: String,
    /// Raw `Cookie` header value sent with authenticated requests. The
    /// browser attaches its own cookies, so this only matters natively.
    pub session_cookie: Option<String>,
    pub booking: BookingEndpoint,
    /// Where to go after a ride was created.
    pub listing_path: String,
    pub redirect_delay_ms: u64,
    pub start_page: Page,
    /// Rides shown on the results page.
    pub ride_ids: Vec<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: if cfg!(target_arch = "wasm32") {
                String::new()
            } else {
                String::from("http://localhost:5000")
            },
            country: String::from("romania"),
            session_cookie: None,
            booking: BookingEndpoint::default(),
            listing_path: String::from("/rides/all_rides"),
            redirect_delay_ms: 500,
            start_page: Page::CreateRide,
            ride_ids: Vec::new(),
        }
    }
}

impl Config {
    /// Absolute (or same-origin) url for a backend path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read `config.yaml` from the platform config directory. A missing file
    /// is not an error, the defaults are used instead.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match config_file() {
            Some(path) if path.is_file() => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {path:?}"))?;
                let config = Self::from_yaml(&text)
                    .with_context(|| format!("Failed to parse {path:?}"))?;
                log::info!("Loaded config from {path:?}");
                config
            }
            Some(path) => {
                log::info!("No config at {path:?}, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env(
            std::env::var(SESSION_ENV).ok(),
            std::env::var(RIDES_ENV).ok(),
        );
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn apply_env(&mut self, session: Option<String>, rides: Option<String>) {
        if let Some(session) = session.filter(|s| !s.is_empty()) {
            self.session_cookie = Some(session);
        }
        if let Some(rides) = rides {
            self.ride_ids = parse_ride_ids(&rides);
        }
    }

    /// The browser build has no config file, the page url decides instead.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::default();
        let (page, ride_ids, country) = crate::wasm_utils::parse_current_url();
        if let Some(page) = page {
            config.start_page = page;
        }
        if let Some(ride_ids) = ride_ids {
            config.ride_ids = ride_ids;
        }
        if let Some(country) = country {
            config.country = country;
        }
        Ok(config)
    }
}

/// `"3,4, 9"` -> `[3, 4, 9]`. Entries that are not numbers are skipped.
pub fn parse_ride_ids(text: &str) -> Vec<u64> {
    text.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

#[cfg(not(target_arch = "wasm32"))]
fn config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "Ridepool").map(|dirs| dirs.config_dir().join("config.yaml"))
}
