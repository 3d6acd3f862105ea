#![warn(clippy::pedantic)]
// hide the cmd when opening the exe on windows, see: https://github.com/emilk/egui/issues/116
#![windows_subsystem = "windows"]

mod backend;
mod cities;
mod config;
mod message;
mod ride;
mod view;
#[cfg(target_arch = "wasm32")]
mod wasm_utils;

use time::UtcOffset;

use crate::config::Config;
use crate::view::View;

/// The local offset can only be read reliably before other threads exist,
/// so it is captured first thing.
fn startup_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or_else(|err| {
        log::warn!("Could not determine the local time zone, using UTC: {err}");
        UtcOffset::UTC
    })
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|err| {
        log::error!("{err:#}");
        Config::default()
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let local_offset = startup_offset();

    let config = load_config();
    log::info!("Talking to {}", config.url("/"));
    if let Err(err) = View::new_and_start(config, local_offset) {
        log::error!("Failed to run the ui: {err}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    let _result = eframe::WebLogger::init(log::LevelFilter::Debug);
    let local_offset = startup_offset();
    let config = load_config();
    View::new_and_start(config, local_offset);
}
