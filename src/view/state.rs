use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};

/// The pages of the client. Each one is what used to be a separate html
/// page with its own script.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    #[strum(serialize = "create_ride", serialize = "create")]
    CreateRide,
    #[strum(serialize = "results", serialize = "search_results")]
    Results,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::CreateRide => write!(f, "Offer a ride"),
            Page::Results => write!(f, "Find a ride"),
        }
    }
}
