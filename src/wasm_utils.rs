/// some utility functions that are required for the browser build
use std::str::FromStr;

use crate::config::parse_ride_ids;
use crate::view::state::Page;

/// take the current url, which is something like ridepool.example/app/?page=results&rides=3,4
/// and return the page, the ride ids and the country
pub fn parse_current_url() -> (Option<Page>, Option<Vec<u64>>, Option<String>) {
    let Some(search_param_string) = web_sys::window().and_then(|w| w.location().search().ok())
    else {
        return (None, None, None);
    };
    let Some(url_params) = web_sys::UrlSearchParams::new_with_str(&search_param_string).ok()
    else {
        return (None, None, None);
    };

    let page = url_params
        .get("page")
        .and_then(|name| Page::from_str(&name).ok());
    let ride_ids = url_params.get("rides").map(|text| parse_ride_ids(&text));
    let country = url_params.get("country").filter(|c| !c.is_empty());

    (page, ride_ids, country)
}
