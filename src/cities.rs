use crate::backend::Backend;

/// How many suggestions a city input shows at most.
pub const MAX_SUGGESTIONS: usize = 7;

/// The list of known city names for one country. Loaded once when the
/// client starts, replaced as a whole if it is loaded again.
#[derive(Debug, Default, Clone)]
pub struct CityDirectory {
    country: Option<String>,
    cities: Vec<String>,
}

impl CityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the backend for the city list of `country`. The answer arrives
    /// later as a message and is applied with [`CityDirectory::finish_load`].
    pub fn load(&mut self, backend: &dyn Backend, country: &str) {
        self.country = Some(country.to_owned());
        backend.fetch_cities(country);
    }

    /// Apply the result of a city list request. A failed load leaves the
    /// directory empty, the inputs keep working but never suggest anything.
    pub fn finish_load(&mut self, country: &str, result: anyhow::Result<Vec<String>>) {
        if self.country.as_deref().is_some_and(|wanted| wanted != country) {
            log::debug!("Ignoring stale city list for {country}");
            return;
        }
        match result {
            Ok(cities) => {
                log::info!("Loaded {} cities for {country}", cities.len());
                self.replace(country, cities);
            }
            Err(err) => {
                log::warn!("Cities are missing for {country}: {err:#}");
                self.cities.clear();
            }
        }
    }

    pub fn replace(&mut self, country: &str, cities: Vec<String>) {
        self.country = Some(country.to_owned());
        self.cities = cities;
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// The first [`MAX_SUGGESTIONS`] names that start with `query`, ignoring
    /// case and surrounding whitespace, in list order.
    pub fn suggestions(&self, query: &str) -> Vec<&str> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.cities
            .iter()
            .filter(|city| city.to_lowercase().starts_with(&query))
            .take(MAX_SUGGESTIONS)
            .map(String::as_str)
            .collect()
    }
}
