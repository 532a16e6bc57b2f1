//! Kiwi Tequila API client for city resolution and fare search

use crate::optimizer::{City, Fare, FareSource, ServiceError};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

const LOCATIONS_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);
const SEARCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
struct Location {
    code: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    price: f64,
    distance: f64,
}

/// Search window for the next ~24 hours: today and tomorrow (UTC), as
/// `dd/mm/YYYY`
pub fn next_24h_date_range(now: DateTime<Utc>) -> (String, String) {
    let today = now.date_naive();
    let tomorrow = today + Duration::days(1);
    (
        today.format("%d/%m/%Y").to_string(),
        tomorrow.format("%d/%m/%Y").to_string(),
    )
}

/// Top-ranked location, falling back to the query text when it has no name
fn first_city(response: LocationsResponse, city_name: &str) -> Result<City, ServiceError> {
    response
        .locations
        .into_iter()
        .next()
        .map(|location| City {
            code: location.code,
            name: location.name.unwrap_or_else(|| city_name.to_string()),
        })
        .ok_or_else(|| ServiceError::CityNotFound(city_name.to_string()))
}

fn first_fare(response: SearchResponse) -> Option<Fare> {
    response.data.into_iter().next().map(|itinerary| Fare {
        price: itinerary.price,
        distance_km: itinerary.distance,
    })
}

/// Client for the Tequila locations and search endpoints
pub struct TequilaClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl TequilaClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ServiceError> {
        debug!("Creating new Tequila client");
        let http_client = Client::builder()
            .user_agent(concat!("flight-optimizer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json<T, Q>(
        &self,
        path: &str,
        query: &Q,
        timeout: std::time::Duration,
    ) -> Result<T, ServiceError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let start_time = std::time::Instant::now();
        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Accept", "application/json")
            .query(query)
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();

        debug!(
            url = %url,
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "Tequila request completed"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

impl FareSource for TequilaClient {
    /// Convert a city name (e.g. "London") to its metropolitan code (e.g. "LON")
    #[instrument(level = "info", skip(self))]
    async fn resolve_city(&self, name: &str) -> Result<City, ServiceError> {
        let query = [
            ("term", name),
            ("location_types", "city"),
            ("limit", "1"),
            ("active_only", "true"),
            ("locale", "en-US"),
            ("sort", "rank"),
        ];
        let response: LocationsResponse = self
            .get_json("/locations/query", &query, LOCATIONS_TIMEOUT)
            .await?;
        let city = first_city(response, name)?;
        info!(code = %city.code, name = %city.name, "City resolved");
        Ok(city)
    }

    /// Cheapest one-way fare for one adult in the next ~24 hours
    #[instrument(level = "info", skip(self))]
    async fn cheapest_fare(
        &self,
        origin_code: &str,
        destination_code: &str,
        currency: &str,
    ) -> Result<Option<Fare>, ServiceError> {
        let (date_from, date_to) = next_24h_date_range(Utc::now());
        let query = [
            ("fly_from", origin_code),
            ("fly_to", destination_code),
            ("date_from", date_from.as_str()),
            ("date_to", date_to.as_str()),
            ("adults", "1"),
            ("curr", currency),
            ("limit", "1"),
            ("sort", "price"),
            ("asc", "1"),
        ];
        let response: SearchResponse = self.get_json("/v2/search", &query, SEARCH_TIMEOUT).await?;
        Ok(first_fare(response))
    }
}
