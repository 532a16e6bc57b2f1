//! Destination ranking behind `POST /optimize`
//!
//! [`Optimizer`] resolves the origin and every destination to a location code,
//! asks its [`FareSource`] for the cheapest one-way fare on each route and
//! declares the destination with the lowest price per kilometre.

use crate::{DestinationDetail, OptimizationResult, SearchRequest};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Error types for the optimization service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Upstream API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Could not resolve city '{0}'")]
    CityNotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Origin resolution failed: {0}")]
    OriginResolution(String),

    #[error("No destinations resolved.")]
    NoDestinationsResolved,

    #[error("No viable flights found in the next ~24 hours.")]
    NoViableFlights,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A city resolved to its location code
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub code: String, // Metropolitan code, e.g. "LON"
    pub name: String,
}

/// Cheapest one-way fare on a route
#[derive(Debug, Clone, PartialEq)]
pub struct Fare {
    pub price: f64,
    pub distance_km: f64,
}

/// Where cities and fares come from
pub trait FareSource: Send + Sync {
    fn resolve_city(&self, name: &str) -> impl Future<Output = Result<City, ServiceError>> + Send;

    /// `Ok(None)` when the route has no flights in the search window
    fn cheapest_fare(
        &self,
        origin_code: &str,
        destination_code: &str,
        currency: &str,
    ) -> impl Future<Output = Result<Option<Fare>, ServiceError>> + Send;
}

/// Trim and check a request the way the service accepts it
pub fn validate_request(
    request: SearchRequest,
    default_currency: &str,
) -> Result<SearchRequest, ServiceError> {
    let origin = request.origin.trim();
    if origin.is_empty() {
        return Err(ServiceError::InvalidRequest(
            "origin must not be empty".to_string(),
        ));
    }

    if request.destinations.is_empty() {
        return Err(ServiceError::InvalidRequest(
            "destinations must contain at least one city".to_string(),
        ));
    }

    let destinations: Vec<String> = request
        .destinations
        .iter()
        .map(|d| d.trim().to_string())
        .collect();
    if destinations.iter().any(|d| d.is_empty()) {
        return Err(ServiceError::InvalidRequest(
            "destinations must not contain empty names".to_string(),
        ));
    }

    let currency = match request.currency.trim() {
        "" => default_currency,
        currency => currency,
    };

    Ok(SearchRequest::new(origin, destinations).with_currency(currency))
}

impl ServiceError {
    /// Exit status of the standalone `direct` command
    pub fn exit_code(&self) -> i32 {
        match self {
            ServiceError::OriginResolution(_) => 2,
            ServiceError::NoDestinationsResolved => 3,
            ServiceError::NoViableFlights => 4,
            _ => 1,
        }
    }
}

/// A finished search: the resolved origin, the currency fares were quoted in
/// and the ranked answer
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub origin: City,
    pub currency: String,
    pub result: OptimizationResult,
}

pub struct Optimizer<S> {
    source: S,
    default_currency: String,
}

impl<S: FareSource> Optimizer<S> {
    pub fn new(source: S, default_currency: impl Into<String>) -> Self {
        Self {
            source,
            default_currency: default_currency.into(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The `/optimize` answer for `request`
    pub async fn optimize(
        &self,
        request: SearchRequest,
    ) -> Result<OptimizationResult, ServiceError> {
        self.search(request).await.map(|outcome| outcome.result)
    }

    #[instrument(level = "info", skip(self, request), fields(origin = %request.origin))]
    pub async fn search(&self, request: SearchRequest) -> Result<SearchOutcome, ServiceError> {
        let request = validate_request(request, &self.default_currency)?;

        let origin = self
            .source
            .resolve_city(&request.origin)
            .await
            .map_err(|e| ServiceError::OriginResolution(e.to_string()))?;
        info!(code = %origin.code, name = %origin.name, "Origin resolved");

        let mut resolved = Vec::with_capacity(request.destinations.len());
        for name in &request.destinations {
            match self.source.resolve_city(name).await {
                Ok(city) => {
                    debug!(city = %name, code = %city.code, "Destination resolved");
                    resolved.push(city);
                }
                Err(e) => warn!(city = %name, error = %e, "Skipping unresolvable destination"),
            }
        }

        if resolved.is_empty() {
            return Err(ServiceError::NoDestinationsResolved);
        }

        let mut details = Vec::with_capacity(resolved.len());
        for city in resolved {
            match self
                .source
                .cheapest_fare(&origin.code, &city.code, &request.currency)
                .await
            {
                Ok(Some(fare)) if fare.distance_km > 0.0 => {
                    let detail =
                        DestinationDetail::new(city.name, city.code, fare.price, fare.distance_km);
                    info!(
                        route = %format!("{}->{}", origin.code, detail.code),
                        price = detail.price,
                        distance_km = detail.distance_km,
                        price_per_km = detail.price_per_km,
                        "Fare found"
                    );
                    details.push(detail);
                }
                Ok(Some(fare)) => warn!(
                    destination = %city.code,
                    distance_km = fare.distance_km,
                    "Skipping fare with non-positive distance"
                ),
                Ok(None) => {
                    info!(origin = %origin.code, destination = %city.code, "No flights found")
                }
                Err(e) => warn!(
                    origin = %origin.code,
                    destination = %city.code,
                    error = %e,
                    "Fare search failed"
                ),
            }
        }

        let (best_destination, price_per_km) = details
            .iter()
            .min_by(|a, b| a.price_per_km.total_cmp(&b.price_per_km))
            .map(|best| (best.destination.clone(), best.price_per_km))
            .ok_or(ServiceError::NoViableFlights)?;

        info!(
            best = %best_destination,
            price_per_km,
            destinations_priced = details.len(),
            "Optimization completed"
        );

        Ok(SearchOutcome {
            origin,
            currency: request.currency,
            result: OptimizationResult {
                best_destination,
                price_per_km,
                details,
            },
        })
    }
}
