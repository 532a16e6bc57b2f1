//! # Flight Optimizer
//!
//! Finds the destination with the cheapest fare per kilometre.
//!
//! The crate has two halves that share one data model:
//! - the front end: a search form ([`SearchForm`]), an HTTP client for the
//!   `/optimize` endpoint ([`OptimizerClient`]), a form session that allows one
//!   search at a time ([`SearchSession`]) and a presenter that ranks results
//!   ([`ResultView`]);
//! - the service: [`Optimizer`] resolves cities and fares through a
//!   [`FareSource`] (the Kiwi Tequila API in production) and [`server::router`]
//!   exposes it as `POST /optimize`.

pub mod client;
pub mod config;
pub mod input;
pub mod logging;
pub mod optimizer;
pub mod presenter;
pub mod server;
pub mod session;
pub mod tequila;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export main types for convenience
pub use client::OptimizerClient;
pub use config::{ClientConfig, ServiceConfig};
pub use input::{parse_destinations, SearchForm};
pub use logging::{init_logging, LogConfig};
pub use optimizer::{City, Fare, FareSource, Optimizer, SearchOutcome, ServiceError};
pub use presenter::{rank_details, render_route_report, render_table, ResultView};
pub use session::{FormEvent, FormState, SearchSession, SubmissionState, Transition};
pub use tequila::TequilaClient;

/// Currency used when none is given
pub const DEFAULT_CURRENCY: &str = "USD";

/// Message shown when a failed request carries no detail of its own
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong.";

/// Error types for the optimizer client
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error(
        "Optimizer returned status {status}: {}",
        .detail.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE)
    )]
    Remote { status: u16, detail: Option<String> },

    #[error("Invalid optimizer response: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("Invalid base address: {0:?}")]
    InvalidBaseUrl(String),

    #[error("A search is already in progress")]
    Busy,
}

impl OptimizerError {
    /// The one line shown to the user: the service's own detail when it sent
    /// one, the generic fallback otherwise.
    pub fn user_message(&self) -> String {
        match self {
            OptimizerError::Remote {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Body of `POST /optimize`
///
/// A missing `currency` deserializes as blank; the service then applies its
/// configured default, the same as for an explicit `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destinations: Vec<String>,
    #[serde(default)]
    pub currency: String,
}

impl SearchRequest {
    pub fn new(origin: impl Into<String>, destinations: Vec<String>) -> Self {
        Self {
            origin: origin.into(),
            destinations,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

/// Cheapest fare found for one destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationDetail {
    pub destination: String, // Display name, e.g. "Paris"
    pub code: String,        // Location code, e.g. "PAR"
    pub price: f64,
    pub distance_km: f64,
    pub price_per_km: f64,
}

impl DestinationDetail {
    /// Build a detail row, deriving `price_per_km` from price and distance
    pub fn new(
        destination: impl Into<String>,
        code: impl Into<String>,
        price: f64,
        distance_km: f64,
    ) -> Self {
        Self {
            destination: destination.into(),
            code: code.into(),
            price,
            distance_km,
            price_per_km: compute_price_per_km(price, distance_km),
        }
    }
}

/// Response of `POST /optimize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best_destination: String,
    pub price_per_km: f64,
    pub details: Vec<DestinationDetail>,
}

/// JSON error payload returned by the service on any non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Price divided by distance; infinite when the distance is not positive
pub fn compute_price_per_km(price: f64, distance_km: f64) -> f64 {
    if distance_km > 0.0 {
        price / distance_km
    } else {
        f64::INFINITY
    }
}
