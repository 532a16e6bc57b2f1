//! Search form input and destination list parsing

use crate::{SearchRequest, DEFAULT_CURRENCY};

/// Split a comma-separated destination string into city names.
///
/// Entries are trimmed and empty ones dropped; order is preserved and
/// duplicates are kept.
pub fn parse_destinations(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Raw text of the search form, exactly as typed
#[derive(Debug, Clone, PartialEq)]
pub struct SearchForm {
    pub origin: String,
    pub destinations: String, // Comma separated, e.g. "Paris, Berlin, Rome"
    pub currency: String,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            origin: String::new(),
            destinations: String::new(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl SearchForm {
    pub fn new(
        origin: impl Into<String>,
        destinations: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destinations: destinations.into(),
            currency: currency.into(),
        }
    }

    /// Both required fields hold something other than whitespace
    pub fn is_complete(&self) -> bool {
        !self.origin.trim().is_empty() && !self.destinations.trim().is_empty()
    }

    /// Build the request body. City names are not checked here; the service
    /// rejects what it cannot resolve.
    pub fn to_request(&self) -> SearchRequest {
        let currency = match self.currency.trim() {
            "" => DEFAULT_CURRENCY,
            currency => currency,
        };

        SearchRequest::new(self.origin.trim(), parse_destinations(&self.destinations))
            .with_currency(currency)
    }
}
