//! Ranking and text rendering of optimization results

use crate::optimizer::SearchOutcome;
use crate::{DestinationDetail, OptimizationResult};
use std::cmp::Ordering;
use tracing::warn;

/// Ascending price per km; NaN rates sort after everything else
fn by_price_per_km(a: &DestinationDetail, b: &DestinationDetail) -> Ordering {
    match (a.price_per_km.is_nan(), b.price_per_km.is_nan()) {
        (false, false) => a.price_per_km.total_cmp(&b.price_per_km),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    }
}

/// Sorted copy of `details`, cheapest per km first. The input is untouched.
pub fn rank_details(details: &[DestinationDetail]) -> Vec<DestinationDetail> {
    let mut ranked = details.to_vec();
    ranked.sort_by(by_price_per_km);
    ranked
}

/// Fixed decimals with exact ties rounded away from zero (`12.125` -> `12.13`),
/// matching what a browser's `toFixed` shows for the same response
fn to_fixed(value: f64, decimals: u32) -> String {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round() / scale;
    format!("{:.*}", decimals as usize, rounded)
}

pub fn format_price(price: f64) -> String {
    to_fixed(price, 2)
}

pub fn format_distance(distance_km: f64) -> String {
    format!("{:.0} km", distance_km.round())
}

pub fn format_price_per_km(price_per_km: f64) -> String {
    to_fixed(price_per_km, 4)
}

/// What the results panel shows for one response.
///
/// The server declares a best destination, but rows are re-ranked locally and
/// the highlight is taken from that ranking. When the declaration disagrees
/// with the ranking the view says so instead of showing both silently.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub rows: Vec<DestinationDetail>,
    pub declared_best: String,
    pub declared_price_per_km: f64,
}

impl ResultView {
    pub fn from_result(result: &OptimizationResult) -> Self {
        let view = Self {
            rows: rank_details(&result.details),
            declared_best: result.best_destination.clone(),
            declared_price_per_km: result.price_per_km,
        };

        if !view.best_is_consistent() {
            warn!(
                declared = %view.declared_best,
                ranked = view.rows.first().map(|r| r.destination.as_str()).unwrap_or(""),
                "Server-declared best destination does not match the ranking"
            );
        }

        view
    }

    /// Rows sharing the lowest price per km
    fn cheapest(&self) -> impl Iterator<Item = &DestinationDetail> {
        let lowest = self.rows.first().map(|r| r.price_per_km);
        self.rows
            .iter()
            .take_while(move |r| Some(r.price_per_km) == lowest)
    }

    /// True when the declared best is among the cheapest rows. With no rows
    /// there is nothing to contradict.
    pub fn best_is_consistent(&self) -> bool {
        self.rows.is_empty() || self.cheapest().any(|r| r.destination == self.declared_best)
    }

    /// The highlighted row: the declared best if it ties for cheapest,
    /// otherwise the head of the ranking
    pub fn best(&self) -> Option<&DestinationDetail> {
        self.cheapest()
            .find(|r| r.destination == self.declared_best)
            .or_else(|| self.rows.first())
    }
}

/// Render the best-destination banner followed by the ranked table
pub fn render_table(view: &ResultView, currency: &str) -> String {
    let mut lines = Vec::new();

    match view.best() {
        Some(best) => lines.push(format!(
            "Best: {} ({} {}/km)",
            best.destination,
            currency,
            format_price_per_km(best.price_per_km)
        )),
        None => lines.push(format!(
            "Best: {} ({} {}/km)",
            view.declared_best,
            currency,
            format_price_per_km(view.declared_price_per_km)
        )),
    }

    if !view.best_is_consistent() {
        lines.push(format!(
            "Note: the service declared {} ({} {}/km) as best, which is not the lowest rate below",
            view.declared_best,
            currency,
            format_price_per_km(view.declared_price_per_km)
        ));
    }

    if view.rows.is_empty() {
        lines.push("No destinations to show.".to_string());
        return lines.join("\n");
    }

    let headers = [
        "City".to_string(),
        "Code".to_string(),
        "Price".to_string(),
        "Distance".to_string(),
        format!("{}/km", currency),
    ];
    let rows: Vec<[String; 5]> = view
        .rows
        .iter()
        .map(|r| {
            [
                r.destination.clone(),
                r.code.clone(),
                format!("{} {}", currency, format_price(r.price)),
                format_distance(r.distance_km),
                format_price_per_km(r.price_per_km),
            ]
        })
        .collect();

    let mut widths = headers.clone().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String; 5]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    lines.push(String::new());
    lines.push(format_row(&headers));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rows.iter().map(format_row));

    lines.join("\n")
}

/// Plain-text report of a search run without the service: the origin, one
/// line per priced route in search order, then the best destination.
pub fn render_route_report(outcome: &SearchOutcome) -> String {
    let SearchOutcome {
        origin,
        currency,
        result,
    } = outcome;
    let mut lines = vec![format!("Origin: {} ({})", origin.name, origin.code), String::new()];

    lines.extend(result.details.iter().map(|d| {
        format!(
            "- {} → {}: {} {} / {} = {} {}/km",
            origin.code,
            d.code,
            currency,
            format_price(d.price),
            format_distance(d.distance_km),
            currency,
            format_price_per_km(d.price_per_km)
        )
    }));

    let view = ResultView::from_result(result);
    if let Some(best) = view.best() {
        lines.push(String::new());
        lines.push(format!("Best destination: {}", best.destination));
        lines.push(format!(
            "Price per km: {} {}/km",
            currency,
            format_price_per_km(best.price_per_km)
        ));
        lines.push(format!(
            "(Cheapest fare: {} {} for ~{}; route {}→{})",
            currency,
            format_price(best.price),
            format_distance(best.distance_km),
            origin.code,
            best.code
        ));
    }

    lines.join("\n")
}
