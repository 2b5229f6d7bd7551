use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pipeline::enrich::CleanRow;
use crate::pipeline::validate::IssueTally;

/// Price distribution over the clean output. All fields are absent when the
/// output table is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
}

/// Descriptive statistics over the final output table.
///
/// Frequency maps are keyed by cell value, with a `"null"` bucket counting
/// absent values, and stay in sorted key order so identical inputs produce
/// identical reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputStats {
    pub row_count: u64,
    pub price: PriceStats,
    pub by_region: BTreeMap<String, u64>,
    pub by_category: BTreeMap<String, u64>,
    pub by_segment: BTreeMap<String, u64>,
}

/// Input-side counters for the quality report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputStats {
    pub rows: u64,
}

/// The data-quality report emitted alongside the clean table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub input: InputStats,
    pub validation_issues: IssueTally,
    pub rows_removed_invalid: u64,
    pub rows_removed_duplicates: u64,
    pub output: OutputStats,
}

/// Computes descriptive statistics over the final enriched rows.
///
/// Pure over its input: rows are only read, never reordered or mutated.
pub fn output_stats(rows: &[CleanRow]) -> OutputStats {
    let mut prices: Vec<f64> = rows.iter().map(|row| row.listing.price_gbp).collect();
    prices.sort_by(f64::total_cmp);

    let count = prices.len();
    let price = PriceStats {
        min: prices.first().copied(),
        max: prices.last().copied(),
        avg: (count > 0).then(|| prices.iter().sum::<f64>() / count as f64),
        p50: quantile(&prices, 0.50),
        p95: quantile(&prices, 0.95),
    };

    OutputStats {
        row_count: rows.len() as u64,
        price,
        by_region: frequencies(rows.iter().map(|row| Some(row.listing.region.as_str()))),
        by_category: frequencies(rows.iter().map(|row| Some(row.listing.category.as_str()))),
        by_segment: frequencies(rows.iter().map(|row| row.segment.as_deref())),
    }
}

/// Linear interpolation between the two nearest order statistics. `sorted`
/// must be ascending.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn frequencies<'a>(values: impl Iterator<Item = Option<&'a str>>) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for value in values {
        let key = value.unwrap_or("null").to_string();
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}
