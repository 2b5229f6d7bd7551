use std::collections::HashMap;

use tracing::debug;

use crate::domain::title_case;
use crate::pipeline::ingest::RawTable;
use crate::pipeline::validate::ValidListing;

/// A clean, deduplicated listing joined with its lookup attributes.
#[derive(Debug, Clone)]
pub struct CleanRow {
    /// The validated listing this row was built from
    pub listing: ValidListing,
    /// Market segment attached from the category lookup, absent when the
    /// category has no lookup entry
    pub segment: Option<String>,
}

/// Trait for attaching lookup attributes to deduplicated listings
pub trait Enricher {
    /// Left-join listings against the category lookup.
    ///
    /// Every input row comes back exactly once, in order; a missing lookup
    /// match leaves the segment absent rather than dropping the row.
    fn enrich(&self, rows: Vec<ValidListing>, lookup: &RawTable)
        -> anyhow::Result<Vec<CleanRow>>;
}

/// Default enricher joining on the title-cased category
pub struct DefaultEnricher;

impl DefaultEnricher {
    /// Builds the category-to-segment map, keeping the first lookup row per
    /// category when the lookup carries duplicates.
    fn segment_map(lookup: &RawTable) -> HashMap<String, Option<String>> {
        let mut map = HashMap::new();
        let (Some(category_idx), Some(segment_idx)) =
            (lookup.column("category"), lookup.column("segment"))
        else {
            return map;
        };
        for row in &lookup.rows {
            let Some(category) = row.get(category_idx).and_then(|cell| cell.as_deref()) else {
                continue;
            };
            let segment = row.get(segment_idx).and_then(|cell| cell.clone());
            map.entry(title_case(category)).or_insert(segment);
        }
        map
    }
}

impl Enricher for DefaultEnricher {
    fn enrich(
        &self,
        rows: Vec<ValidListing>,
        lookup: &RawTable,
    ) -> anyhow::Result<Vec<CleanRow>> {
        let segments = Self::segment_map(lookup);
        debug!("Lookup carries {} categories", segments.len());
        Ok(rows
            .into_iter()
            .map(|listing| {
                let segment = segments.get(&listing.category).cloned().flatten();
                CleanRow { listing, segment }
            })
            .collect())
    }
}
