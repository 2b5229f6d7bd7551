use tracing::debug;

use crate::pipeline::validate::ValidListing;

/// Deduplicated rows plus the number of rows dropped.
#[derive(Debug, Clone)]
pub struct DedupedTable {
    /// Surviving rows, ordered by (date, seller, item, price)
    pub rows: Vec<ValidListing>,
    pub removed: u64,
}

/// Trait for collapsing rows that share a natural key
pub trait Deduplicator {
    /// Remove duplicates of the (date, seller_id, item_id) natural key.
    fn dedupe(&self, rows: Vec<ValidListing>) -> anyhow::Result<DedupedTable>;
}

/// Default deduplicator keeping the cheapest row per natural key
///
/// Rows are stable-sorted by (date, seller_id, item_id, price_gbp), so the
/// first row of each key group is the lowest-priced one, with source order
/// deciding price ties. A linear scan then keeps that first row and drops
/// the rest. The output stays in sort order.
pub struct DefaultDeduplicator;

impl Deduplicator for DefaultDeduplicator {
    fn dedupe(&self, mut rows: Vec<ValidListing>) -> anyhow::Result<DedupedTable> {
        let before = rows.len();
        rows.sort_by(|a, b| {
            (a.date, &a.seller_id, &a.item_id)
                .cmp(&(b.date, &b.seller_id, &b.item_id))
                .then(a.price_gbp.total_cmp(&b.price_gbp))
        });

        let mut kept: Vec<ValidListing> = Vec::with_capacity(rows.len());
        for row in rows {
            let same_key = kept.last().map_or(false, |prev| {
                prev.date == row.date
                    && prev.seller_id == row.seller_id
                    && prev.item_id == row.item_id
            });
            if !same_key {
                kept.push(row);
            }
        }

        let removed = (before - kept.len()) as u64;
        debug!("Deduplication removed {removed} of {before} rows");
        Ok(DedupedTable { rows: kept, removed })
    }
}
