use chrono::NaiveDate;

use crate::domain::{title_case, Condition, Region, Vocab, REQUIRED_COLUMNS};
use crate::error::{ListwashError, Result};
use crate::pipeline::ingest::RawTable;

/// Pre-coercion cell text for the required columns of one row.
///
/// `None` means the source cell was absent or zero-length. Whitespace-only
/// cells survive here untouched so the validator can count them separately
/// from true nulls.
#[derive(Debug, Clone)]
pub struct RawCells {
    pub date: Option<String>,
    pub seller_id: Option<String>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub item_id: Option<String>,
    pub price_gbp: Option<String>,
    pub condition: Option<String>,
}

impl RawCells {
    /// Cell text for a required column, by standardized name.
    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            "date" => self.date.as_deref(),
            "seller_id" => self.seller_id.as_deref(),
            "region" => self.region.as_deref(),
            "category" => self.category.as_deref(),
            "item_id" => self.item_id.as_deref(),
            "price_gbp" => self.price_gbp.as_deref(),
            "condition" => self.condition.as_deref(),
            _ => None,
        }
    }
}

/// One listings row after schema normalization.
///
/// Coercion never fails a row: unparseable dates and prices become absent
/// values, and out-of-vocabulary cells are kept as `Unrecognized`, all to be
/// counted by the validator rather than dropped here.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Strict `YYYY-MM-DD` parse of the date cell
    pub date: Option<NaiveDate>,
    /// Trimmed seller identifier
    pub seller_id: Option<String>,
    /// Region cell resolved against the region vocabulary
    pub region: Vocab<Region>,
    /// Trimmed, title-cased category
    pub category: Option<String>,
    /// Trimmed item identifier
    pub item_id: Option<String>,
    /// Numeric parse of the price cell
    pub price_gbp: Option<f64>,
    /// Condition cell resolved against the condition vocabulary
    pub condition: Vocab<Condition>,
    /// Cell text as read, before any coercion
    pub raw: RawCells,
    /// Cells from columns outside the required schema, in header order
    pub extras: Vec<Option<String>>,
    /// Zero-based position in the source file
    pub ordinal: usize,
}

/// The listings table after header standardization and type coercion.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    /// All standardized headers, in input order
    pub headers: Vec<String>,
    pub listings: Vec<Listing>,
}

/// Trait for coercing a raw listings table into typed records
pub trait Normalizer {
    /// Standardize and coerce an entire raw table.
    ///
    /// The only failure mode is schema absence: every required column must
    /// be present after header standardization.
    fn normalize(&self, table: &RawTable) -> Result<NormalizedTable>;
}

/// Default normalizer implementing the fixed listings schema
pub struct DefaultNormalizer;

/// Positions of the required columns within a standardized header row.
struct RequiredColumns {
    date: usize,
    seller_id: usize,
    region: usize,
    category: usize,
    item_id: usize,
    price_gbp: usize,
    condition: usize,
}

impl RequiredColumns {
    fn locate(table: &RawTable) -> Result<Self> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            match table.column(name) {
                Some(idx) => *slot = idx,
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(ListwashError::MissingColumns(missing));
        }
        Ok(Self {
            date: positions[0],
            seller_id: positions[1],
            region: positions[2],
            category: positions[3],
            item_id: positions[4],
            price_gbp: positions[5],
            condition: positions[6],
        })
    }

    fn contains(&self, idx: usize) -> bool {
        [
            self.date,
            self.seller_id,
            self.region,
            self.category,
            self.item_id,
            self.price_gbp,
            self.condition,
        ]
        .contains(&idx)
    }
}

impl DefaultNormalizer {
    fn normalize_row(
        row: &[Option<String>],
        columns: &RequiredColumns,
        extra_columns: &[usize],
        ordinal: usize,
    ) -> Listing {
        let cell = |idx: usize| row.get(idx).and_then(|cell| cell.as_deref());

        let raw = RawCells {
            date: cell(columns.date).map(str::to_string),
            seller_id: cell(columns.seller_id).map(str::to_string),
            region: cell(columns.region).map(str::to_string),
            category: cell(columns.category).map(str::to_string),
            item_id: cell(columns.item_id).map(str::to_string),
            price_gbp: cell(columns.price_gbp).map(str::to_string),
            condition: cell(columns.condition).map(str::to_string),
        };

        Listing {
            date: parse_date(cell(columns.date)),
            seller_id: cell(columns.seller_id).map(|text| text.trim().to_string()),
            region: resolve_region(cell(columns.region)),
            category: cell(columns.category).map(|text| title_case(text.trim())),
            item_id: cell(columns.item_id).map(|text| text.trim().to_string()),
            price_gbp: parse_price(cell(columns.price_gbp)),
            condition: resolve_condition(cell(columns.condition)),
            raw,
            extras: extra_columns
                .iter()
                .map(|&idx| row.get(idx).cloned().flatten())
                .collect(),
            ordinal,
        }
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, table: &RawTable) -> Result<NormalizedTable> {
        let columns = RequiredColumns::locate(table)?;
        let extra_columns: Vec<usize> = (0..table.headers.len())
            .filter(|&idx| !columns.contains(idx))
            .collect();

        let listings = table
            .rows
            .iter()
            .enumerate()
            .map(|(ordinal, row)| Self::normalize_row(row, &columns, &extra_columns, ordinal))
            .collect();

        Ok(NormalizedTable {
            headers: table.headers.clone(),
            listings,
        })
    }
}

/// Strict `YYYY-MM-DD` parse; anything else becomes an absent value.
fn parse_date(cell: Option<&str>) -> Option<NaiveDate> {
    cell.and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
}

/// Numeric parse of a price cell. Non-numeric text and a literal NaN both
/// become absent values.
fn parse_price(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|price| !price.is_nan())
}

fn resolve_region(cell: Option<&str>) -> Vocab<Region> {
    match cell {
        None => Vocab::Missing,
        Some(text) => {
            let normalized = title_case(text.trim());
            match Region::from_normalized(&normalized) {
                Some(region) => Vocab::Known(region),
                None => Vocab::Unrecognized(normalized),
            }
        }
    }
}

fn resolve_condition(cell: Option<&str>) -> Vocab<Condition> {
    match cell {
        None => Vocab::Missing,
        Some(text) => {
            let normalized = text.trim().to_lowercase();
            match Condition::from_normalized(&normalized) {
                Some(condition) => Vocab::Known(condition),
                None => Vocab::Unrecognized(normalized),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ingest::parse_table;

    fn normalize_content(content: &str) -> NormalizedTable {
        let table = parse_table(content.as_bytes()).unwrap();
        DefaultNormalizer.normalize(&table).unwrap()
    }

    #[test]
    fn test_normalize_well_formed_row() {
        let normalized = normalize_content(
            "date,seller_id,region,category,item_id,price_gbp,condition\n\
             2024-01-05,S1,north,kitchen tools,I1,19.99,NEW\n",
        );
        let listing = &normalized.listings[0];
        assert_eq!(listing.date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(listing.seller_id.as_deref(), Some("S1"));
        assert_eq!(listing.region, Vocab::Known(Region::North));
        assert_eq!(listing.category.as_deref(), Some("Kitchen Tools"));
        assert_eq!(listing.price_gbp, Some(19.99));
        assert_eq!(listing.condition, Vocab::Known(Condition::New));
        assert_eq!(listing.ordinal, 0);
    }

    #[test]
    fn test_missing_columns_fail_fatally_and_name_each_one() {
        let table = parse_table("date,region\n2024-01-05,North\n".as_bytes()).unwrap();
        let err = DefaultNormalizer.normalize(&table).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("seller_id"), "got: {message}");
        assert!(message.contains("category"), "got: {message}");
        assert!(message.contains("item_id"), "got: {message}");
        assert!(message.contains("price_gbp"), "got: {message}");
        assert!(message.contains("condition"), "got: {message}");
        // Columns that are present must not be reported.
        assert!(!message.contains("date"), "got: {message}");
    }

    #[test]
    fn test_headers_match_case_insensitively_after_trim() {
        let normalized = normalize_content(
            " DATE ,Seller_Id,REGION,Category,Item_ID,Price_GBP,Condition\n\
             2024-02-01,S2,south,garden,I2,5.00,used\n",
        );
        assert_eq!(normalized.listings.len(), 1);
        assert_eq!(normalized.listings[0].region, Vocab::Known(Region::South));
    }

    #[test]
    fn test_unparseable_date_and_price_become_absent() {
        let normalized = normalize_content(
            "date,seller_id,region,category,item_id,price_gbp,condition\n\
             05/01/2024,S1,North,Tools,I1,abc,new\n\
             2024-02-30,S2,South,Tools,I2,£9.99,used\n",
        );
        for listing in &normalized.listings {
            assert_eq!(listing.date, None);
            assert_eq!(listing.price_gbp, None);
        }
        // Raw text is preserved for diagnostics.
        assert_eq!(normalized.listings[0].raw.date.as_deref(), Some("05/01/2024"));
        assert_eq!(normalized.listings[1].raw.price_gbp.as_deref(), Some("£9.99"));
    }

    #[test]
    fn test_nan_price_counts_as_absent() {
        let normalized = normalize_content(
            "date,seller_id,region,category,item_id,price_gbp,condition\n\
             2024-01-05,S1,North,Tools,I1,NaN,new\n",
        );
        assert_eq!(normalized.listings[0].price_gbp, None);
    }

    #[test]
    fn test_out_of_vocabulary_cells_are_kept_as_unrecognized() {
        let normalized = normalize_content(
            "date,seller_id,region,category,item_id,price_gbp,condition\n\
             2024-01-05,S1,centre,Tools,I1,10,mint\n\
             2024-01-06,S2,  ,Tools,I2,10,used\n",
        );
        assert_eq!(
            normalized.listings[0].region,
            Vocab::Unrecognized("Centre".to_string())
        );
        assert_eq!(
            normalized.listings[0].condition,
            Vocab::Unrecognized("mint".to_string())
        );
        // Whitespace-only trims to an empty, unrecognized cell, not a null.
        assert_eq!(
            normalized.listings[1].region,
            Vocab::Unrecognized(String::new())
        );
    }

    #[test]
    fn test_extra_columns_pass_through_untouched() {
        let normalized = normalize_content(
            "date,seller_id,region,category,item_id,price_gbp,condition,notes\n\
             2024-01-05,S1,North,Tools,I1,10,new, as-is \n",
        );
        assert_eq!(normalized.headers.len(), 8);
        assert_eq!(
            normalized.listings[0].extras,
            vec![Some(" as-is ".to_string())]
        );
    }
}
