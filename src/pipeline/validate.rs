use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Condition, Region, ESSENTIAL_COLUMNS, REQUIRED_COLUMNS};
use crate::pipeline::schema::{Listing, NormalizedTable};

/// Per-rule issue counters accumulated across the whole table.
///
/// The two maps carry an entry for every required column, zero counts
/// included, so reports from different runs line up field for field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueTally {
    /// Rows whose source cell was absent, per required column
    pub missing_nulls: BTreeMap<String, u64>,
    /// Rows whose source cell was present but blank, per required column
    pub missing_empty: BTreeMap<String, u64>,
    /// Rows whose date cell failed the strict parse
    pub invalid_date: u64,
    /// Rows whose price was non-numeric or not strictly positive
    pub invalid_price: u64,
    /// Rows whose region fell outside the vocabulary
    pub invalid_region: u64,
    /// Rows whose condition fell outside the vocabulary
    pub invalid_condition: u64,
}

impl IssueTally {
    /// A tally with every required column registered at zero.
    pub fn new() -> Self {
        let mut tally = IssueTally::default();
        for name in REQUIRED_COLUMNS {
            tally.missing_nulls.insert(name.to_string(), 0);
            tally.missing_empty.insert(name.to_string(), 0);
        }
        tally
    }
}

/// Row-level validity flags plus the table-wide issue tally.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// One flag per input row, in input order
    pub flags: Vec<bool>,
    pub tally: IssueTally,
}

/// Trait for classifying normalized rows against the validity rules
pub trait Validator {
    /// Flag every row and count each rule violation.
    ///
    /// A row invalid for several reasons feeds each contributing counter but
    /// is excluded from the valid set exactly once. The input table is never
    /// mutated.
    fn validate(&self, table: &NormalizedTable) -> anyhow::Result<ValidationOutcome>;
}

/// Default validator implementing the required-field, vocabulary and
/// price-range rules
pub struct DefaultValidator;

impl DefaultValidator {
    fn is_valid(listing: &Listing) -> bool {
        let price_positive = listing.price_gbp.map_or(false, |price| price > 0.0);
        let essentials_present = ESSENTIAL_COLUMNS.iter().all(|&column| {
            listing
                .raw
                .get(column)
                .map_or(false, |cell| !cell.trim().is_empty())
        });
        listing.date.is_some()
            && price_positive
            && listing.region.is_known()
            && listing.condition.is_known()
            && essentials_present
    }

    fn tally_row(listing: &Listing, tally: &mut IssueTally) {
        for column in REQUIRED_COLUMNS {
            match listing.raw.get(column) {
                None => bump(&mut tally.missing_nulls, column),
                Some(cell) if cell.trim().is_empty() => {
                    bump(&mut tally.missing_empty, column)
                }
                Some(_) => {}
            }
        }
        if listing.date.is_none() {
            tally.invalid_date += 1;
        }
        if listing.price_gbp.map_or(true, |price| price <= 0.0) {
            tally.invalid_price += 1;
        }
        if !listing.region.is_known() {
            tally.invalid_region += 1;
        }
        if !listing.condition.is_known() {
            tally.invalid_condition += 1;
        }
    }
}

fn bump(map: &mut BTreeMap<String, u64>, column: &str) {
    *map.entry(column.to_string()).or_insert(0) += 1;
}

impl Validator for DefaultValidator {
    fn validate(&self, table: &NormalizedTable) -> anyhow::Result<ValidationOutcome> {
        let mut tally = IssueTally::new();
        let mut flags = Vec::with_capacity(table.listings.len());
        for listing in &table.listings {
            Self::tally_row(listing, &mut tally);
            flags.push(Self::is_valid(listing));
        }
        Ok(ValidationOutcome { flags, tally })
    }
}

/// A listing that passed every validity rule, with all fields typed.
#[derive(Debug, Clone)]
pub struct ValidListing {
    pub date: NaiveDate,
    pub seller_id: String,
    pub region: Region,
    pub category: String,
    pub item_id: String,
    pub price_gbp: f64,
    pub condition: Condition,
    /// Zero-based position in the source file
    pub ordinal: usize,
}

impl ValidListing {
    fn from_listing(listing: &Listing) -> Option<Self> {
        Some(ValidListing {
            date: listing.date?,
            seller_id: listing.seller_id.clone()?,
            region: *listing.region.known()?,
            category: listing.category.clone()?,
            item_id: listing.item_id.clone()?,
            price_gbp: listing.price_gbp?,
            condition: *listing.condition.known()?,
            ordinal: listing.ordinal,
        })
    }
}

/// Splits normalized rows into typed valid listings and rejected rows,
/// driven by the validator's flags.
pub fn partition(listings: Vec<Listing>, flags: &[bool]) -> (Vec<ValidListing>, Vec<Listing>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for (listing, &flag) in listings.into_iter().zip(flags) {
        if flag {
            match ValidListing::from_listing(&listing) {
                Some(typed) => valid.push(typed),
                None => invalid.push(listing),
            }
        } else {
            invalid.push(listing);
        }
    }
    (valid, invalid)
}
