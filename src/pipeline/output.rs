use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::pipeline::enrich::CleanRow;
use crate::pipeline::report::DataQualityReport;
use crate::pipeline::schema::Listing;

pub const CLEAN_PARQUET_FILE: &str = "clean_listings.parquet";
pub const CLEAN_CSV_FALLBACK_FILE: &str = "clean_listings.csv";
pub const REPORT_FILE: &str = "data_quality_report.json";
pub const INVALID_ROWS_FILE: &str = "invalid_rows.csv";
pub const README_FILE: &str = "README.txt";

/// Writes the clean table, preferring Parquet and falling back to CSV when
/// columnar output is unavailable or fails at runtime. Returns the path
/// actually written.
pub fn write_clean_table(outdir: &Path, rows: &[CleanRow]) -> Result<PathBuf> {
    #[cfg(feature = "parquet")]
    {
        let path = outdir.join(CLEAN_PARQUET_FILE);
        match parquet_out::write(&path, rows) {
            Ok(()) => return Ok(path),
            Err(err) => {
                warn!("Parquet write failed: {err}. Writing CSV fallback instead");
                println!("WARNING: parquet write failed: {err}. Writing CSV fallback instead");
                // A failed write can leave a half-written file at the path
                let _ = fs::remove_file(&path);
            }
        }
    }
    #[cfg(not(feature = "parquet"))]
    {
        warn!("Parquet support not compiled in. Writing CSV fallback instead");
        println!("WARNING: parquet support not compiled in. Writing CSV fallback instead");
    }

    let path = outdir.join(CLEAN_CSV_FALLBACK_FILE);
    write_clean_csv(&path, rows)?;
    Ok(path)
}

fn write_clean_csv(path: &Path, rows: &[CleanRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "date",
        "seller_id",
        "region",
        "category",
        "segment",
        "item_id",
        "price_gbp",
        "condition",
    ])?;
    for row in rows {
        writer.write_record([
            row.listing.date.to_string(),
            row.listing.seller_id.clone(),
            row.listing.region.to_string(),
            row.listing.category.clone(),
            row.segment.clone().unwrap_or_default(),
            row.listing.item_id.clone(),
            row.listing.price_gbp.to_string(),
            row.listing.condition.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the pretty-printed quality report.
pub fn write_report(outdir: &Path, report: &DataQualityReport) -> Result<PathBuf> {
    let path = outdir.join(REPORT_FILE);
    let json_content = serde_json::to_string_pretty(report)?;
    fs::write(&path, json_content)?;
    Ok(path)
}

/// Writes the rejected rows for transparency. Nothing is written when every
/// row passed validation.
pub fn write_invalid_rows(
    outdir: &Path,
    headers: &[String],
    invalid: &[Listing],
) -> Result<Option<PathBuf>> {
    if invalid.is_empty() {
        return Ok(None);
    }

    let path = outdir.join(INVALID_ROWS_FILE);
    let mut writer = csv::Writer::from_path(&path)?;

    let mut header: Vec<&str> = headers.iter().map(String::as_str).collect();
    header.push("date_parsed");
    header.push("price_gbp_num");
    writer.write_record(&header)?;

    for listing in invalid {
        writer.write_record(invalid_row_cells(headers, listing))?;
    }
    writer.flush()?;
    Ok(Some(path))
}

/// One rejected row in source column order: raw text for the coerced
/// columns, normalized text for the rest, then the two derived columns.
fn invalid_row_cells(headers: &[String], listing: &Listing) -> Vec<String> {
    let mut cells = Vec::with_capacity(headers.len() + 2);
    let mut extra_pos = 0;
    for header in headers {
        let value = match header.as_str() {
            "date" => listing.raw.date.clone().unwrap_or_default(),
            "seller_id" => listing.seller_id.clone().unwrap_or_default(),
            "region" => listing.region.as_text(),
            "category" => listing.category.clone().unwrap_or_default(),
            "item_id" => listing.item_id.clone().unwrap_or_default(),
            "price_gbp" => listing.raw.price_gbp.clone().unwrap_or_default(),
            "condition" => listing.condition.as_text(),
            _ => {
                let cell = listing.extras.get(extra_pos).cloned().flatten();
                extra_pos += 1;
                cell.unwrap_or_default()
            }
        };
        cells.push(value);
    }
    cells.push(
        listing
            .date
            .map(|date| date.to_string())
            .unwrap_or_default(),
    );
    cells.push(
        listing
            .price_gbp
            .map(|price| price.to_string())
            .unwrap_or_default(),
    );
    cells
}

/// Writes a short inventory of the run's artifacts.
pub fn write_readme(
    outdir: &Path,
    clean_path: &Path,
    clean_rows: usize,
    invalid_rows: usize,
) -> Result<()> {
    let clean_name = clean_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let text = format!(
        "Artifacts generated by listwash\n\
         - {clean_name}: {clean_rows} clean, deduplicated, enriched rows\n\
         - {REPORT_FILE}: metrics and validation issues\n\
         - {INVALID_ROWS_FILE}: rows dropped during validation ({invalid_rows})\n"
    );
    fs::write(outdir.join(README_FILE), text)?;
    Ok(())
}

#[cfg(feature = "parquet")]
mod parquet_out {
    use std::fs::File;
    use std::path::Path;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use chrono::NaiveDate;
    use parquet::arrow::ArrowWriter;

    use crate::error::{ListwashError, Result};
    use crate::pipeline::enrich::CleanRow;

    /// Days since the Unix epoch, the Date32 representation.
    fn epoch_days(date: NaiveDate) -> i32 {
        date.signed_duration_since(NaiveDate::default()).num_days() as i32
    }

    fn columnar_error(err: impl std::fmt::Display) -> ListwashError {
        ListwashError::Parquet {
            message: err.to_string(),
        }
    }

    pub fn write(path: &Path, rows: &[CleanRow]) -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Date32, false),
            Field::new("seller_id", DataType::Utf8, false),
            Field::new("region", DataType::Utf8, false),
            Field::new("category", DataType::Utf8, false),
            Field::new("segment", DataType::Utf8, true),
            Field::new("item_id", DataType::Utf8, false),
            Field::new("price_gbp", DataType::Float64, false),
            Field::new("condition", DataType::Utf8, false),
        ]));

        let dates: Date32Array = rows
            .iter()
            .map(|row| Some(epoch_days(row.listing.date)))
            .collect();
        let sellers: StringArray = rows
            .iter()
            .map(|row| Some(row.listing.seller_id.as_str()))
            .collect();
        let regions: StringArray = rows
            .iter()
            .map(|row| Some(row.listing.region.as_str()))
            .collect();
        let categories: StringArray = rows
            .iter()
            .map(|row| Some(row.listing.category.as_str()))
            .collect();
        let segments: StringArray = rows.iter().map(|row| row.segment.as_deref()).collect();
        let items: StringArray = rows
            .iter()
            .map(|row| Some(row.listing.item_id.as_str()))
            .collect();
        let prices: Float64Array = rows
            .iter()
            .map(|row| Some(row.listing.price_gbp))
            .collect();
        let conditions: StringArray = rows
            .iter()
            .map(|row| Some(row.listing.condition.as_str()))
            .collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(dates),
            Arc::new(sellers),
            Arc::new(regions),
            Arc::new(categories),
            Arc::new(segments),
            Arc::new(items),
            Arc::new(prices),
            Arc::new(conditions),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).map_err(columnar_error)?;

        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema, None).map_err(columnar_error)?;
        writer.write(&batch).map_err(columnar_error)?;
        writer.close().map_err(columnar_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Condition, Region, Vocab};
    use crate::pipeline::schema::RawCells;
    use crate::pipeline::validate::ValidListing;
    use chrono::NaiveDate;

    fn create_test_clean_row() -> CleanRow {
        CleanRow {
            listing: ValidListing {
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                seller_id: "S1".to_string(),
                region: Region::North,
                category: "Tools".to_string(),
                item_id: "I1".to_string(),
                price_gbp: 19.99,
                condition: Condition::New,
                ordinal: 0,
            },
            segment: Some("Home Improvement".to_string()),
        }
    }

    fn create_test_invalid_listing() -> Listing {
        Listing {
            date: None,
            seller_id: Some("S9".to_string()),
            region: Vocab::Unrecognized("Centre".to_string()),
            category: Some("Tools".to_string()),
            item_id: Some("I9".to_string()),
            price_gbp: Some(12.0),
            condition: Vocab::Known(Condition::Used),
            raw: RawCells {
                date: Some("05/01/2024".to_string()),
                seller_id: Some("S9".to_string()),
                region: Some("centre".to_string()),
                category: Some("tools".to_string()),
                item_id: Some("I9".to_string()),
                price_gbp: Some("12".to_string()),
                condition: Some("used".to_string()),
            },
            extras: vec![Some("note".to_string())],
            ordinal: 3,
        }
    }

    #[test]
    fn test_clean_csv_carries_the_output_columns_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        write_clean_csv(&path, &[create_test_clean_row()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("date,seller_id,region,category,segment,item_id,price_gbp,condition")
        );
        assert_eq!(
            lines.next(),
            Some("2024-01-05,S1,North,Tools,Home Improvement,I1,19.99,new")
        );
    }

    #[test]
    fn test_invalid_rows_file_skipped_when_everything_passed() {
        let dir = tempfile::tempdir().unwrap();
        let headers = vec!["date".to_string()];
        let written = write_invalid_rows(dir.path(), &headers, &[]).unwrap();
        assert_eq!(written, None);
        assert!(!dir.path().join(INVALID_ROWS_FILE).exists());
    }

    #[test]
    fn test_invalid_rows_preserve_source_order_and_derived_columns() {
        let dir = tempfile::tempdir().unwrap();
        let headers: Vec<String> = [
            "date",
            "seller_id",
            "region",
            "category",
            "item_id",
            "price_gbp",
            "condition",
            "notes",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let listing = create_test_invalid_listing();
        let written = write_invalid_rows(dir.path(), &headers, &[listing]).unwrap();
        let path = written.unwrap();

        let content = fs::read_to_string(path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("date,seller_id,region,category,item_id,price_gbp,condition,notes,date_parsed,price_gbp_num")
        );
        // Raw date text survives; the unparseable derived column is empty.
        assert_eq!(
            lines.next(),
            Some("05/01/2024,S9,Centre,Tools,I9,12,used,note,,12")
        );
    }

    #[test]
    fn test_readme_lists_artifacts_with_counts() {
        let dir = tempfile::tempdir().unwrap();
        let clean_path = dir.path().join(CLEAN_PARQUET_FILE);
        write_readme(dir.path(), &clean_path, 42, 3).unwrap();

        let content = fs::read_to_string(dir.path().join(README_FILE)).unwrap();
        assert!(content.contains("clean_listings.parquet: 42 clean"));
        assert!(content.contains("rows dropped during validation (3)"));
    }
}
