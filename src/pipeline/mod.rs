// Batch cleaning pipeline: ingest, normalize, validate, dedupe, enrich,
// report, write.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::pipeline::dedupe::{DefaultDeduplicator, Deduplicator};
use crate::pipeline::enrich::{DefaultEnricher, Enricher};
use crate::pipeline::report::{output_stats, DataQualityReport, InputStats};
use crate::pipeline::schema::{DefaultNormalizer, NormalizedTable, Normalizer};
use crate::pipeline::validate::{partition, DefaultValidator, Validator};

pub mod dedupe;
pub mod enrich;
pub mod ingest;
pub mod output;
pub mod report;
pub mod schema;
pub mod validate;

/// Result of a complete cleaning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_rows: u64,
    pub clean_rows: u64,
    pub invalid_rows: u64,
    pub duplicate_rows: u64,
    pub clean_path: PathBuf,
    pub report_path: PathBuf,
}

/// The batch cleaning pipeline, wired strictly forward.
pub struct Pipeline {
    normalizer: Box<dyn Normalizer>,
    validator: Box<dyn Validator>,
    deduplicator: Box<dyn Deduplicator>,
    enricher: Box<dyn Enricher>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            normalizer: Box::new(DefaultNormalizer),
            validator: Box::new(DefaultValidator),
            deduplicator: Box::new(DefaultDeduplicator),
            enricher: Box::new(DefaultEnricher),
        }
    }

    /// Run the complete pipeline over one listings file and one lookup file.
    #[instrument(skip(self), fields(listings = %listings_path.display()))]
    pub fn run(
        &self,
        listings_path: &Path,
        lookup_path: &Path,
        outdir: &Path,
    ) -> anyhow::Result<RunSummary> {
        info!("🚀 Starting cleaning run for {}", listings_path.display());
        println!("🚀 Starting cleaning run for {}", listings_path.display());
        fs::create_dir_all(outdir)?;

        // Step 1: Ingest both tables
        info!("📥 Reading listings and lookup...");
        println!("📥 Reading listings and lookup...");
        let raw = ingest::read_table(listings_path)?;
        let lookup = ingest::read_lookup(lookup_path)?;
        let input_rows = raw.row_count() as u64;

        // Step 2: Normalize the schema
        let normalized = self.normalizer.normalize(&raw)?;
        info!("✅ Normalized {} rows", normalized.listings.len());
        println!("✅ Normalized {} rows", normalized.listings.len());

        // Step 3: Validate
        let outcome = self.validator.validate(&normalized)?;
        let NormalizedTable { headers, listings } = normalized;
        let (valid, invalid) = partition(listings, &outcome.flags);
        info!(
            "✅ Validated: {} valid, {} invalid",
            valid.len(),
            invalid.len()
        );
        println!(
            "✅ Validated: {} valid, {} invalid",
            valid.len(),
            invalid.len()
        );

        // Step 4: Deduplicate
        let deduped = self.deduplicator.dedupe(valid)?;
        info!("✅ Deduplicated: {} rows removed", deduped.removed);
        println!("✅ Deduplicated: {} rows removed", deduped.removed);

        // Step 5: Enrich
        let clean = self.enricher.enrich(deduped.rows, &lookup)?;
        info!("✅ Enriched {} rows", clean.len());
        println!("✅ Enriched {} rows", clean.len());

        // Step 6: Compile the quality report
        let report = DataQualityReport {
            input: InputStats { rows: input_rows },
            validation_issues: outcome.tally,
            rows_removed_invalid: invalid.len() as u64,
            rows_removed_duplicates: deduped.removed,
            output: output_stats(&clean),
        };

        // Step 7: Write artifacts
        let clean_path = output::write_clean_table(outdir, &clean)?;
        let report_path = output::write_report(outdir, &report)?;
        output::write_invalid_rows(outdir, &headers, &invalid)?;
        output::write_readme(outdir, &clean_path, clean.len(), invalid.len())?;
        info!("💾 Saved artifacts to {}", outdir.display());
        println!("💾 Saved artifacts to {}", outdir.display());

        Ok(RunSummary {
            input_rows,
            clean_rows: clean.len() as u64,
            invalid_rows: invalid.len() as u64,
            duplicate_rows: deduped.removed,
            clean_path,
            report_path,
        })
    }
}
