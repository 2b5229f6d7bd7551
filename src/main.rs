use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;

use listwash::logging;
use listwash::Pipeline;

#[derive(Parser)]
#[command(name = "listwash")]
#[command(about = "Batch cleaner and data-quality reporter for marketplace listings")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the listings CSV
    #[arg(long)]
    listings: PathBuf,

    /// Path to the category lookup CSV
    #[arg(long)]
    lookup: PathBuf,

    /// Directory the artifacts are written to
    #[arg(long)]
    outdir: PathBuf,
}

fn main() {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    let pipeline = Pipeline::new();
    match pipeline.run(&cli.listings, &cli.lookup, &cli.outdir) {
        Ok(summary) => {
            println!(
                "Wrote {} and {}. Clean rows: {} | Invalid dropped: {} | Duplicates: {}",
                summary.clean_path.display(),
                summary.report_path.display(),
                summary.clean_rows,
                summary.invalid_rows,
                summary.duplicate_rows
            );
        }
        Err(err) => {
            error!("Cleaning run failed: {err}");
            eprintln!("ERROR: {err}");
            process::exit(1);
        }
    }
}
