use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

use snf_quality::config::Config;
use snf_quality::logging;
use snf_quality::pipeline::{self, RunOptions};
use snf_quality::sources::download;

#[derive(Parser)]
#[command(name = "snf_quality")]
#[command(about = "CMS SNF quality multi-year loader and trend summarizer")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the multi-year load, filter, pivot and trend summary
    Run {
        /// Path to the county allow-list CSV
        #[arg(long, default_value = "data/raw/counties.csv")]
        county: PathBuf,
        /// Directory with archived provider CSVs
        #[arg(long, default_value = "data/archive")]
        archive_dir: PathBuf,
        /// Where to write the output tables
        #[arg(long, default_value = "outputs")]
        output_dir: PathBuf,
        /// Include the current CMS API snapshot
        #[arg(long)]
        include_live: bool,
    },
    /// Download archived monthly snapshots into the archive directory
    Fetch {
        /// Directory to write archived provider CSVs into
        #[arg(long, default_value = "data/archive")]
        archive_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load_or_default()?;

    match cli.command {
        Commands::Run {
            county,
            archive_dir,
            output_dir,
            include_live,
        } => {
            println!("🚀 Running multi-year quality pipeline...");
            let options = RunOptions {
                county_csv: county,
                archive_dir,
                output_dir,
                include_live,
            };
            match pipeline::run(&options, &config).await {
                Ok(summary) => {
                    println!("\n📊 Pipeline Results:");
                    println!("   Snapshots loaded: {}", summary.snapshots);
                    println!("   Rows unified: {}", summary.rows_unified);
                    println!("   Rows after county filter: {}", summary.rows_filtered);
                    println!("   Facility-year quality rows: {}", summary.quality_rows);
                    println!("   Facility attribute rows: {}", summary.facility_rows);
                    println!("   Trend rows: {}", summary.trend_rows);
                    println!(
                        "   Output files: {}, {}",
                        summary.quality_export.display(),
                        summary.trend_export.display()
                    );
                    println!("✅ Pipeline run completed successfully");
                }
                Err(e) => {
                    error!("Pipeline run failed: {}", e);
                    println!("❌ Pipeline run failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Fetch { archive_dir } => {
            println!("📥 Fetching archived snapshots...");
            let present = download::fetch_archives(&config.dataset, &archive_dir).await?;
            println!(
                "Done. {}/{} files present.",
                present,
                config.dataset.archive_months.len()
            );
            if present == 0 {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
