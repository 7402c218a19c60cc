use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

use swimdb::config::Config;
use swimdb::constants::DATABASE_DELIMITER;
use swimdb::error::{PipelineError, Result};
use swimdb::pipeline::bests::{BestsOptions, Extremal, PersonalBests};
use swimdb::pipeline::{self, BuildOptions};
use swimdb::profiles::ProfileDocument;
use swimdb::{logging, scrape};

#[derive(Parser)]
#[command(name = "swimdb")]
#[command(about = "Swim meet results extraction and normalization pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the consolidated results database from meet files
    Build {
        /// Directory with hierarchical XML meet files (searched recursively)
        #[arg(long)]
        lenex_directory: Option<PathBuf>,
        /// Directory with Olympics XLSX exports
        #[arg(long)]
        olympic_directory: Option<PathBuf>,
        /// Directory with athlete profile records
        #[arg(long)]
        profile_directory: Option<PathBuf>,
        /// Output database file
        #[arg(long)]
        database_file: Option<PathBuf>,
        /// Restrict extraction to one round, e.g. FIN
        #[arg(long)]
        stage: Option<String>,
        /// Keep rows with unresolved height/weight, marked N/A
        #[arg(long)]
        with_na: bool,
        /// Worker bound (default: available cores minus one)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Reduce a database file to extremal times per athlete and event
    Bests {
        /// Database file produced by `build`
        #[arg(long)]
        database_file: PathBuf,
        /// Only consider rows of this course, e.g. LCM
        #[arg(long)]
        course: Option<String>,
        /// Keep the slowest time per grouping instead of the fastest
        #[arg(long)]
        slowest: bool,
        /// Keep one time per event instead of one per athlete
        #[arg(long)]
        all_entries: bool,
        /// Write the groupings to this file instead of a summary
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Extract athlete profile records from saved biography pages
    ScrapeProfiles {
        /// Directory with saved biography HTML files
        #[arg(long)]
        directory: PathBuf,
        /// Profile file to write; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Build {
            lenex_directory,
            olympic_directory,
            profile_directory,
            database_file,
            stage,
            with_na,
            workers,
        } => {
            run_build(
                lenex_directory,
                olympic_directory,
                profile_directory,
                database_file,
                stage,
                with_na,
                workers,
            )
            .await
        }
        Commands::Bests {
            database_file,
            course,
            slowest,
            all_entries,
            output,
        } => run_bests(database_file, course, slowest, all_entries, output),
        Commands::ScrapeProfiles { directory, output } => run_scrape(directory, output),
    };

    if let Err(problem) = outcome {
        error!("{problem}");
        eprintln!("❌ {problem}");
        // Format-incompatibility is distinguishable from ordinary failures.
        let exit = if problem.fatal_code().is_some() { 2 } else { 1 };
        std::process::exit(exit);
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_build(
    lenex_directory: Option<PathBuf>,
    olympic_directory: Option<PathBuf>,
    profile_directory: Option<PathBuf>,
    database_file: Option<PathBuf>,
    stage: Option<String>,
    with_na: bool,
    workers: Option<usize>,
) -> Result<()> {
    let config = Config::load()?;

    let options = BuildOptions {
        lenex_directory: lenex_directory.or(config.build.lenex_directory),
        olympic_directory: olympic_directory.or(config.build.olympic_directory),
        profile_directory: profile_directory
            .or(config.build.profile_directory)
            .ok_or_else(|| PipelineError::Config("profile directory not set".to_string()))?,
        database_file: database_file
            .or(config.build.database_file)
            .ok_or_else(|| PipelineError::Config("database file not set".to_string()))?,
        stage,
        with_na,
        workers: workers.or(config.build.workers),
    };
    if options.lenex_directory.is_none() && options.olympic_directory.is_none() {
        return Err(PipelineError::Config(
            "no input directories set".to_string(),
        ));
    }

    let report = pipeline::build_database(options).await?;

    println!("\n📊 Database build:");
    println!("   Files processed: {}", report.files);
    println!("   Rows written: {}", report.rows);
    println!("   Rows skipped: {}", report.skips.total());
    if report.skips.total() > 0 {
        println!("      no time: {}", report.skips.no_time);
        println!("      unmatched name: {}", report.skips.unmatched_name);
        println!("      no profile: {}", report.skips.no_profile);
        println!("      incomplete: {}", report.skips.incomplete);
    }
    Ok(())
}

fn run_bests(
    database_file: PathBuf,
    course: Option<String>,
    slowest: bool,
    all_entries: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let options = BestsOptions {
        extremal: if slowest {
            Extremal::Slowest
        } else {
            Extremal::Fastest
        },
        course,
        per_event: all_entries,
    };
    let bests = PersonalBests::from_csv(&database_file, &options)?;

    if let Some(path) = output {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(DATABASE_DELIMITER)
            .from_path(&path)?;
        for (superkey, stroke, distance, gender, measures) in bests.iter() {
            let record = vec![
                superkey.to_string(),
                stroke.to_string(),
                distance.to_string(),
                gender.to_string(),
                measures.bmi.to_string(),
                measures.speed_per_kg.to_string(),
                measures.speed.to_string(),
            ];
            writer.write_record(record)?;
        }
        writer.flush()?;
        println!("✅ {} groupings written to {}", bests.len(), path.display());
    } else {
        println!("📊 {} athlete groupings", bests.superkeys().len());
        println!("   {} grouping slots", bests.len());
    }
    Ok(())
}

fn run_scrape(directory: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let records = scrape::scrape_directory(&directory)?;
    let document = ProfileDocument { data: records };

    match output {
        Some(path) => {
            let file = std::fs::File::create(&path)?;
            serde_json::to_writer_pretty(file, &document)?;
            println!(
                "✅ {} profiles written to {}",
                document.data.len(),
                path.display()
            );
        }
        None => {
            serde_json::to_writer_pretty(std::io::stdout(), &document)?;
            println!();
        }
    }
    Ok(())
}
