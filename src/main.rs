mod analysis;
mod corpus;
mod db;
mod error;
mod extract;
mod settings;
mod store;
mod text;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use analysis::report::AnalysisReport;
use analysis::tables::ClassificationTables;
use extract::report::ExtractionReport;
use extract::Extractor;
use settings::Settings;
use store::TitleQuery;

#[derive(Parser)]
#[command(
    name = "talmud_corpus",
    about = "Talmudic commentary extraction and corpus statistics"
)]
struct Cli {
    /// SQLite document store (default: data/texts.sqlite)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Corpus root holding one directory per scholar (default: data)
    #[arg(long, global = true)]
    corpus_dir: Option<PathBuf>,
    /// Where report files are written (default: current directory)
    #[arg(long, global = true)]
    report_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a JSON-lines dump of {title, language, chapter} records
    Import {
        file: PathBuf,
    },
    /// Write one corpus file per commentary on a Bavli tractate
    Extract,
    /// Compute corpus statistics and write the analysis report
    Aggregate {
        /// JSON file overriding the period, length and seder tables
        #[arg(long)]
        tables: Option<PathBuf>,
    },
    /// Show document counts in the store
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load settings")?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }
    if let Some(dir) = cli.corpus_dir {
        settings.corpus_dir = dir;
    }
    if let Some(dir) = cli.report_dir {
        settings.report_dir = dir;
    }
    info!(settings = ?settings, "Starting");

    let result = match cli.command {
        Commands::Import { file } => {
            let reader = File::open(&file)
                .with_context(|| format!("failed to open {}", file.display()))?;
            let (docs, malformed) = store::read_jsonl(BufReader::new(reader))?;
            let conn = open_store(&settings)?;
            let inserted = db::insert_documents(&conn, &docs)?;
            println!("Imported {} documents ({} malformed lines skipped)", inserted, malformed);
            Ok(())
        }
        Commands::Extract => {
            let conn = open_store(&settings)?;
            let query = TitleQuery::talmud(&settings.language)?;
            let store = db::SqliteStore::new(&conn);
            let extractor = Extractor::new(&settings.corpus_dir).with_progress(true);
            let outcome = extractor.run(&store, &query)?;
            if outcome.stats.total_documents == 0 {
                println!("No commentary documents found. Run 'import' first.");
                return Ok(());
            }

            let report = ExtractionReport::from_outcome(&outcome);
            report
                .write(&settings.report_dir)
                .context("failed to write extraction report")?;
            println!("{}", report.render());
            println!(
                "Corpus: {}  Report: {}",
                extractor.corpus_root().display(),
                settings.report_dir.join(extract::report::REPORT_FILE).display()
            );
            Ok(())
        }
        Commands::Aggregate { tables } => {
            let tables = match tables {
                Some(path) => ClassificationTables::load(&path)
                    .with_context(|| format!("failed to load tables from {}", path.display()))?,
                None => ClassificationTables::default(),
            };
            let bundle = analysis::aggregate(&settings.corpus_dir, &tables).with_context(|| {
                format!("failed to read corpus at {}", settings.corpus_dir.display())
            })?;

            let report = AnalysisReport::new(&settings.corpus_dir, bundle)
                .with_extraction(&settings.report_dir);
            report
                .write(&settings.report_dir)
                .context("failed to write analysis report")?;
            println!("{}", report.render());
            println!(
                "Report: {}",
                settings.report_dir.join(analysis::report::REPORT_FILE).display()
            );
            Ok(())
        }
        Commands::Stats => {
            let conn = open_store(&settings)?;
            let s = db::get_stats(&conn, &settings.language)?;
            println!("Total:      {}", s.total);
            println!("Language:   {} ({})", s.in_language, settings.language);
            println!("Candidates: {}", s.candidates);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn open_store(settings: &Settings) -> anyhow::Result<rusqlite::Connection> {
    let conn = db::connect(&settings.db_path)
        .with_context(|| format!("failed to open {}", settings.db_path.display()))?;
    db::init_schema(&conn)?;
    Ok(conn)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
