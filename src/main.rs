//! Spamfilter - a word-frequency email spam classifier.
//!
//! # Overview
//!
//! Classification runs in three phases:
//! 1. Count the words of each training class (`Train/Spam`, `Train/Clean`)
//!    into a frequency table per class
//! 2. Combine the two tables into a per-word spam / not-spam ratio model
//! 3. Classify every message of a test folder against the ratio model
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Email files    │ ← GB18030 text or HTML (document.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Tokenizer      │ ← Lowercase word runs (tokenizer.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Frequency table │ ← Per-class word counts (frequency.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Ratio model    │ ← Per-word spam / not-spam ratios (ratio.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Classifier     │ ← Log-space scoring (classifier.rs, confidence.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Reports        │ ← results.txt and results CSV (report.rs)
//! └─────────────────┘
//! ```
//!
//! Every intermediate artifact is a CSV file, so each phase can be rerun
//! on its own.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod classifier;
mod confidence;
mod config;
mod document;
mod error;
mod frequency;
mod project;
mod ratio;
mod report;
mod tokenizer;

use confidence::OracleKind;
use config::Config;
use frequency::FrequencyTable;
use ratio::RatioModel;
use report::ScanSummary;

#[derive(Parser, Debug)]
#[command(name = "spamfilter")]
#[command(about = "Naive Bayes email spam classifier")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to the per-user configuration)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ignore configuration files and use built-in defaults
    #[arg(long, global = true)]
    no_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count the word frequencies of one training class
    Count {
        #[arg(value_enum)]
        class: TrainingClass,
    },

    /// Combine both frequency tables into the word ratio model
    Ratios,

    /// Count both training classes, then build the word ratio model
    Train,

    /// Classify every message of a folder (the default command)
    Scan {
        /// Folder of messages to classify
        #[arg(requires = "output_file")]
        folder: Option<PathBuf>,

        /// Plain-text results file
        output_file: Option<PathBuf>,

        /// Confidence source: `lang` or `fixed=<value>`
        #[arg(long)]
        confidence: Option<OracleKind>,
    },

    /// Write project information as JSON
    Info { output_file: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TrainingClass {
    Spam,
    Clean,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spamfilter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    match args.command.unwrap_or(Command::Scan {
        folder: None,
        output_file: None,
        confidence: None,
    }) {
        Command::Count { class } => {
            info!("==================== PHASE 1: WORD COUNTING ====================");
            count_words(&config, class)
        }
        Command::Ratios => {
            info!("==================== PHASE 2: WORD SPAM PROBABILITY COMPUTING ====================");
            build_ratios(&config)
        }
        Command::Train => {
            info!("==================== PHASE 1: WORD COUNTING ====================");
            count_words(&config, TrainingClass::Clean)?;
            count_words(&config, TrainingClass::Spam)?;
            info!("==================== PHASE 2: WORD SPAM PROBABILITY COMPUTING ====================");
            build_ratios(&config)
        }
        Command::Scan {
            folder,
            output_file,
            confidence,
        } => {
            let folder = folder.unwrap_or_else(|| config.test_dir.clone());
            let output_file = output_file.unwrap_or_else(|| config.results_txt.clone());
            let confidence = match confidence {
                Some(kind) => kind,
                None => config
                    .confidence
                    .parse::<OracleKind>()
                    .map_err(anyhow::Error::msg)
                    .context("invalid `confidence` in configuration")?,
            };
            info!("==================== PHASE 3: EMAIL SPAM PROBABILITY COMPUTING ====================");
            scan(&config, &folder, &output_file, confidence)
        }
        Command::Info { output_file } => {
            project::ProjectInfo::current().write(&output_file)?;
            Ok(())
        }
    }
}

/// Resolve the configuration, persisting defaults for first-time users.
fn load_config(args: &Args) -> anyhow::Result<Config> {
    if args.no_config {
        return Ok(Config::default());
    }

    if let Some(path) = &args.config {
        return Config::load_from(path)
            .with_context(|| format!("failed to load configuration {}", path.display()));
    }

    Ok(Config::load())
}

fn count_words(config: &Config, class: TrainingClass) -> anyhow::Result<()> {
    let (directory, output) = match class {
        TrainingClass::Spam => (&config.train_spam_dir, &config.spam_frequency_csv),
        TrainingClass::Clean => (&config.train_clean_dir, &config.clean_frequency_csv),
    };

    let table = FrequencyTable::aggregate_directory(directory)?;
    if table.is_empty() {
        warn!("No words found under {}", directory.display());
    }
    info!(
        "{:?} corpus: {} distinct words, {} occurrences",
        class,
        table.len(),
        table.total()
    );
    table.write_csv(output)?;
    Ok(())
}

fn build_ratios(config: &Config) -> anyhow::Result<()> {
    let spam = FrequencyTable::read_csv(&config.spam_frequency_csv)
        .with_context(|| format!("failed to read {}", config.spam_frequency_csv.display()))?;
    let clean = FrequencyTable::read_csv(&config.clean_frequency_csv)
        .with_context(|| format!("failed to read {}", config.clean_frequency_csv.display()))?;

    RatioModel::build(&spam, &clean).write_csv(&config.ratio_csv)?;
    Ok(())
}

/// Classify `folder` and write both reports.
///
/// Only a model that cannot be loaded fails the run; a missing folder or a
/// folder without any readable message is logged.
fn scan(
    config: &Config,
    folder: &std::path::Path,
    output_file: &std::path::Path,
    confidence: OracleKind,
) -> anyhow::Result<()> {
    let model = RatioModel::load(&config.ratio_csv)?;
    let oracle = confidence.oracle();
    info!("Scoring with confidence source '{confidence}'");

    let reports = match report::scan_directory(folder, &model, oracle.as_ref()) {
        Ok(reports) => reports,
        Err(err @ error::Error::MissingDirectory { .. }) => {
            tracing::error!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    report::write_text_report(output_file, &reports)?;

    let summary = ScanSummary::of(&reports);
    info!(
        "Classified {} messages: {} spam, {} not spam, {} errors",
        summary.classified(),
        summary.spam,
        summary.not_spam,
        summary.errors
    );

    match report::write_csv_report(&config.results_csv, folder, &reports) {
        Ok(()) => Ok(()),
        Err(err @ error::Error::EmptyResults { .. }) => {
            warn!("{err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
