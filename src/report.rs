//! Classification of a directory of test messages and the result files.
//!
//! Every direct entry of the scanned directory gets one line in the text
//! report:
//!
//! ```text
//! Offer_(SPAM).eml|inf
//! minutes.eml|cln
//! broken.eml|err
//! ```
//!
//! Spaces in file names become underscores. `inf` marks spam, `cln` marks
//! clean mail and `err` marks an entry that could not be read. Unreadable
//! entries are left out of the CSV report, which only lists messages that
//! were actually classified.

use crate::classifier::{classify_text, ClassificationResult, Label};
use crate::confidence::ConfidenceOracle;
use crate::document::{self, read_document};
use crate::error::{Error, Result};
use crate::ratio::RatioModel;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

pub const HEADER: [&str; 3] = ["Filename", "Content", "Classification"];

/// Text-report code for an entry that could not be classified.
pub const ERROR_CODE: &str = "err";

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    #[serde(rename = "Filename")]
    filename: &'a str,
    #[serde(rename = "Content")]
    content: &'a str,
    #[serde(rename = "Classification")]
    classification: &'static str,
}

/// What happened to one scanned entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Classified(ClassificationResult),
    /// The entry could not be read; it counts as neither spam nor clean.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageReport {
    pub filename: String,
    pub outcome: Outcome,
}

impl MessageReport {
    /// The line written to the text report, without the newline.
    pub fn text_line(&self) -> String {
        let code = match &self.outcome {
            Outcome::Classified(result) => result.label.code(),
            Outcome::Error => ERROR_CODE,
        };
        format!("{}|{}", self.filename.replace(' ', "_"), code)
    }
}

/// Counts per outcome of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub spam: usize,
    pub not_spam: usize,
    pub errors: usize,
}

impl ScanSummary {
    pub fn of(reports: &[MessageReport]) -> Self {
        reports
            .iter()
            .fold(Self::default(), |mut summary, report| {
                match &report.outcome {
                    Outcome::Classified(result) if result.label == Label::Spam => summary.spam += 1,
                    Outcome::Classified(_) => summary.not_spam += 1,
                    Outcome::Error => summary.errors += 1,
                }
                summary
            })
    }

    pub fn classified(&self) -> usize {
        self.spam + self.not_spam
    }
}

/// Classify every direct entry of `directory`, in file name order.
///
/// Entries that cannot be read are logged and reported as
/// [`Outcome::Error`]; they never stop the scan.
///
/// # Errors
/// Returns [`Error::MissingDirectory`] if `directory` does not exist, or an
/// IO error if it cannot be listed.
pub fn scan_directory(
    directory: &Path,
    model: &RatioModel,
    oracle: &dyn ConfidenceOracle,
) -> Result<Vec<MessageReport>> {
    if !directory.is_dir() {
        return Err(Error::MissingDirectory {
            path: directory.to_path_buf(),
        });
    }

    let mut entries = std::fs::read_dir(directory)?
        .map(|entry| entry.map(|e| (e.file_name().to_string_lossy().into_owned(), e.path())))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    let reports = entries
        .into_iter()
        .map(|(filename, path)| {
            let outcome = match read_document(&path) {
                Ok(text) => {
                    let result = classify_text(&text, model, oracle);
                    debug!(
                        "{filename}: {} (spam {:.4}, not spam {:.4})",
                        result.label, result.log_spam, result.log_not_spam
                    );
                    Outcome::Classified(result)
                }
                Err(err) => {
                    warn!("Error processing file '{filename}': {err}");
                    Outcome::Error
                }
            };
            MessageReport { filename, outcome }
        })
        .collect();

    Ok(reports)
}

/// Write one line per report, error entries included.
pub fn write_text_report(path: &Path, reports: &[MessageReport]) -> Result<()> {
    let text: String = reports
        .iter()
        .map(|report| report.text_line() + "\n")
        .collect();
    document::write_text(path, &text)?;
    info!("(Text version) Classification results saved to {}", path.display());
    Ok(())
}

/// Write the classified messages as CSV, leaving out error entries.
///
/// # Errors
/// Returns [`Error::EmptyResults`] without writing anything when no message
/// was classified.
pub fn write_csv_report(path: &Path, directory: &Path, reports: &[MessageReport]) -> Result<()> {
    let rows: Vec<ResultRow<'_>> = reports
        .iter()
        .filter_map(|report| match &report.outcome {
            Outcome::Classified(result) => Some(ResultRow {
                filename: &report.filename,
                content: &result.content,
                classification: result.label.as_str(),
            }),
            Outcome::Error => None,
        })
        .collect();

    if rows.is_empty() {
        return Err(Error::EmptyResults {
            directory: directory.to_path_buf(),
        });
    }

    document::write_csv(path, &HEADER, rows)?;
    info!("Classification results saved to {}", path.display());
    Ok(())
}
