//! Error types shared by every phase of the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spamfilter operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A single training or test document could not be read.
    #[error("failed to read document {}: {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ratio table could not be loaded.
    #[error("failed to load word ratio model {}: {reason}", path.display())]
    MissingModel { path: PathBuf, reason: String },

    /// The ratio table loaded but holds no words.
    #[error("word ratio model {} contains no words", path.display())]
    EmptyModel { path: PathBuf },

    /// No message in the scanned directory was classified.
    #[error("no valid emails were processed in {}", directory.display())]
    EmptyResults { directory: PathBuf },

    #[error("directory {} does not exist", path.display())]
    MissingDirectory { path: PathBuf },

    /// A ratio row whose ratios are out of range or do not sum to one.
    #[error("invalid ratios for '{word}': spam {spam_ratio}, not spam {not_spam_ratio}")]
    InvalidRatio {
        word: String,
        spam_ratio: f64,
        not_spam_ratio: f64,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] confy::ConfyError),
}
