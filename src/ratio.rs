//! Spam / not-spam ratios per word.
//!
//! The ratio model merges the two training [`FrequencyTable`]s. Every word
//! seen in at least one class gets a [`RatioEntry`] whose two ratios sum to
//! exactly `1.0`.
//!
//! # Certainty Policy
//!
//! No smoothing is applied. A word seen only in spam gets the ratios
//! `(1, 0)` whether it occurred once or ten thousand times, and a word seen
//! only in clean mail gets `(0, 1)`. Rare exclusive words therefore weigh as
//! much as common ones when classifying.
//!
//! # File Format
//!
//! ```text
//! Word,Spam Frequency,Not Spam Frequency,Spam Ratio,Not Spam Ratio
//! free,5,1,0.8333333333333334,0.16666666666666666
//! ```

use crate::document;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const HEADER: [&str; 5] = [
    "Word",
    "Spam Frequency",
    "Not Spam Frequency",
    "Spam Ratio",
    "Not Spam Ratio",
];

/// Largest accepted deviation from `1.0` for ratios read from a file.
const RATIO_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Serialize, Deserialize)]
struct RatioRow {
    #[serde(rename = "Word")]
    word: String,
    #[serde(rename = "Spam Frequency")]
    spam_count: u64,
    #[serde(rename = "Not Spam Frequency")]
    not_spam_count: u64,
    #[serde(rename = "Spam Ratio")]
    spam_ratio: f64,
    #[serde(rename = "Not Spam Ratio")]
    not_spam_ratio: f64,
}

/// Counts and ratios of one word across both training classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioEntry {
    spam_count: u64,
    not_spam_count: u64,
    spam_ratio: f64,
    not_spam_ratio: f64,
}

impl RatioEntry {
    /// Derive the ratios from the two class counts.
    ///
    /// Returns `None` when the word was seen in neither class.
    pub fn from_counts(spam_count: u64, not_spam_count: u64) -> Option<Self> {
        let (spam_ratio, not_spam_ratio) = match (spam_count, not_spam_count) {
            (0, 0) => return None,
            (_, 0) => (1.0, 0.0),
            (0, _) => (0.0, 1.0),
            (s, c) => {
                let total = (s + c) as f64;
                // The larger share is the complement of the smaller one so
                // that the two always add up to 1.0 without rounding error.
                if s <= c {
                    let spam_ratio = s as f64 / total;
                    (spam_ratio, 1.0 - spam_ratio)
                } else {
                    let not_spam_ratio = c as f64 / total;
                    (1.0 - not_spam_ratio, not_spam_ratio)
                }
            }
        };

        Some(Self {
            spam_count,
            not_spam_count,
            spam_ratio,
            not_spam_ratio,
        })
    }

    /// Rebuild an entry from stored values, checking the ratios.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRatio`] if a ratio lies outside `[0, 1]` or
    /// the two do not sum to one.
    pub fn from_stored(
        word: &str,
        spam_count: u64,
        not_spam_count: u64,
        spam_ratio: f64,
        not_spam_ratio: f64,
    ) -> Result<Self> {
        let in_range = |r: f64| (0.0..=1.0).contains(&r);
        if !in_range(spam_ratio)
            || !in_range(not_spam_ratio)
            || (spam_ratio + not_spam_ratio - 1.0).abs() > RATIO_TOLERANCE
        {
            return Err(Error::InvalidRatio {
                word: word.to_string(),
                spam_ratio,
                not_spam_ratio,
            });
        }

        Ok(Self {
            spam_count,
            not_spam_count,
            spam_ratio,
            not_spam_ratio,
        })
    }

    pub fn spam_count(&self) -> u64 {
        self.spam_count
    }

    pub fn not_spam_count(&self) -> u64 {
        self.not_spam_count
    }

    pub fn spam_ratio(&self) -> f64 {
        self.spam_ratio
    }

    pub fn not_spam_ratio(&self) -> f64 {
        self.not_spam_ratio
    }
}

/// Read-only word → [`RatioEntry`] mapping used by the classifier.
#[derive(Debug, Clone, Default)]
pub struct RatioModel {
    entries: AHashMap<String, RatioEntry>,
}

impl RatioModel {
    /// Combine the spam and clean tables over the union of their words.
    pub fn build(spam: &FrequencyTable, clean: &FrequencyTable) -> Self {
        let entries = spam
            .words()
            .chain(clean.words().filter(|word| !spam.contains(word)))
            .filter_map(|word| {
                RatioEntry::from_counts(spam.get(word), clean.get(word))
                    .map(|entry| (word.to_string(), entry))
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, word: &str) -> Option<&RatioEntry> {
        self.entries.get(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by word.
    pub fn sorted(&self) -> Vec<(&str, &RatioEntry)> {
        let mut entries: Vec<(&str, &RatioEntry)> = self
            .entries
            .iter()
            .map(|(word, entry)| (word.as_str(), entry))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Write the model as the combined ratio CSV.
    ///
    /// Ratios are written in shortest round-trip form, so reading the file
    /// back yields bit-identical values.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let rows = self.sorted().into_iter().map(|(word, entry)| RatioRow {
            word: word.to_string(),
            spam_count: entry.spam_count(),
            not_spam_count: entry.not_spam_count(),
            spam_ratio: entry.spam_ratio(),
            not_spam_ratio: entry.not_spam_ratio(),
        });
        document::write_csv(path, &HEADER, rows)?;
        info!(
            "Combined word frequencies ({} words) written to {}",
            self.len(),
            path.display()
        );
        Ok(())
    }

    /// Read a model written by [`RatioModel::write_csv`].
    pub fn read_csv(path: &Path) -> Result<Self> {
        let rows: Vec<RatioRow> = document::read_csv(path)?;
        let entries = rows
            .into_iter()
            .map(|row| {
                let entry = RatioEntry::from_stored(
                    &row.word,
                    row.spam_count,
                    row.not_spam_count,
                    row.spam_ratio,
                    row.not_spam_ratio,
                )?;
                Ok((row.word, entry))
            })
            .collect::<Result<AHashMap<_, _>>>()?;

        Ok(Self { entries })
    }

    /// Load the model the classifier runs against.
    ///
    /// # Errors
    /// Any read or parse failure becomes [`Error::MissingModel`]; a file
    /// without rows becomes [`Error::EmptyModel`].
    pub fn load(path: &Path) -> Result<Self> {
        let model = Self::read_csv(path).map_err(|err| Error::MissingModel {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        if model.is_empty() {
            return Err(Error::EmptyModel {
                path: path.to_path_buf(),
            });
        }

        info!("Loaded word ratio model with {} words", model.len());
        Ok(model)
    }
}
