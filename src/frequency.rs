//! Per-class word frequency tables.
//!
//! A [`FrequencyTable`] counts how many times each token occurs across a
//! training corpus of one class. Tables are built in one pass by folding
//! documents into a fresh table and are never changed afterwards.
//!
//! # File Format
//!
//! Tables are stored as GB18030 CSV, sorted by descending frequency for
//! readability (readers do not depend on row order):
//! ```text
//! Word,Frequency
//! the,1532
//! free,210
//! ```

use crate::document::{self, read_document};
use crate::error::{Error, Result};
use crate::tokenizer::tokenize;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const HEADER: [&str; 2] = ["Word", "Frequency"];

#[derive(Debug, Serialize, Deserialize)]
struct FrequencyRow {
    #[serde(rename = "Word")]
    word: String,
    #[serde(rename = "Frequency")]
    frequency: u64,
}

/// Token occurrence counts for one training class.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: AHashMap<String, u64>,
}

impl FrequencyTable {
    /// Count every token of every document.
    ///
    /// Counting is commutative, so the order of `documents` never changes
    /// the result.
    ///
    /// # Example
    /// ```rust
    /// let table = FrequencyTable::aggregate(["buy now", "buy"]);
    /// assert_eq!(table.get("buy"), 2);
    /// ```
    pub fn aggregate<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        documents
            .into_iter()
            .fold(Self::default(), |mut table, document| {
                for token in tokenize(document.as_ref()) {
                    *table.counts.entry(token).or_insert(0) += 1;
                }
                table
            })
    }

    /// Count every document found under `directory`, recursively.
    ///
    /// Documents that cannot be read are logged and skipped.
    ///
    /// # Errors
    /// Returns [`Error::MissingDirectory`] if `directory` does not exist,
    /// or an IO error if `directory` itself cannot be listed.
    pub fn aggregate_directory(directory: &Path) -> Result<Self> {
        if !directory.is_dir() {
            return Err(Error::MissingDirectory {
                path: directory.to_path_buf(),
            });
        }

        let files = collect_files(directory)?;
        info!("Counting words in {} files under {}", files.len(), directory.display());

        let documents = files.iter().filter_map(|path| {
            debug!("Processing file: {}", path.display());
            match read_document(path) {
                Ok(text) => Some(text),
                Err(err) => {
                    warn!("Skipping document: {err}");
                    None
                }
            }
        });

        Ok(Self::aggregate(documents))
    }

    /// Occurrences of `word`, zero if it was never seen.
    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Total number of token occurrences.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Entries sorted by descending frequency, ties by word.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(word, &count)| (word.as_str(), count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Write the table as `Word,Frequency` CSV.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let rows = self.sorted().into_iter().map(|(word, frequency)| FrequencyRow {
            word: word.to_string(),
            frequency,
        });
        document::write_csv(path, &HEADER, rows)?;
        info!("Word frequency table saved to: {}", path.display());
        Ok(())
    }

    /// Read a table written by [`FrequencyTable::write_csv`].
    ///
    /// A word listed twice keeps its last count.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let rows: Vec<FrequencyRow> = document::read_csv(path)?;
        Ok(rows.into_iter().map(|row| (row.word, row.frequency)).collect())
    }
}

impl PartialEq for FrequencyTable {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .counts
                .iter()
                .all(|(word, &count)| other.counts.get(word) == Some(&count))
    }
}

impl Eq for FrequencyTable {}

impl FromIterator<(String, u64)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// All files below `directory`, in path order.
///
/// Directory links are listed but not descended into, so every document is
/// counted once. Only a failure to list `directory` itself is an error;
/// nested directories that cannot be listed are logged and skipped.
fn collect_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![directory.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if dir.as_path() != directory => {
                warn!("Skipping directory {}: {err}", dir.display());
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping entry of {}: {err}", dir.display());
                    continue;
                }
            };
            let path = entry.path();
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => pending.push(path),
                Ok(kind) if kind.is_symlink() && path.is_dir() => {
                    debug!("Not following directory link: {}", path.display());
                }
                Ok(_) => files.push(path),
                Err(err) => warn!("Skipping {}: {err}", path.display()),
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    #[test]
    fn test_aggregate_counts_tokens() {
        let table = FrequencyTable::aggregate(["Buy FREE pills", "free money, free!"]);
        assert_eq!(table.get("free"), 3);
        assert_eq!(table.get("buy"), 1);
        assert_eq!(table.get("missing"), 0);
        assert_eq!(table.len(), 4);
        assert_eq!(table.total(), 6);
    }

    #[test]
    fn test_aggregate_empty() {
        let table = FrequencyTable::aggregate(Vec::<String>::new());
        assert!(table.is_empty());
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let mut documents = vec![
            "cheap meds online",
            "meeting moved to friday",
            "online meeting link",
            "cheap cheap cheap",
            "",
            "Re: friday lunch?",
        ];
        let expected = FrequencyTable::aggregate(&documents);

        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..10 {
            documents.shuffle(&mut rng);
            assert_eq!(FrequencyTable::aggregate(&documents), expected);
        }
    }

    #[test]
    fn test_sorted_by_descending_frequency() {
        let table = FrequencyTable::aggregate(["b a a c c"]);
        assert_eq!(table.sorted(), vec![("a", 2), ("c", 2), ("b", 1)]);
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TRAINING_SPAM_word_frequency.csv");
        let table = FrequencyTable::aggregate(["免费 offer offer", "winner"]);

        table.write_csv(&path).unwrap();
        let text = document::read_text(&path).unwrap();
        assert!(text.starts_with("Word,Frequency\n"));
        assert_eq!(FrequencyTable::read_csv(&path).unwrap(), table);
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        FrequencyTable::default().write_csv(&path).unwrap();
        assert_eq!(document::read_text(&path).unwrap(), "Word,Frequency\n");
        assert!(FrequencyTable::read_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_directory_recurses() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("a.eml"), document::encode("Win a prize")).unwrap();
        std::fs::write(
            nested.join("b.html"),
            document::encode("<p>prize <script>ignored()</script>claim</p>"),
        )
        .unwrap();

        let table = FrequencyTable::aggregate_directory(dir.path()).unwrap();
        assert_eq!(table.get("prize"), 2);
        assert_eq!(table.get("claim"), 1);
        assert_eq!(table.get("ignored"), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_aggregate_directory_does_not_follow_directory_links() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        std::fs::write(real.join("a.eml"), document::encode("prize")).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("alias")).unwrap();
        std::os::unix::fs::symlink(".", dir.path().join("loop")).unwrap();

        let table = FrequencyTable::aggregate_directory(dir.path()).unwrap();
        assert_eq!(table.get("prize"), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_aggregate_directory_skips_unreadable_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.eml"), document::encode("free prize")).unwrap();
        std::fs::write(dir.path().join("c.eml"), document::encode("prize")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.eml"), dir.path().join("b.eml"))
            .unwrap();

        let table = FrequencyTable::aggregate_directory(dir.path()).unwrap();
        assert_eq!(table.get("prize"), 2);
        assert_eq!(table.get("free"), 1);
        assert_eq!(table.total(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_aggregate_directory_skips_unlistable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("hidden.eml"), document::encode("secret")).unwrap();
        std::fs::write(dir.path().join("a.eml"), document::encode("prize")).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let listable = std::fs::read_dir(&locked).is_ok();
        let result = FrequencyTable::aggregate_directory(dir.path());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        let table = result.unwrap();
        assert_eq!(table.get("prize"), 1);
        // Privileged users can still list the directory.
        if !listable {
            assert_eq!(table.get("secret"), 0);
        }
    }

    #[test]
    fn test_aggregate_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = FrequencyTable::aggregate_directory(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::MissingDirectory { .. }));
    }
}
