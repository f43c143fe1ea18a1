use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const APP_NAME: &str = "spamfilter";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub train_spam_dir: PathBuf,
    pub train_clean_dir: PathBuf,
    pub spam_frequency_csv: PathBuf,
    pub clean_frequency_csv: PathBuf,
    pub ratio_csv: PathBuf,
    pub test_dir: PathBuf,
    pub results_csv: PathBuf,
    pub results_txt: PathBuf,
    /// `lang` or `fixed=<value>`
    pub confidence: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            train_spam_dir: PathBuf::from("./Train/Spam"),
            train_clean_dir: PathBuf::from("./Train/Clean"),
            spam_frequency_csv: PathBuf::from("TRAINING_SPAM_word_frequency.csv"),
            clean_frequency_csv: PathBuf::from("TRAINING_CLEAN_word_frequency.csv"),
            ratio_csv: PathBuf::from("Word_Spam_Probability.csv"),
            test_dir: PathBuf::from("./Test(Spam-are-marked)"),
            results_csv: PathBuf::from("email_classification_results.csv"),
            results_txt: PathBuf::from("results.txt"),
            confidence: "lang".to_string(),
        }
    }
}

impl Config {
    /// Load the per-user configuration, falling back to defaults on error.
    ///
    /// A missing file is created with the defaults. A file that fails to
    /// parse is left untouched.
    pub fn load() -> Self {
        match confy::get_configuration_file_path(APP_NAME, Some("config")) {
            Ok(path) => Self::load_or_default(&path),
            Err(err) => {
                warn!("Failed to locate config, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Load the configuration stored at `path`, creating it with defaults
    /// if it does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(confy::load_path(path)?)
    }

    /// Like [`Config::load_from`], but a broken file yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "Failed to load config {}, using defaults: {err}",
                    path.display()
                );
                Self::default()
            }
        }
    }
}
