//! Per-word confidence signal used to weight classifier evidence.
//!
//! The classifier asks an injected [`ConfidenceOracle`] for a score in
//! `[0, 100]` for every word it scores. The default oracle is the
//! language-identification confidence reported by `whatlang`; tests and
//! experiments use [`FixedConfidence`] or a plain closure.

use std::fmt;
use std::str::FromStr;
use whatlang::detect;

/// Source of the per-word confidence score.
pub trait ConfidenceOracle {
    /// Confidence for `word`, nominally in `[0, 100]`.
    fn confidence(&self, word: &str) -> f64;
}

impl<F> ConfidenceOracle for F
where
    F: Fn(&str) -> f64,
{
    fn confidence(&self, word: &str) -> f64 {
        self(word)
    }
}

/// Language-identification confidence of a single word, scaled to
/// `[0, 100]`. Words whose language cannot be detected score 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageConfidence;

impl ConfidenceOracle for LanguageConfidence {
    fn confidence(&self, word: &str) -> f64 {
        detect(word).map_or(0.0, |info| info.confidence() * 100.0)
    }
}

/// The same confidence for every word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedConfidence(pub f64);

impl ConfidenceOracle for FixedConfidence {
    fn confidence(&self, _word: &str) -> f64 {
        self.0
    }
}

/// Map a confidence score to the weight applied to a word's evidence.
///
/// The result is not clamped. Confidences above 10 give a weight above 1,
/// so `1 - weight` goes negative and the spam term of the classifier turns
/// NaN; confidences below -10 do the same to the not-spam term.
pub fn weight(confidence: f64) -> f64 {
    (confidence + 10.0) / 20.0
}

/// Oracle selection from the command line: `lang` or `fixed=<value>`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OracleKind {
    #[default]
    Language,
    Fixed(f64),
}

impl OracleKind {
    pub fn oracle(self) -> Box<dyn ConfidenceOracle> {
        match self {
            OracleKind::Language => Box::new(LanguageConfidence),
            OracleKind::Fixed(value) => Box::new(FixedConfidence(value)),
        }
    }
}

impl FromStr for OracleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            None if s == "lang" => Ok(OracleKind::Language),
            Some(("fixed", value)) => value
                .trim()
                .parse::<f64>()
                .map(OracleKind::Fixed)
                .map_err(|e| format!("invalid fixed confidence '{value}': {e}")),
            _ => Err(format!("unknown confidence source '{s}', expected 'lang' or 'fixed=<value>'")),
        }
    }
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleKind::Language => write!(f, "lang"),
            OracleKind::Fixed(value) => write!(f, "fixed={value}"),
        }
    }
}
