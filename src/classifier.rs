//! Spam classification of a tokenized message.
//!
//! # Scoring
//!
//! Evidence is summed in log space so long messages do not underflow. For
//! every token present in the [`RatioModel`], with `w` the confidence
//! weight of the token:
//!
//! ```text
//! log_spam     += ln(1 - w + ε) + ln(spam_ratio + ε)
//! log_not_spam += ln(w + ε)     + ln(not_spam_ratio + ε)
//! ```
//!
//! Tokens missing from the model contribute nothing. A message is spam only
//! if `log_spam > log_not_spam`; ties (including a message with no known
//! token) are not spam.

use crate::confidence::{weight, ConfidenceOracle};
use crate::ratio::RatioModel;
use crate::tokenizer::tokenize;
use std::fmt;

/// Floor added to every logarithm argument so that `ln(0)` stays finite.
pub const EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Spam,
    NotSpam,
}

impl Label {
    /// Name used in the results CSV.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "spam",
            Label::NotSpam => "not spam",
        }
    }

    /// Three-letter code used in the plain-text results.
    pub fn code(&self) -> &'static str {
        match self {
            Label::Spam => "inf",
            Label::NotSpam => "cln",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision for one message, with the scores that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: Label,
    pub log_spam: f64,
    pub log_not_spam: f64,
    /// The scored tokens joined by single spaces.
    pub content: String,
}

/// Classify `tokens` against `model`, weighting each known token by the
/// confidence `oracle` reports for it.
pub fn classify(
    tokens: &[String],
    model: &RatioModel,
    oracle: &dyn ConfidenceOracle,
) -> ClassificationResult {
    let mut log_spam = 0.0f64;
    let mut log_not_spam = 0.0f64;

    for token in tokens {
        let Some(entry) = model.get(token) else {
            continue;
        };

        let w = weight(oracle.confidence(token));
        log_spam += (1.0 - w + EPSILON).ln() + (entry.spam_ratio() + EPSILON).ln();
        log_not_spam += (w + EPSILON).ln() + (entry.not_spam_ratio() + EPSILON).ln();
    }

    let label = if log_spam > log_not_spam {
        Label::Spam
    } else {
        Label::NotSpam
    };

    ClassificationResult {
        label,
        log_spam,
        log_not_spam,
        content: tokens.join(" "),
    }
}

/// Tokenize `text` and classify it.
pub fn classify_text(
    text: &str,
    model: &RatioModel,
    oracle: &dyn ConfidenceOracle,
) -> ClassificationResult {
    classify(&tokenize(text), model, oracle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::FixedConfidence;
    use crate::frequency::FrequencyTable;

    fn scenario_model() -> RatioModel {
        let spam: FrequencyTable = [("buy".to_string(), 10), ("free".to_string(), 5)]
            .into_iter()
            .collect();
        let clean: FrequencyTable = [("hello".to_string(), 8), ("meeting".to_string(), 6)]
            .into_iter()
            .collect();
        RatioModel::build(&spam, &clean)
    }

    #[test]
    fn test_unknown_words_are_neutral() {
        let model = scenario_model();
        let result = classify_text("nothing known here", &model, &FixedConfidence(0.0));
        assert_eq!(result.log_spam, 0.0);
        assert_eq!(result.log_not_spam, 0.0);
        assert_eq!(result.label, Label::NotSpam);
        assert_eq!(result.content, "nothing known here");
    }

    #[test]
    fn test_empty_message_is_not_spam() {
        let result = classify(&[], &scenario_model(), &FixedConfidence(50.0));
        assert_eq!(result.label, Label::NotSpam);
        assert_eq!(result.content, "");
    }

    #[test]
    fn test_clean_word_message() {
        let model = scenario_model();
        // w = 0.5
        let result = classify_text("let's meet for a meeting", &model, &FixedConfidence(0.0));
        assert_eq!(result.content, "let s meet for a meeting");

        let expected_spam = (0.5 + EPSILON).ln() + EPSILON.ln();
        let expected_not_spam = (0.5 + EPSILON).ln() + (1.0 + EPSILON).ln();
        assert_eq!(result.log_spam, expected_spam);
        assert_eq!(result.log_not_spam, expected_not_spam);
        assert!(result.log_spam < -20.0);
        assert_eq!(result.label, Label::NotSpam);
    }

    #[test]
    fn test_spam_words_with_zero_weight() {
        let model = scenario_model();
        // confidence -10 gives w = 0
        let result = classify_text("BUY free, buy!", &model, &FixedConfidence(-10.0));
        assert!(result.log_spam.abs() < 1e-6);
        assert!(result.log_not_spam < -100.0);
        assert_eq!(result.label, Label::Spam);
    }

    #[test]
    fn test_confidence_comes_from_oracle_per_word() {
        let model = scenario_model();
        let oracle = |word: &str| if word == "buy" { -10.0 } else { 0.0 };
        let result = classify_text("buy hello", &model, &oracle);

        let w_hello = 0.5;
        let buy = (1.0 + EPSILON).ln() + (1.0 + EPSILON).ln();
        let hello = (1.0 - w_hello + EPSILON).ln() + EPSILON.ln();
        let expected_spam = buy + hello;
        assert_eq!(result.log_spam, expected_spam);
    }

    #[test]
    fn test_weight_above_one_is_not_clamped() {
        let model = scenario_model();
        // w = 5.5, so ln(1 - w + ε) is NaN and the message cannot be spam
        let result = classify_text("buy", &model, &FixedConfidence(100.0));
        assert!(result.log_spam.is_nan());
        assert_eq!(result.label, Label::NotSpam);
    }

    #[test]
    fn test_label_names() {
        assert_eq!(Label::Spam.as_str(), "spam");
        assert_eq!(Label::NotSpam.to_string(), "not spam");
        assert_eq!(Label::Spam.code(), "inf");
        assert_eq!(Label::NotSpam.code(), "cln");
    }
}
