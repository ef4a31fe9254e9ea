use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{Prediction, SentimentClassifier};
use crate::error::ClassifierError;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Offline classifier over an integer word lexicon, with negation handling.
/// Emits `POSITIVE` / `NEGATIVE` / `NEUTRAL`.
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (score, token count).
    /// A negator among the previous 1..=3 tokens inverts the word's sign.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }

    pub fn predict_sync(&self, text: &str) -> Prediction {
        let (score, _) = self.score_text(text);
        let label = match score.signum() {
            1 => "POSITIVE",
            -1 => "NEGATIVE",
            _ => "NEUTRAL",
        };
        // confidence in [0.5, 1): grows with the absolute lexicon score
        let s = score.unsigned_abs() as f64;
        Prediction {
            label: label.to_string(),
            score: 0.5 + 0.5 * s / (s + 3.0),
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        Ok(self.predict_sync(text))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

/// Alphanumeric lower-case tokens.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "without" | "cannot" | "isn" | "wasn" | "aren" | "won" | "didn" | "doesn"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_score_sign() {
        let c = LexiconClassifier::new();
        assert_eq!(c.predict_sync("Stocks rallied to a record").label, "POSITIVE");
        assert_eq!(c.predict_sync("Shares plunged amid recession fears").label, "NEGATIVE");
        assert_eq!(c.predict_sync("The meeting is on Tuesday").label, "NEUTRAL");
    }

    #[test]
    fn negation_inverts() {
        let c = LexiconClassifier::new();
        let (plain, _) = c.score_text("earnings were good");
        let (neg, _) = c.score_text("earnings were not good");
        assert_eq!(plain, 2);
        assert_eq!(neg, -2);
    }

    #[test]
    fn contraction_negators() {
        let c = LexiconClassifier::new();
        // "isn't" tokenizes to "isn" + "t"
        let (s, _) = c.score_text("the outlook isn't strong");
        assert_eq!(s, -2);
    }

    #[test]
    fn score_in_range() {
        let c = LexiconClassifier::new();
        for t in ["", "great great great great", "crash crash"] {
            let p = c.predict_sync(t);
            assert!((0.5..1.0).contains(&p.score), "{t}: {}", p.score);
        }
    }
}
