//! Polarity/subjectivity analyzer used for the sentiment-strength signal.
//!
//! Lexicon-based: every known word carries `(polarity, subjectivity)`.
//! A preceding intensifier scales the next sentiment word, a negator within
//! the last three tokens flips its polarity with damping (×-0.5). Results are
//! averaged over matched words. Independent from the classifier that produces
//! `sentiment_label`.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Deserialize)]
struct LexiconFile {
    words: HashMap<String, (f64, f64)>,
    #[serde(default)]
    intensifiers: HashMap<String, f64>,
    #[serde(default)]
    negations: HashSet<String>,
}

static LEXICON: Lazy<LexiconFile> = Lazy::new(|| {
    let raw = include_str!("../../polarity_lexicon.json");
    serde_json::from_str::<LexiconFile>(raw).expect("valid polarity lexicon")
});

const NEGATION_WINDOW: usize = 3;
const NEGATION_FACTOR: f64 = -0.5;

/// Polarity in `[-1,1]`, subjectivity in `[0,1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polarity {
    pub polarity: f64,
    pub subjectivity: f64,
}

impl Polarity {
    /// `|polarity| * subjectivity`.
    pub fn strength(&self) -> f64 {
        self.polarity.abs() * self.subjectivity
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolarityAnalyzer;

impl PolarityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, text: &str) -> Polarity {
        let lex = &*LEXICON;
        let tokens: Vec<String> = tokenize(text).collect();

        let mut pol_sum = 0.0;
        let mut subj_sum = 0.0;
        let mut n = 0usize;

        for (i, tok) in tokens.iter().enumerate() {
            let Some(&(p, s)) = lex.words.get(tok.as_str()) else {
                continue;
            };

            let mult = i
                .checked_sub(1)
                .and_then(|j| lex.intensifiers.get(tokens[j].as_str()))
                .copied()
                .unwrap_or(1.0);
            let negated = (1..=NEGATION_WINDOW)
                .any(|k| i >= k && lex.negations.contains(tokens[i - k].as_str()));

            let mut p = p * mult;
            if negated {
                p *= NEGATION_FACTOR;
            }
            pol_sum += p;
            subj_sum += (s * mult).min(1.0);
            n += 1;
        }

        if n == 0 {
            return Polarity::default();
        }
        Polarity {
            polarity: (pol_sum / n as f64).clamp(-1.0, 1.0),
            subjectivity: (subj_sum / n as f64).clamp(0.0, 1.0),
        }
    }

    /// Sentiment strength of `text`; 0 for empty or lexicon-free text.
    pub fn strength(&self, text: &str) -> f64 {
        self.analyze(text).strength()
    }
}

/// Lower-case word tokens; apostrophes stay inside words ("isn't").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}
