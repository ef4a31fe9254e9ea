// src/features/mod.rs
//! Text feature extractors: pure `text → scalar` signals used by the
//! financial-impact ranking.

pub mod credibility;
pub mod polarity;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

pub use credibility::CredibilityTable;
pub use polarity::{Polarity, PolarityAnalyzer};

/// Financial vocabulary, matched as case-insensitive substrings.
pub const FINANCIAL_ENTITIES: [&str; 10] = [
    "stocks",
    "bonds",
    "federal reserve",
    "interest rates",
    "inflation",
    "gdp",
    "earnings",
    "dividend",
    "ipo",
    "buyback",
];

/// Verbs that typically move markets.
pub const MARKET_VERBS: [&str; 16] = [
    "acquire",
    "merge",
    "launch",
    "cut",
    "raise",
    "lower",
    "approve",
    "reject",
    "investigate",
    "settle",
    "expand",
    "reduce",
    "forecast",
    "warn",
    "outperform",
    "downgrade",
];

/// Two or more consecutive capitals as a whole word (ticker heuristic).
static RE_TICKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("ticker regex"));

static RE_VERBS: Lazy<Vec<Regex>> = Lazy::new(|| {
    MARKET_VERBS
        .iter()
        .map(|v| Regex::new(&verb_pattern(v)).expect("market verb regex"))
        .collect()
});

/// Word-boundary pattern for a verb and its `-s/-es/-ed/-ing` variants,
/// including silent-e drop (`raising`) and consonant doubling (`cutting`).
fn verb_pattern(verb: &str) -> String {
    let v = regex::escape(verb);
    match verb.strip_suffix('e') {
        Some(stem) => {
            let stem = regex::escape(stem);
            format!(r"(?i)\b(?:{v}[sd]?|{stem}ing)\b")
        }
        None => {
            let last = verb.chars().last().map(|c| c.to_string()).unwrap_or_default();
            let last = regex::escape(&last);
            format!(r"(?i)\b{v}(?:s|es|{last}?ed|{last}?ing)?\b")
        }
    }
}

/// Distinct financial terms present plus ticker-like uppercase tokens.
/// A term counts once however often it repeats; tickers count per match.
pub fn entity_density(text: &str) -> usize {
    let lower = text.to_lowercase();
    let terms = FINANCIAL_ENTITIES
        .iter()
        .filter(|term| lower.contains(*term))
        .count();
    terms + RE_TICKER.find_iter(text).count()
}

/// Number of distinct market verbs present (each verb counts once).
pub fn market_verb_count(text: &str) -> usize {
    RE_VERBS.iter().filter(|re| re.is_match(text)).count()
}

/// Unique whitespace tokens / total tokens; 0 for empty text.
pub fn novelty_score(text: &str) -> f64 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = tokens.iter().copied().collect();
    unique.len() as f64 / tokens.len() as f64
}

/// Un-normalized feature values for one article.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFeatures {
    pub sentiment_strength: f64,
    pub entity_density: usize,
    pub market_verbs: usize,
    pub novelty_score: f64,
    pub source_credibility: f64,
}

/// Bundles the stateful extractors (polarity lexicon, credibility table).
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    polarity: PolarityAnalyzer,
    credibility: CredibilityTable,
}

impl FeatureExtractor {
    pub fn new(credibility: CredibilityTable) -> Self {
        Self {
            polarity: PolarityAnalyzer::new(),
            credibility,
        }
    }

    pub fn sentiment_strength(&self, text: &str) -> f64 {
        self.polarity.strength(text)
    }

    pub fn source_credibility(&self, source: &str) -> f64 {
        self.credibility.weight_for(source)
    }

    pub fn extract(&self, text: &str, source: &str) -> RawFeatures {
        RawFeatures {
            sentiment_strength: self.sentiment_strength(text),
            entity_density: entity_density(text),
            market_verbs: market_verb_count(text),
            novelty_score: novelty_score(text),
            source_credibility: self.source_credibility(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn novelty_ratio_and_empty() {
        assert!((novelty_score("a a a") - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(novelty_score(""), 0.0);
        assert_eq!(novelty_score("   "), 0.0);
        assert_eq!(novelty_score("one two three"), 1.0);
    }

    #[test]
    fn entity_density_counts_terms_and_tickers() {
        // "stocks" (once, though repeated), "inflation", tickers: AAPL, MSFT
        let t = "Stocks fell as inflation bit; stocks of AAPL and MSFT slid.";
        assert_eq!(entity_density(t), 4);
        assert_eq!(entity_density(""), 0);
        // single capital letters are not tickers
        assert_eq!(entity_density("A I"), 0);
    }

    #[test]
    fn repeated_term_counts_once() {
        assert_eq!(entity_density("stocks stocks stocks"), 1);
        assert_eq!(entity_density("Bonds and bonds; IPO ipo"), 3);
    }

    #[test]
    fn multiword_entities_match_case_insensitively() {
        assert_eq!(entity_density("the federal reserve held interest rates"), 2);
        assert_eq!(entity_density("The Federal Reserve"), 1);
    }

    #[test]
    fn verbs_with_suffixes() {
        assert_eq!(market_verb_count("Company raised guidance"), 1);
        assert_eq!(market_verb_count("Regulators are investigating"), 1);
        assert_eq!(market_verb_count("Firm cuts jobs, cutting costs"), 1);
        assert_eq!(market_verb_count("Analysts warned and DOWNGRADED the stock"), 2);
        assert_eq!(market_verb_count("It merges and acquires"), 2);
    }

    #[test]
    fn verbs_need_word_boundaries() {
        // a verb that is only a prefix of a longer word does not count
        assert_eq!(market_verb_count("cutlery sales"), 0);
        assert_eq!(market_verb_count("nothing here"), 0);
    }

    #[test]
    fn extractor_bundles_all_signals() {
        let fx = FeatureExtractor::default();
        let f = fx.extract("Apple will launch a buyback", "Reuters");
        assert_eq!(f.market_verbs, 1);
        assert_eq!(f.entity_density, 1);
        assert_eq!(f.novelty_score, 1.0);
        assert!((f.source_credibility - 0.93).abs() < 1e-12);
    }
}
