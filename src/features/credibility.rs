//! # Source Credibility
//!
//! Fixed reputation weight per news source, in `[0.0, 1.0]`.
//!
//! - Lookup is by trimmed, lower-cased source name (exact match only).
//! - Anything unmapped, including empty and `"unknown"`, gets the default.
//! - The built-in table can be replaced by a JSON file
//!   (`{"default_weight": 0.5, "weights": {"bloomberg": 0.95}}`).

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};
use tracing::warn;

/// Credibility table, loaded from JSON or the built-in seed.
#[derive(Debug, Clone, Deserialize)]
pub struct CredibilityTable {
    /// Weight for sources not in the table.
    #[serde(default = "default_default_weight")]
    pub default_weight: f64,
    /// Lower-cased source name → weight.
    #[serde(default)]
    pub weights: HashMap<String, f64>,
}

fn default_default_weight() -> f64 {
    0.5
}

impl Default for CredibilityTable {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl CredibilityTable {
    /// Load the table from a JSON file. Falls back to `default_seed()` when the
    /// file is missing or malformed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => match serde_json::from_str::<Self>(&s) {
                Ok(t) => t.normalized(),
                Err(e) => {
                    warn!(target: "ranking", path = %path.display(), error = %e, "bad credibility table, using built-in");
                    Self::default_seed()
                }
            },
            Err(_) => Self::default_seed(),
        }
    }

    /// Weight for `source`.
    pub fn weight_for(&self, source: &str) -> f64 {
        let key = source.trim().to_lowercase();
        self.weights
            .get(&key)
            .copied()
            .map(clamp01)
            .unwrap_or_else(|| clamp01(self.default_weight))
    }

    /// Built-in table.
    pub fn default_seed() -> Self {
        let weights = [
            ("bloomberg", 0.95),
            ("reuters", 0.93),
            ("financial times", 0.90),
            ("cnbc", 0.85),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            default_weight: default_default_weight(),
            weights,
        }
    }

    fn normalized(self) -> Self {
        Self {
            default_weight: self.default_weight,
            weights: self
                .weights
                .into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v))
                .collect(),
        }
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn case_insensitive_lookup() {
        let t = CredibilityTable::default_seed();
        for s in ["Bloomberg", "BLOOMBERG", "bloomberg", "  Bloomberg "] {
            assert!((t.weight_for(s) - 0.95).abs() < 1e-12, "{s}");
        }
        assert!((t.weight_for("Financial Times") - 0.90).abs() < 1e-12);
    }

    #[test]
    fn unmapped_gets_default() {
        let t = CredibilityTable::default_seed();
        assert_eq!(t.weight_for("unknown-source"), 0.5);
        assert_eq!(t.weight_for(""), 0.5);
        assert_eq!(t.weight_for("unknown"), 0.5);
        // exact match only, no substring fallback
        assert_eq!(t.weight_for("Reuters UK"), 0.5);
    }

    #[test]
    fn loads_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("cred.json");
        let mut f = fs::File::create(&p).unwrap();
        write!(f, r#"{{"default_weight":0.4,"weights":{{"The Economist":0.9}}}}"#).unwrap();

        let t = CredibilityTable::load_from_file(&p);
        assert_eq!(t.weight_for("the economist"), 0.9);
        assert_eq!(t.weight_for("Bloomberg"), 0.4);
    }

    #[test]
    fn missing_file_uses_seed() {
        let t = CredibilityTable::load_from_file("__no_such_credibility_file__.json");
        assert_eq!(t.weight_for("cnbc"), 0.85);
    }
}
