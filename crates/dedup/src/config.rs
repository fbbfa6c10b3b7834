use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Matching thresholds
// ---------------------------------------------------------------------------

/// Thresholds and policies shared by index construction and matching.
///
/// The same values gate both sides: a key that would not be indexed on the
/// reference side never produces a hit on the candidate side either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Minimum fuzzy name score (0-100) that counts as a match.
    pub fuzzy_threshold: u8,
    /// Which reference name wins when several score above the threshold.
    pub fuzzy_tie_break: FuzzyTieBreak,
    /// Normalized names must be strictly longer than this to be indexed.
    pub min_name_len: usize,
    /// Normalized phones must have strictly more digits than this to be indexed.
    pub min_phone_digits: usize,
    /// Data rows sampled by content sniffing when a header gives no answer.
    pub sniff_rows: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 85,
            fuzzy_tie_break: FuzzyTieBreak::default(),
            min_name_len: 3,
            min_phone_digits: 6,
            sniff_rows: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyTieBreak {
    /// First reference name (insertion order) at or above the threshold.
    /// Reproduces historical reports.
    First,
    /// Highest-scoring reference name; insertion order breaks equal scores.
    #[default]
    Best,
}

impl std::fmt::Display for FuzzyTieBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Best => write!(f, "best"),
        }
    }
}

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.fuzzy_threshold == 0 || self.fuzzy_threshold > 100 {
            return Err(EngineError::ConfigValidation(format!(
                "fuzzy_threshold must be in 1..=100, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.sniff_rows == 0 {
            return Err(EngineError::ConfigValidation(
                "sniff_rows must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Name key passes the index threshold.
    pub fn name_indexable(&self, key: &str) -> bool {
        key.chars().count() > self.min_name_len
    }

    /// Phone key passes the index threshold.
    pub fn phone_indexable(&self, key: &str) -> bool {
        key.len() > self.min_phone_digits
    }
}

// ---------------------------------------------------------------------------
// Header preference lists
// ---------------------------------------------------------------------------

/// Header names tried, in priority order, for each field.
///
/// Matching is exact after trimming and lowercasing both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnPreferences {
    pub website: Vec<String>,
    pub name: Vec<String>,
    pub phone: Vec<String>,
    pub email: Vec<String>,
    pub contact: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnPreferences {
    fn default() -> Self {
        Self {
            website: owned(&["website", "url", "site", "domain", "web"]),
            name: owned(&["title", "name", "company", "business", "place"]),
            phone: owned(&["phone", "tel", "cell", "mobile", "contact"]),
            email: owned(&["email", "e-mail", "email address", "mail"]),
            contact: owned(&["primary contact", "contact name", "owner", "first name"]),
        }
    }
}

impl ColumnPreferences {
    pub fn validate(&self) -> Result<(), EngineError> {
        for (field, list) in [
            ("website", &self.website),
            ("name", &self.name),
            ("phone", &self.phone),
            ("email", &self.email),
        ] {
            if list.iter().all(|h| h.trim().is_empty()) {
                return Err(EngineError::ConfigValidation(format!(
                    "columns.{field} needs at least one header name"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_historical_thresholds() {
        let c = MatchConfig::default();
        assert_eq!(c.fuzzy_threshold, 85);
        assert_eq!(c.min_name_len, 3);
        assert_eq!(c.min_phone_digits, 6);
        assert_eq!(c.sniff_rows, 4);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn parse_partial_toml_keeps_defaults() {
        let c = MatchConfig::from_toml("fuzzy_threshold = 90\nfuzzy_tie_break = \"first\"\n").unwrap();
        assert_eq!(c.fuzzy_threshold, 90);
        assert_eq!(c.fuzzy_tie_break, FuzzyTieBreak::First);
        assert_eq!(c.min_phone_digits, 6);
    }

    #[test]
    fn rejects_threshold_above_100() {
        let err = MatchConfig::from_toml("fuzzy_threshold = 101").unwrap_err();
        assert!(err.to_string().contains("fuzzy_threshold"));
    }

    #[test]
    fn rejects_unknown_key() {
        assert!(matches!(
            MatchConfig::from_toml("fuzzy = 3"),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn thresholds_are_strict() {
        let c = MatchConfig::default();
        assert!(!c.name_indexable("spa"));
        assert!(c.name_indexable("spas"));
        assert!(!c.phone_indexable("555013"));
        assert!(c.phone_indexable("5550134"));
    }

    #[test]
    fn empty_preference_list_rejected() {
        let prefs = ColumnPreferences {
            phone: vec![" ".into()],
            ..ColumnPreferences::default()
        };
        assert!(prefs.validate().is_err());
    }
}
