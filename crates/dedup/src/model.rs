use serde::Serialize;

use crate::normalize::{normalize, FieldKind};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One tab of a dataset: header row plus data rows, as read from the store.
///
/// Rows are kept exactly as read (ragged widths included) so survivors can be
/// written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tab {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Tab {
    /// Split raw store rows into header (row 0) and data rows.
    /// An empty read yields an empty tab.
    pub fn from_rows(name: impl Into<String>, mut rows: Vec<Vec<String>>) -> Self {
        let header = if rows.is_empty() { Vec::new() } else { rows.remove(0) };
        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, col); columns beyond a short row read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Header followed by the given data rows, for write-back.
    pub fn with_rows(&self, rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(rows.len() + 1);
        out.push(self.header.clone());
        out.extend(rows);
        out
    }
}

/// A business/lead entry extracted from one tab row via a `ColumnMapping`.
///
/// Absent cells are `None`; an empty cell never becomes `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Position among the tab's data rows (0 = first row after the header).
    pub row: usize,
    pub business_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub primary_contact: Option<String>,
}

impl Record {
    pub fn normalized(&self) -> NormalizedRecord {
        let key = |raw: &Option<String>, kind| raw.as_deref().and_then(|r| normalize(r, kind));
        NormalizedRecord {
            domain: key(&self.website, FieldKind::Url),
            name: key(&self.business_name, FieldKind::Name),
            phone: key(&self.phone, FieldKind::Phone),
            email: key(&self.email, FieldKind::Email),
        }
    }
}

/// Normalized keys of a record. Not thresholded: thresholds apply at lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedRecord {
    pub domain: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl NormalizedRecord {
    /// At least one field produced a key.
    pub fn has_signal(&self) -> bool {
        self.domain.is_some() || self.name.is_some() || self.phone.is_some() || self.email.is_some()
    }
}

// ---------------------------------------------------------------------------
// Match outcome
// ---------------------------------------------------------------------------

/// A match signal that fired for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "signal")]
pub enum Signal {
    Email,
    Phone,
    Website,
    /// `confidence` is set for fuzzy hits only (0-100).
    BusinessName { confidence: Option<u8> },
}

impl Signal {
    /// Stable key for per-signal counters.
    pub fn key(&self) -> &'static str {
        match self {
            Signal::Email => "email",
            Signal::Phone => "phone",
            Signal::Website => "website",
            Signal::BusinessName { confidence: None } => "business_name",
            Signal::BusinessName { confidence: Some(_) } => "business_name_fuzzy",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Email => write!(f, "Email"),
            Signal::Phone => write!(f, "Phone"),
            Signal::Website => write!(f, "Website"),
            Signal::BusinessName { confidence: None } => write!(f, "Business Name"),
            Signal::BusinessName { confidence: Some(score) } => write!(f, "Business Name ({score}%)"),
        }
    }
}

/// Per-candidate outcome. `reference` indexes into the `ExclusionIndex`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub signals: Vec<Signal>,
    pub reference: Option<usize>,
    pub confidence: Option<u8>,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self::default()
    }

    pub fn matched(&self) -> bool {
        !self.signals.is_empty()
    }

    /// Report form: `Email, Phone, Business Name (91%)`.
    pub fn match_type(&self) -> String {
        self.signals
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_splits_header() {
        let tab = Tab::from_rows(
            "Calgary",
            vec![
                vec!["name".into(), "phone".into()],
                vec!["Acme".into()],
            ],
        );
        assert_eq!(tab.header, vec!["name", "phone"]);
        assert_eq!(tab.rows.len(), 1);
        assert_eq!(tab.cell(0, 0), "Acme");
        assert_eq!(tab.cell(0, 1), "");
        assert_eq!(tab.cell(5, 0), "");
    }

    #[test]
    fn empty_read_gives_empty_tab() {
        let tab = Tab::from_rows("x", vec![]);
        assert!(tab.header.is_empty());
        assert!(tab.is_empty());
    }

    #[test]
    fn match_type_joins_in_order() {
        let r = MatchResult {
            signals: vec![
                Signal::Email,
                Signal::Phone,
                Signal::BusinessName { confidence: Some(91) },
            ],
            reference: Some(0),
            confidence: Some(91),
        };
        assert!(r.matched());
        assert_eq!(r.match_type(), "Email, Phone, Business Name (91%)");
        assert!(!MatchResult::no_match().matched());
    }

    #[test]
    fn record_without_fields_has_no_signal() {
        let rec = Record {
            business_name: Some("  ".into()),
            website: Some("N/A".into()),
            ..Record::default()
        };
        assert!(!rec.normalized().has_signal());
    }
}
