//! Destructive removal of reported duplicates from candidate tabs.
//!
//! A row is identified by the triple (normalized business name, normalized
//! email, normalized phone), scoped to its candidate tab. Any report row for
//! the tab carrying that triple removes it. Surviving rows are written back
//! exactly as read.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::columns::ColumnMapping;
use crate::config::{ColumnPreferences, MatchConfig};
use crate::model::{Record, Tab};
use crate::normalize::{normalize, FieldKind};
use crate::report::{CrossSheetReport, ReportRow};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RemovalKey {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl RemovalKey {
    pub fn new(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> Self {
        Self {
            name: name.and_then(|v| normalize(v, FieldKind::Name)),
            email: email.and_then(|v| normalize(v, FieldKind::Email)),
            phone: phone.and_then(|v| normalize(v, FieldKind::Phone)),
        }
    }

    pub fn from_record(record: &Record) -> Self {
        Self::new(
            record.business_name.as_deref(),
            record.email.as_deref(),
            record.phone.as_deref(),
        )
    }

    /// Candidate ("A") side of a report row.
    pub fn from_report_row(row: &ReportRow) -> Self {
        Self::new(Some(&row.a_business_name), Some(&row.a_email), Some(&row.a_phone))
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Identity triples to remove, grouped by candidate tab name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSet {
    tabs: HashMap<String, HashSet<RemovalKey>>,
    /// Report rows ignored because their triple was entirely blank.
    skipped_blank: usize,
}

impl RemovalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_report_rows(rows: &[ReportRow]) -> Self {
        let mut set = Self::new();
        for row in rows {
            set.insert(&row.sheet_a_tab, RemovalKey::from_report_row(row));
        }
        set
    }

    pub fn from_report(report: &CrossSheetReport) -> Self {
        Self::from_report_rows(&report.rows)
    }

    /// Returns false when the key was blank or already present.
    ///
    /// A blank triple would match every row that lacks name, email and
    /// phone, so it is never stored.
    pub fn insert(&mut self, tab: &str, key: RemovalKey) -> bool {
        if key.is_blank() {
            tracing::warn!(tab, "report row has no name, email or phone; ignored");
            self.skipped_blank += 1;
            return false;
        }
        self.tabs.entry(tab.trim().to_string()).or_default().insert(key)
    }

    pub fn contains(&self, tab: &str, key: &RemovalKey) -> bool {
        self.tabs.get(tab.trim()).is_some_and(|keys| keys.contains(key))
    }

    /// Tab names with at least one key, sorted.
    pub fn tabs(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tabs.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tabs.values().map(|k| k.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn skipped_blank(&self) -> usize {
        self.skipped_blank
    }

    /// Keys per tab, for summaries.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.tabs.iter().map(|(t, k)| (t.clone(), k.len())).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    pub tab: String,
    /// Header plus kept rows. Only meaningful when `removed > 0`.
    #[serde(skip)]
    pub rows: Vec<Vec<String>>,
    pub removed: usize,
    pub kept: usize,
}

impl RemovalOutcome {
    /// The tab needs rewriting only when something was removed.
    pub fn changed(&self) -> bool {
        self.removed > 0
    }
}

/// Drop every row of `tab` whose identity triple is in `set` for this tab.
pub fn remove_from_tab(
    tab: &Tab,
    set: &RemovalSet,
    prefs: &ColumnPreferences,
    config: &MatchConfig,
) -> RemovalOutcome {
    let mut outcome = RemovalOutcome {
        tab: tab.name.clone(),
        ..RemovalOutcome::default()
    };
    if tab.is_empty() || !set.tabs.contains_key(tab.name.trim()) {
        outcome.kept = tab.rows.len();
        return outcome;
    }

    let mapping = ColumnMapping::resolve(tab, prefs, config);
    let mut kept = Vec::with_capacity(tab.rows.len());
    for record in mapping.records(tab) {
        let key = RemovalKey::from_record(&record);
        if !key.is_blank() && set.contains(&tab.name, &key) {
            outcome.removed += 1;
        } else {
            kept.push(tab.rows[record.row].clone());
        }
    }

    outcome.kept = kept.len();
    outcome.rows = tab.with_rows(kept);
    tracing::info!(tab = %tab.name, removed = outcome.removed, kept = outcome.kept, "removed duplicates");
    outcome
}
