use std::collections::BTreeMap;

use serde::Serialize;

use crate::columns::ColumnMapping;
use crate::config::ColumnPreferences;
use crate::index::ExclusionIndex;
use crate::matcher::Matcher;
use crate::model::Tab;

/// Result of filtering one source tab against an exclusion index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    pub tab: String,
    /// Header plus surviving rows, unchanged and in original order.
    #[serde(skip)]
    pub rows: Vec<Vec<String>>,
    pub kept: usize,
    pub removed: usize,
    /// Removed rows per rejecting signal key.
    pub removed_by: BTreeMap<String, usize>,
}

/// Drop every source row that exactly matches the exclusion index on
/// domain, name or phone. Survivors are copied byte-for-byte.
///
/// A tab with a header but no data rows keeps its header. A tab with no
/// header at all yields no rows, so the caller writes nothing for it.
pub fn filter_tab(tab: &Tab, index: &ExclusionIndex, prefs: &ColumnPreferences) -> FilterOutcome {
    let mut outcome = FilterOutcome {
        tab: tab.name.clone(),
        ..FilterOutcome::default()
    };
    if tab.is_empty() {
        if !tab.header.is_empty() {
            outcome.rows = tab.with_rows(Vec::new());
        }
        return outcome;
    }

    let mapping = ColumnMapping::resolve(tab, prefs, index.config());
    let matcher = Matcher::new(index);
    let mut survivors = Vec::with_capacity(tab.rows.len());

    for record in mapping.records(tab) {
        let result = matcher.exact(&record);
        match result.signals.first() {
            Some(signal) => {
                outcome.removed += 1;
                *outcome.removed_by.entry(signal.key().to_string()).or_insert(0) += 1;
                tracing::trace!(tab = %tab.name, row = record.row, signal = %signal, "row excluded");
            }
            None => survivors.push(tab.rows[record.row].clone()),
        }
    }

    outcome.kept = survivors.len();
    outcome.rows = tab.with_rows(survivors);
    tracing::info!(
        tab = %tab.name,
        kept = outcome.kept,
        removed = outcome.removed,
        "filtered source tab"
    );
    outcome
}
