use indexmap::IndexMap;
use serde::Serialize;

use crate::columns::ColumnMapping;
use crate::config::{ColumnPreferences, MatchConfig};
use crate::model::{NormalizedRecord, Record, Tab};

/// A reference ("Sheet B") record together with the tab it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry {
    pub tab: String,
    pub record: Record,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub records: usize,
    pub domains: usize,
    pub names: usize,
    pub phones: usize,
    pub emails: usize,
}

/// Lookup maps from normalized key to reference entries.
///
/// Only keys passing the configured thresholds are inserted, so short names,
/// short phones and missing values can never produce a hit. Maps keep
/// insertion order; fuzzy name scans rely on it for deterministic tie-breaks.
#[derive(Debug, Clone)]
pub struct ExclusionIndex {
    config: MatchConfig,
    entries: Vec<ReferenceEntry>,
    domains: IndexMap<String, Vec<usize>>,
    names: IndexMap<String, Vec<usize>>,
    phones: IndexMap<String, Vec<usize>>,
    emails: IndexMap<String, Vec<usize>>,
}

impl ExclusionIndex {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            config: config.clone(),
            entries: Vec::new(),
            domains: IndexMap::new(),
            names: IndexMap::new(),
            phones: IndexMap::new(),
            emails: IndexMap::new(),
        }
    }

    /// Build from every tab of a reference dataset, in order.
    pub fn build(tabs: &[Tab], prefs: &ColumnPreferences, config: &MatchConfig) -> Self {
        let mut index = Self::new(config);
        for tab in tabs {
            index.insert_tab(tab, prefs);
        }
        index
    }

    /// Build from a single reference tab.
    pub fn from_tab(tab: &Tab, prefs: &ColumnPreferences, config: &MatchConfig) -> Self {
        let mut index = Self::new(config);
        index.insert_tab(tab, prefs);
        index
    }

    /// Resolve the tab's columns and insert every data row.
    /// Tabs without data rows contribute nothing.
    pub fn insert_tab(&mut self, tab: &Tab, prefs: &ColumnPreferences) {
        if tab.is_empty() {
            tracing::debug!(tab = %tab.name, "reference tab has no rows, skipped");
            return;
        }
        let mapping = ColumnMapping::resolve(tab, prefs, &self.config);
        self.insert_with_mapping(tab, &mapping);
    }

    pub fn insert_with_mapping(&mut self, tab: &Tab, mapping: &ColumnMapping) {
        let before = self.entries.len();
        for record in mapping.records(tab) {
            self.insert(&tab.name, record);
        }
        tracing::debug!(
            tab = %tab.name,
            indexed = self.entries.len() - before,
            rows = tab.rows.len(),
            "indexed reference tab"
        );
    }

    /// Insert one record. Returns false when no key passed the thresholds.
    pub fn insert(&mut self, tab: &str, record: Record) -> bool {
        let keys = self.indexable(&record.normalized());
        if !keys.has_signal() {
            return false;
        }

        let idx = self.entries.len();
        if let Some(k) = keys.domain {
            self.domains.entry(k).or_default().push(idx);
        }
        if let Some(k) = keys.name {
            self.names.entry(k).or_default().push(idx);
        }
        if let Some(k) = keys.phone {
            self.phones.entry(k).or_default().push(idx);
        }
        if let Some(k) = keys.email {
            self.emails.entry(k).or_default().push(idx);
        }
        self.entries.push(ReferenceEntry {
            tab: tab.to_string(),
            record,
        });
        true
    }

    /// Drop keys that fail the thresholds. Used for both sides of a lookup.
    pub fn indexable(&self, keys: &NormalizedRecord) -> NormalizedRecord {
        NormalizedRecord {
            domain: keys.domain.clone().filter(|d| !d.is_empty()),
            name: keys.name.clone().filter(|n| self.config.name_indexable(n)),
            phone: keys.phone.clone().filter(|p| self.config.phone_indexable(p)),
            email: keys.email.clone().filter(|e| e.contains('@')),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn entry(&self, idx: usize) -> &ReferenceEntry {
        &self.entries[idx]
    }

    pub fn domain(&self, key: &str) -> Option<&[usize]> {
        self.domains.get(key).map(|v| v.as_slice())
    }

    pub fn name(&self, key: &str) -> Option<&[usize]> {
        self.names.get(key).map(|v| v.as_slice())
    }

    pub fn phone(&self, key: &str) -> Option<&[usize]> {
        self.phones.get(key).map(|v| v.as_slice())
    }

    pub fn email(&self, key: &str) -> Option<&[usize]> {
        self.emails.get(key).map(|v| v.as_slice())
    }

    /// Indexed names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.entries.len(),
            domains: self.domains.len(),
            names: self.names.len(),
            phones: self.phones.len(),
            emails: self.emails.len(),
        }
    }
}
