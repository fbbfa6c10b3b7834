use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::columns::ColumnMapping;
use crate::config::{ColumnPreferences, MatchConfig};
use crate::index::ExclusionIndex;
use crate::matcher::Matcher;
use crate::model::{Record, Tab};

/// Column order of the duplicate report file. Part of the interchange
/// contract read back by the remover; do not reorder.
pub const REPORT_HEADER: [&str; 13] = [
    "Sheet A Tab",
    "Sheet B Tab",
    "Match Type",
    "A - Business Name",
    "B - Business Name",
    "A - Email",
    "B - Email",
    "A - Phone",
    "B - Phone",
    "A - Primary Contact",
    "B - Primary Contact",
    "A - Website",
    "B - Website",
];

// ---------------------------------------------------------------------------
// Report rows
// ---------------------------------------------------------------------------

/// One duplicate: a candidate row and the reference row it matched.
///
/// Field order mirrors `REPORT_HEADER`. Absent values are empty strings here
/// because this is the file representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Sheet A Tab", default)]
    pub sheet_a_tab: String,
    #[serde(rename = "Sheet B Tab", default)]
    pub sheet_b_tab: String,
    #[serde(rename = "Match Type", default)]
    pub match_type: String,
    #[serde(rename = "A - Business Name", default)]
    pub a_business_name: String,
    #[serde(rename = "B - Business Name", default)]
    pub b_business_name: String,
    #[serde(rename = "A - Email", default)]
    pub a_email: String,
    #[serde(rename = "B - Email", default)]
    pub b_email: String,
    #[serde(rename = "A - Phone", default)]
    pub a_phone: String,
    #[serde(rename = "B - Phone", default)]
    pub b_phone: String,
    #[serde(rename = "A - Primary Contact", default)]
    pub a_primary_contact: String,
    #[serde(rename = "B - Primary Contact", default)]
    pub b_primary_contact: String,
    #[serde(rename = "A - Website", default)]
    pub a_website: String,
    #[serde(rename = "B - Website", default)]
    pub b_website: String,
}

impl ReportRow {
    pub fn new(a_tab: &str, a: &Record, b_tab: &str, b: &Record, match_type: String) -> Self {
        let s = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            sheet_a_tab: a_tab.to_string(),
            sheet_b_tab: b_tab.to_string(),
            match_type,
            a_business_name: s(&a.business_name),
            b_business_name: s(&b.business_name),
            a_email: s(&a.email),
            b_email: s(&b.email),
            a_phone: s(&a.phone),
            b_phone: s(&b.phone),
            a_primary_contact: s(&a.primary_contact),
            b_primary_contact: s(&b.primary_contact),
            a_website: s(&a.website),
            b_website: s(&b.website),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TabCheckSummary {
    pub tab: String,
    pub rows: usize,
    /// Report rows produced for this tab, across all reference tabs.
    pub duplicates: usize,
    /// Distinct candidate rows flagged at least once.
    pub duplicate_rows: usize,
    /// Matches against the same-named reference tab.
    pub same_tab_duplicates: usize,
    /// Matches against every other reference tab.
    pub cross_tab_duplicates: usize,
    pub skipped_no_signal: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub candidate_tabs: usize,
    pub reference_tabs: usize,
    pub rows_scanned: usize,
    pub duplicates: usize,
    pub duplicate_rows: usize,
    pub skipped_no_signal: usize,
    /// Report rows per firing signal (`email`, `phone`, `website`,
    /// `business_name`, `business_name_fuzzy`).
    pub signal_counts: BTreeMap<String, usize>,
    pub tabs: Vec<TabCheckSummary>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrossSheetReport {
    pub rows: Vec<ReportRow>,
    pub summary: CheckSummary,
}

// ---------------------------------------------------------------------------
// Cross-sheet check
// ---------------------------------------------------------------------------

/// Compare every candidate tab against every reference tab and collect the
/// duplicates into one flat report.
///
/// Each candidate tab is compared against its same-named reference tab
/// first (case-insensitive), then against the remaining reference tabs in
/// their original order. Reference tabs are only read.
pub fn check_tabs(
    candidates: &[Tab],
    references: &[Tab],
    prefs: &ColumnPreferences,
    config: &MatchConfig,
) -> CrossSheetReport {
    let indices: Vec<ExclusionIndex> = references
        .iter()
        .map(|t| ExclusionIndex::from_tab(t, prefs, config))
        .collect();

    let mut report = CrossSheetReport::default();
    report.summary.candidate_tabs = candidates.len();
    report.summary.reference_tabs = references.len();

    for cand in candidates {
        let mut tab_summary = TabCheckSummary {
            tab: cand.name.clone(),
            rows: cand.rows.len(),
            ..TabCheckSummary::default()
        };

        if cand.is_empty() {
            tracing::info!(tab = %cand.name, "candidate tab has no rows");
            report.summary.tabs.push(tab_summary);
            continue;
        }

        let mapping = ColumnMapping::resolve(cand, prefs, config);
        let records: Vec<Record> = mapping.records(cand).collect();
        tab_summary.skipped_no_signal = records
            .iter()
            .filter(|r| !r.normalized().has_signal())
            .count();

        let mut flagged: HashSet<usize> = HashSet::new();
        for ref_idx in comparison_order(&cand.name, references) {
            let index = &indices[ref_idx];
            let same_tab = references[ref_idx].name.trim().eq_ignore_ascii_case(cand.name.trim());
            let matcher = Matcher::new(index);

            for record in &records {
                let Some(result) = matcher.cross_sheet(record) else {
                    continue;
                };
                let Some(reference) = result.reference else {
                    continue;
                };
                let entry = index.entry(reference);

                for signal in &result.signals {
                    *report.summary.signal_counts.entry(signal.key().to_string()).or_insert(0) += 1;
                }
                if same_tab {
                    tab_summary.same_tab_duplicates += 1;
                } else {
                    tab_summary.cross_tab_duplicates += 1;
                }
                flagged.insert(record.row);
                report.rows.push(ReportRow::new(
                    &cand.name,
                    record,
                    &entry.tab,
                    &entry.record,
                    result.match_type(),
                ));
            }
        }

        tab_summary.duplicates = tab_summary.same_tab_duplicates + tab_summary.cross_tab_duplicates;
        tab_summary.duplicate_rows = flagged.len();
        tracing::info!(
            tab = %cand.name,
            rows = tab_summary.rows,
            duplicates = tab_summary.duplicates,
            skipped = tab_summary.skipped_no_signal,
            "checked candidate tab"
        );

        report.summary.rows_scanned += tab_summary.rows;
        report.summary.duplicates += tab_summary.duplicates;
        report.summary.duplicate_rows += tab_summary.duplicate_rows;
        report.summary.skipped_no_signal += tab_summary.skipped_no_signal;
        report.summary.tabs.push(tab_summary);
    }

    report
}

/// Same-named reference tab first, then the rest in original order.
fn comparison_order(candidate: &str, references: &[Tab]) -> Vec<usize> {
    let wanted = candidate.trim();
    let same = references
        .iter()
        .position(|t| t.name.trim().eq_ignore_ascii_case(wanted));
    let mut order: Vec<usize> = same.into_iter().collect();
    order.extend((0..references.len()).filter(|i| Some(*i) != same));
    order
}
