// listwash remove - delete reported duplicate rows from Sheet A

use std::collections::BTreeMap;
use std::path::PathBuf;

use listwash_config::Settings;
use listwash_dedup::{check_tabs, remove_from_tab, RemovalOutcome, RemovalSet};
use listwash_io::report_file::read_report;
use listwash_io::SheetStore;
use serde::Serialize;

use crate::util::{load_tabs, open_store, print_json};
use crate::CliError;

/// Where the rows to remove come from.
pub(crate) enum RemovalSource {
    /// A report file written by `check`.
    Report(PathBuf),
    /// A reference dataset checked in-process.
    Reference(String),
}

#[derive(Debug, Default, Serialize)]
struct RemoveSummary {
    dry_run: bool,
    /// Distinct (name, email, phone) keys per report tab.
    keys: BTreeMap<String, usize>,
    skipped_blank: usize,
    /// Report tabs with no matching tab in the candidate dataset.
    unknown_tabs: Vec<String>,
    removed: usize,
    kept: usize,
    tabs_rewritten: usize,
    tabs: Vec<RemovalOutcome>,
}

pub(crate) fn cmd_remove(
    settings: &Settings,
    no_pacing: bool,
    sheet_a_id: &str,
    source: RemovalSource,
    tabs: Option<&str>,
    dry_run: bool,
    json: bool,
) -> Result<(), CliError> {
    let mut store = open_store(settings, no_pacing);
    let candidates = load_tabs(&store, sheet_a_id, tabs)?;

    let set = match source {
        RemovalSource::Report(path) => RemovalSet::from_report_rows(&read_report(&path)?),
        RemovalSource::Reference(sheet_b_id) => {
            let references = store.load_all(&sheet_b_id)?;
            let report = check_tabs(&candidates, &references, &settings.columns, &settings.matching);
            tracing::info!(rows = report.rows.len(), "in-process check finished");
            RemovalSet::from_report(&report)
        }
    };

    let mut summary = RemoveSummary {
        dry_run,
        keys: set.counts(),
        skipped_blank: set.skipped_blank(),
        ..RemoveSummary::default()
    };
    let dataset_tabs = store.list_tabs(sheet_a_id)?;
    for name in set.tabs() {
        if !dataset_tabs.iter().any(|t| t.trim() == name) {
            tracing::warn!(tab = name, "report tab not found in {}; skipped", sheet_a_id);
            summary.unknown_tabs.push(name.to_string());
        }
    }

    for tab in &candidates {
        let outcome = remove_from_tab(tab, &set, &settings.columns, &settings.matching);
        if outcome.changed() && !dry_run {
            store.write_tab(sheet_a_id, &tab.name, &outcome.rows)?;
            summary.tabs_rewritten += 1;
        }
        summary.removed += outcome.removed;
        summary.kept += outcome.kept;
        summary.tabs.push(outcome);
    }

    print_summary(&summary);
    if json {
        print_json(&summary)?;
    }
    Ok(())
}

fn print_summary(summary: &RemoveSummary) {
    let verb = if summary.dry_run { "would remove" } else { "removed" };
    for tab in summary.tabs.iter().filter(|t| t.removed > 0) {
        eprintln!("  {}: {} {}, {} kept", tab.tab, verb, tab.removed, tab.kept);
    }
    eprintln!(
        "{} {} row(s), kept {}, {} tab(s) rewritten",
        verb, summary.removed, summary.kept, summary.tabs_rewritten
    );
    if summary.skipped_blank > 0 {
        eprintln!("skipped {} report row(s) with no name, email or phone", summary.skipped_blank);
    }
    if !summary.unknown_tabs.is_empty() {
        eprintln!("report tabs not in dataset: {}", summary.unknown_tabs.join(", "));
    }
}
