// listwash check - read-only cross-sheet duplicate report

use std::path::Path;

use listwash_config::Settings;
use listwash_dedup::{check_tabs, CheckSummary};
use listwash_io::report_file::write_report;
use listwash_io::SheetStore;
use serde::Serialize;

use crate::util::{load_tabs, open_store, print_json};
use crate::CliError;

#[derive(Debug, Serialize)]
struct CheckOutput<'a> {
    sheet_a: &'a str,
    sheet_b: &'a str,
    report: String,
    summary: &'a CheckSummary,
}

pub(crate) fn cmd_check(
    settings: &Settings,
    no_pacing: bool,
    sheet_a_id: &str,
    sheet_b_id: &str,
    tabs: Option<&str>,
    output: &Path,
    json: bool,
) -> Result<(), CliError> {
    let store = open_store(settings, no_pacing);

    let candidates = load_tabs(&store, sheet_a_id, tabs)?;
    let references = store.load_all(sheet_b_id)?;
    if references.is_empty() {
        tracing::warn!(dataset = sheet_b_id, "reference dataset has no tabs");
    }

    let report = check_tabs(&candidates, &references, &settings.columns, &settings.matching);
    write_report(output, &report.rows)?;

    print_summary(&report.summary, output);
    if json {
        print_json(&CheckOutput {
            sheet_a: sheet_a_id,
            sheet_b: sheet_b_id,
            report: output.display().to_string(),
            summary: &report.summary,
        })?;
    }
    Ok(())
}

fn print_summary(summary: &CheckSummary, output: &Path) {
    for tab in &summary.tabs {
        eprintln!(
            "  {}: {} rows, {} duplicate rows ({} same-tab, {} cross-tab matches), {} skipped",
            tab.tab,
            tab.rows,
            tab.duplicate_rows,
            tab.same_tab_duplicates,
            tab.cross_tab_duplicates,
            tab.skipped_no_signal,
        );
    }
    eprintln!(
        "checked {} rows in {} tab(s) against {} reference tab(s): {} duplicates on {} rows, {} skipped (no signal)",
        summary.rows_scanned,
        summary.candidate_tabs,
        summary.reference_tabs,
        summary.duplicates,
        summary.duplicate_rows,
        summary.skipped_no_signal,
    );
    eprintln!("wrote {}", output.display());
}
