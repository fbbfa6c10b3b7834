// listwash dedupe - exact-match filter into a new dataset

use std::collections::BTreeMap;

use listwash_config::Settings;
use listwash_dedup::{filter_tab, ExclusionIndex, FilterOutcome};
use listwash_io::SheetStore;
use serde::Serialize;

use crate::util::{deduped_id, open_store, print_json};
use crate::CliError;

#[derive(Debug, Default, Serialize)]
struct DedupeSummary {
    source: String,
    exclusion: String,
    output: String,
    exclusion_records: usize,
    kept: usize,
    removed: usize,
    removed_by: BTreeMap<String, usize>,
    tabs: Vec<FilterOutcome>,
}

pub(crate) fn cmd_dedupe(
    settings: &Settings,
    no_pacing: bool,
    source_id: &str,
    exclusion_id: &str,
    output_id: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let mut store = open_store(settings, no_pacing);

    let exclusions = store.load_all(exclusion_id)?;
    let index = ExclusionIndex::build(&exclusions, &settings.columns, &settings.matching);
    tracing::info!(stats = ?index.stats(), "built exclusion index");

    let sources = store.load_all(source_id)?;
    let target = output_id.map(str::to_string).unwrap_or_else(|| deduped_id(source_id));
    let output = store.create_dataset(&target)?;

    let mut summary = DedupeSummary {
        source: source_id.to_string(),
        exclusion: exclusion_id.to_string(),
        output: output.clone(),
        exclusion_records: index.len(),
        ..DedupeSummary::default()
    };

    for tab in &sources {
        let outcome = filter_tab(tab, &index, &settings.columns);
        store.create_tab(&output, &tab.name)?;
        if !outcome.rows.is_empty() {
            store.write_tab(&output, &tab.name, &outcome.rows)?;
        }
        summary.kept += outcome.kept;
        summary.removed += outcome.removed;
        for (signal, n) in &outcome.removed_by {
            *summary.removed_by.entry(signal.clone()).or_insert(0) += n;
        }
        summary.tabs.push(outcome);
    }

    for tab in &summary.tabs {
        eprintln!("  {}: kept {}, removed {}", tab.tab, tab.kept, tab.removed);
    }
    eprintln!(
        "kept {} row(s), removed {} ({}) -> {}",
        summary.kept,
        summary.removed,
        format_counts(&summary.removed_by),
        summary.output
    );
    if json {
        print_json(&summary)?;
    }
    Ok(())
}

fn format_counts(counts: &BTreeMap<String, usize>) -> String {
    if counts.is_empty() {
        return "none".to_string();
    }
    counts
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}
