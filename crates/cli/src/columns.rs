// listwash columns - show resolved column mapping per tab

use listwash_config::Settings;
use listwash_dedup::columns::Field;
use listwash_dedup::{ColumnMapping, Tab};
use listwash_io::SheetStore;
use serde::Serialize;

use crate::util::{col_to_letter, load_tabs, open_store, print_json};
use crate::CliError;

#[derive(Debug, Serialize)]
struct TabColumns {
    tab: String,
    rows: usize,
    header: Vec<String>,
    mapping: ColumnMapping,
}

#[derive(Debug, Serialize)]
struct ColumnsOutput {
    dataset: String,
    tabs: Vec<TabColumns>,
}

pub(crate) fn cmd_columns(
    settings: &Settings,
    no_pacing: bool,
    dataset_id: &str,
    tab: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let store = open_store(settings, no_pacing);
    let tabs: Vec<Tab> = match tab {
        Some(name) => load_tabs(&store, dataset_id, Some(name))?,
        None => store.load_all(dataset_id)?,
    };

    let resolved: Vec<TabColumns> = tabs
        .into_iter()
        .map(|t| TabColumns {
            mapping: ColumnMapping::resolve(&t, &settings.columns, &settings.matching),
            rows: t.rows.len(),
            tab: t.name,
            header: t.header,
        })
        .collect();

    if json {
        return print_json(&ColumnsOutput {
            dataset: dataset_id.to_string(),
            tabs: resolved,
        });
    }

    for t in &resolved {
        println!("{} ({} rows)", t.tab, t.rows);
        for field in Field::ALL {
            println!("  {:<8} {}", field.as_str(), describe(t, field));
        }
    }
    Ok(())
}

fn describe(t: &TabColumns, field: Field) -> String {
    match t.mapping.get(field) {
        None => "-".to_string(),
        Some(col) => match t.header.get(col).map(|h| h.trim()).filter(|h| !h.is_empty()) {
            Some(name) => format!("{} \"{}\"", col_to_letter(col), name),
            None => col_to_letter(col),
        },
    }
}
