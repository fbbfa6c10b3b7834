use listwash_config::Settings;
use listwash_dedup::Tab;
use listwash_io::local::is_workbook;
use listwash_io::{LocalStore, PacedStore, PacingPolicy, SheetStore};
use serde::Serialize;

use crate::CliError;

pub(crate) type Store = PacedStore<LocalStore>;

/// Local store wrapped with the configured pacing and retry policies.
pub(crate) fn open_store(settings: &Settings, no_pacing: bool) -> Store {
    let pacing = if no_pacing {
        PacingPolicy::disabled()
    } else {
        settings.pacing.clone()
    };
    PacedStore::new(LocalStore::new(), &pacing, &settings.retry)
}

/// Split a `--tabs` value on commas, trimming and dropping empties.
pub(crate) fn parse_tabs(arg: &str) -> Vec<String> {
    arg.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Pick the requested tabs out of `available`, in dataset order.
///
/// Requested names missing from the dataset are warned about and skipped.
/// Returns `Err` with the missing names only when nothing at all matched.
pub(crate) fn select_tabs(available: &[String], requested: &[String]) -> Result<Vec<String>, Vec<String>> {
    let missing: Vec<String> = requested
        .iter()
        .filter(|want| !available.iter().any(|have| have.trim() == want.as_str()))
        .cloned()
        .collect();
    for name in &missing {
        tracing::warn!(tab = %name, "requested tab not found; skipped");
    }

    let selected: Vec<String> = available
        .iter()
        .filter(|have| requested.iter().any(|want| have.trim() == want.as_str()))
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(missing);
    }
    Ok(selected)
}

/// Load the tabs of a dataset, optionally restricted by a `--tabs` filter.
pub(crate) fn load_tabs(store: &Store, dataset: &str, filter: Option<&str>) -> Result<Vec<Tab>, CliError> {
    let available = store.list_tabs(dataset)?;
    let names = match filter.map(parse_tabs) {
        None => available,
        Some(requested) if requested.is_empty() => {
            return Err(CliError::usage("--tabs is empty"));
        }
        Some(requested) => select_tabs(&available, &requested).map_err(|missing| {
            CliError::usage(format!("no requested tab exists in {}: {}", dataset, missing.join(", ")))
                .with_hint(format!("available tabs: {}", available.join(", ")))
        })?,
    };

    let mut tabs = Vec::with_capacity(names.len());
    for name in &names {
        tabs.push(store.load_tab(dataset, name)?);
    }
    Ok(tabs)
}

/// Default output dataset for `dedupe`: `<source>-deduped`, keeping a
/// workbook extension at the end.
pub(crate) fn deduped_id(source: &str) -> String {
    if is_workbook(source) {
        let (stem, ext) = source.split_at(source.len() - ".xlsx".len());
        format!("{}-deduped{}", stem, ext)
    } else {
        format!("{}-deduped", source.trim_end_matches(['/', '\\']))
    }
}

/// Convert column index to letter (0 -> A, 1 -> B, 26 -> AA, etc.)
pub(crate) fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

// ============================================================================
// JSON output
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct Meta {
    pub tool: &'static str,
    pub version: &'static str,
    pub commit: &'static str,
    pub run_at: String,
}

impl Meta {
    pub(crate) fn now() -> Self {
        Self {
            tool: "listwash",
            version: env!("CARGO_PKG_VERSION"),
            commit: env!("LISTWASH_COMMIT"),
            run_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    meta: Meta,
    #[serde(flatten)]
    body: &'a T,
}

/// Print `body` as one pretty JSON object on stdout, with a `meta` block.
pub(crate) fn print_json<T: Serialize>(body: &T) -> Result<(), CliError> {
    let envelope = Envelope { meta: Meta::now(), body };
    let json_str = serde_json::to_string_pretty(&envelope)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
    println!("{}", json_str);
    Ok(())
}
