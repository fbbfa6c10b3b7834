//! Column discovery: which column of a tab holds which field.
//!
//! Resolved once per tab into a `ColumnMapping` by running a chain of
//! strategies. Each strategy only fills fields still unresolved, so earlier
//! strategies win:
//!
//! 1. `HeaderMatch`: exact (trimmed, case-insensitive) header name lookup
//!    against the preference list of each field, first hit in priority order.
//! 2. `ContentSniff`: positional scan of the first few data rows for cells
//!    that look like a URL, a phone number or an email. Name falls back to
//!    column 0.

use serde::Serialize;

use crate::config::{ColumnPreferences, MatchConfig};
use crate::model::{Record, Tab};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Website,
    Name,
    Phone,
    Email,
    Contact,
}

impl Field {
    pub const ALL: [Field; 5] = [Field::Website, Field::Name, Field::Phone, Field::Email, Field::Contact];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Website => "website",
            Field::Name => "name",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Contact => "contact",
        }
    }
}

/// Resolved column index per field. `None` = field not present in this tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub website: Option<usize>,
    pub name: Option<usize>,
    pub phone: Option<usize>,
    pub email: Option<usize>,
    pub contact: Option<usize>,
}

impl ColumnMapping {
    /// Resolve with the default strategy chain.
    pub fn resolve(tab: &Tab, prefs: &ColumnPreferences, config: &MatchConfig) -> Self {
        let header = HeaderMatch { prefs };
        let sniff = ContentSniff {
            sample_rows: config.sniff_rows,
        };
        let mapping = Self::resolve_with(tab, &[&header, &sniff]);
        tracing::debug!(tab = %tab.name, ?mapping, "resolved columns");
        mapping
    }

    pub fn resolve_with(tab: &Tab, strategies: &[&dyn ColumnStrategy]) -> Self {
        let mut mapping = Self::default();
        for strategy in strategies {
            strategy.resolve(tab, &mut mapping);
            tracing::trace!(tab = %tab.name, strategy = strategy.name(), ?mapping, "column strategy applied");
        }
        mapping
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Website => self.website,
            Field::Name => self.name,
            Field::Phone => self.phone,
            Field::Email => self.email,
            Field::Contact => self.contact,
        }
    }

    pub fn set(&mut self, field: Field, col: usize) {
        let slot = match field {
            Field::Website => &mut self.website,
            Field::Name => &mut self.name,
            Field::Phone => &mut self.phone,
            Field::Email => &mut self.email,
            Field::Contact => &mut self.contact,
        };
        *slot = Some(col);
    }

    /// Extract the record at data row `row`. Cells past the end of a short
    /// row, and blank cells, become `None`.
    pub fn record(&self, tab: &Tab, row: usize) -> Record {
        let cell = |col: Option<usize>| {
            col.and_then(|c| tab.rows.get(row).and_then(|r| r.get(c)))
                .filter(|v| !v.trim().is_empty())
                .cloned()
        };
        Record {
            row,
            business_name: cell(self.name),
            email: cell(self.email),
            phone: cell(self.phone),
            website: cell(self.website),
            primary_contact: cell(self.contact),
        }
    }

    pub fn records<'a>(&'a self, tab: &'a Tab) -> impl Iterator<Item = Record> + 'a {
        (0..tab.rows.len()).map(move |row| self.record(tab, row))
    }
}

/// A column discovery strategy. Implementations must leave fields that are
/// already resolved untouched.
pub trait ColumnStrategy {
    fn name(&self) -> &'static str;
    fn resolve(&self, tab: &Tab, mapping: &mut ColumnMapping);
}

// ---------------------------------------------------------------------------
// HeaderMatch
// ---------------------------------------------------------------------------

pub struct HeaderMatch<'a> {
    pub prefs: &'a ColumnPreferences,
}

impl HeaderMatch<'_> {
    fn preferences(&self, field: Field) -> &[String] {
        match field {
            Field::Website => &self.prefs.website,
            Field::Name => &self.prefs.name,
            Field::Phone => &self.prefs.phone,
            Field::Email => &self.prefs.email,
            Field::Contact => &self.prefs.contact,
        }
    }
}

impl ColumnStrategy for HeaderMatch<'_> {
    fn name(&self) -> &'static str {
        "header_match"
    }

    fn resolve(&self, tab: &Tab, mapping: &mut ColumnMapping) {
        let headers: Vec<String> = tab.header.iter().map(|h| h.trim().to_lowercase()).collect();

        for field in Field::ALL {
            if mapping.get(field).is_some() {
                continue;
            }
            let hit = self.preferences(field).iter().find_map(|wanted| {
                let wanted = wanted.trim().to_lowercase();
                headers.iter().position(|h| *h == wanted)
            });
            if let Some(col) = hit {
                mapping.set(field, col);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ContentSniff
// ---------------------------------------------------------------------------

pub struct ContentSniff {
    pub sample_rows: usize,
}

impl ContentSniff {
    /// First column where any sampled cell satisfies `pred`.
    fn first_column(&self, tab: &Tab, width: usize, pred: impl Fn(&str) -> bool) -> Option<usize> {
        let sample = tab.rows.len().min(self.sample_rows);
        (0..width).find(|&col| (0..sample).any(|row| pred(tab.cell(row, col))))
    }
}

fn looks_like_url(cell: &str) -> bool {
    let lower = cell.to_lowercase();
    lower.contains("http") || lower.contains("www.")
}

fn looks_like_phone(cell: &str) -> bool {
    cell.chars().filter(|c| c.is_ascii_digit()).count() > 7
}

fn looks_like_email(cell: &str) -> bool {
    cell.contains('@') && cell.contains('.')
}

impl ColumnStrategy for ContentSniff {
    fn name(&self) -> &'static str {
        "content_sniff"
    }

    fn resolve(&self, tab: &Tab, mapping: &mut ColumnMapping) {
        let width = tab
            .rows
            .iter()
            .take(self.sample_rows)
            .map(|r| r.len())
            .chain(std::iter::once(tab.header.len()))
            .max()
            .unwrap_or(0);

        if mapping.website.is_none() {
            mapping.website = self.first_column(tab, width, looks_like_url);
        }
        if mapping.phone.is_none() {
            mapping.phone = self.first_column(tab, width, looks_like_phone);
        }
        if mapping.email.is_none() {
            mapping.email = self.first_column(tab, width, looks_like_email);
        }
        if mapping.name.is_none() && width > 0 {
            mapping.name = Some(0);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
