// XLSX workbook store: read with calamine, written back whole with rust_xlsxwriter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use indexmap::IndexMap;
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use crate::error::StoreError;
use crate::store::{Rows, SheetStore};

/// Tab name -> rows, in workbook order.
type Sheets = IndexMap<String, Rows>;

/// A dataset is an `.xlsx` file; each worksheet is a tab.
///
/// rust_xlsxwriter cannot edit a file in place, so every mutation loads the
/// whole workbook, applies the change in memory and rewrites the file. All
/// cells are written as strings. Formatting, formulas and other workbook
/// features are not preserved.
///
/// A dataset created with `create_dataset` stays in memory until its first
/// tab exists, since an xlsx file cannot have zero worksheets.
#[derive(Debug, Default)]
pub struct XlsxStore {
    base: Option<PathBuf>,
    pending: HashMap<PathBuf, Sheets>,
}

impl XlsxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
            pending: HashMap::new(),
        }
    }

    fn path(&self, dataset: &str) -> PathBuf {
        match &self.base {
            Some(base) => base.join(dataset),
            None => PathBuf::from(dataset),
        }
    }

    fn load(&self, path: &Path) -> Result<Sheets, StoreError> {
        if let Some(sheets) = self.pending.get(path) {
            return Ok(sheets.clone());
        }
        read_workbook(path)
    }

    fn modify<F>(&mut self, dataset: &str, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Sheets) -> Result<(), StoreError>,
    {
        let path = self.path(dataset);
        let mut sheets = self.load(&path)?;
        change(&mut sheets)?;
        if sheets.is_empty() {
            self.pending.insert(path, sheets);
            return Ok(());
        }
        write_workbook(&path, &sheets)?;
        self.pending.remove(&path);
        Ok(())
    }
}

impl SheetStore for XlsxStore {
    fn list_tabs(&self, dataset: &str) -> Result<Vec<String>, StoreError> {
        let path = self.path(dataset);
        if let Some(sheets) = self.pending.get(&path) {
            return Ok(sheets.keys().cloned().collect());
        }
        let workbook = open(&path)?;
        Ok(workbook.sheet_names())
    }

    fn read_tab(&self, dataset: &str, tab: &str) -> Result<Rows, StoreError> {
        let path = self.path(dataset);
        if let Some(sheets) = self.pending.get(&path) {
            return sheets
                .get(tab)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("{}: {tab}", path.display())));
        }
        let mut workbook = open(&path)?;
        if !workbook.sheet_names().iter().any(|n| n == tab) {
            return Err(StoreError::NotFound(format!("{}: {tab}", path.display())));
        }
        let range = workbook
            .worksheet_range(tab)
            .map_err(|e| StoreError::xlsx(&path, format!("cannot read sheet '{tab}': {e}")))?;
        Ok(range_to_rows(&range))
    }

    fn clear_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        let label = format!("{dataset}: {tab}");
        self.modify(dataset, |sheets| match sheets.get_mut(tab) {
            Some(rows) => {
                rows.clear();
                Ok(())
            }
            None => Err(StoreError::NotFound(label)),
        })
    }

    fn write_tab(&mut self, dataset: &str, tab: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        self.modify(dataset, |sheets| {
            sheets.insert(tab.to_string(), rows.to_vec());
            Ok(())
        })
    }

    fn create_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        let label = format!("{dataset}: {tab}");
        self.modify(dataset, |sheets| {
            if sheets.contains_key(tab) {
                return Err(StoreError::AlreadyExists(label));
            }
            sheets.insert(tab.to_string(), Vec::new());
            Ok(())
        })
    }

    fn create_dataset(&mut self, title: &str) -> Result<String, StoreError> {
        let id = if title.to_ascii_lowercase().ends_with(".xlsx") {
            title.to_string()
        } else {
            format!("{title}.xlsx")
        };
        let path = self.path(&id);
        if path.exists() || self.pending.contains_key(&path) {
            return Err(StoreError::AlreadyExists(path.display().to_string()));
        }
        self.pending.insert(path, Sheets::new());
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<calamine::Sheets<std::io::BufReader<std::fs::File>>, StoreError> {
    if !path.is_file() {
        return Err(StoreError::NotFound(path.display().to_string()));
    }
    open_workbook_auto(path).map_err(|e| StoreError::xlsx(path, format!("failed to open workbook: {e}")))
}

fn read_workbook(path: &Path) -> Result<Sheets, StoreError> {
    let mut workbook = open(path)?;
    let mut sheets = Sheets::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| StoreError::xlsx(path, format!("cannot read sheet '{name}': {e}")))?;
        sheets.insert(name, range_to_rows(&range));
    }
    Ok(sheets)
}

/// Dense rows from a calamine range. The range may not start at A1, so the
/// leading offset is padded back in. Trailing empty cells and trailing empty
/// rows are dropped.
fn range_to_rows(range: &calamine::Range<Data>) -> Rows {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Rows = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells: Vec<String> = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(cell_to_string));
        while cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        rows.push(cells);
    }
    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }
    rows
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integers without decimals; phone numbers are often stored as floats
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Data::Float(n) => format!("{n}"),
        Data::Int(n) => format!("{n}"),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::Error(e) => format!("#{e:?}"),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_workbook(path: &Path, sheets: &Sheets) -> Result<(), StoreError> {
    let mut workbook = XlsxWorkbook::new();

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(name)
            .map_err(|_| StoreError::InvalidName(name.clone()))?;

        for (r, row) in rows.iter().enumerate() {
            let r = u32::try_from(r).map_err(|_| StoreError::xlsx(path, "too many rows"))?;
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let c = u16::try_from(c).map_err(|_| StoreError::xlsx(path, "too many columns"))?;
                worksheet
                    .write_string(r, c, value)
                    .map_err(|e| StoreError::xlsx(path, format!("sheet '{name}': {e}")))?;
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| StoreError::xlsx(path, format!("failed to save: {e}")))?;
    tracing::debug!(path = %path.display(), tabs = sheets.len(), "wrote workbook");
    Ok(())
}
