use crate::csv_dir::CsvDirStore;
use crate::error::StoreError;
use crate::store::{Rows, SheetStore};
use crate::xlsx::XlsxStore;

/// Routes each dataset id to a local store: ids ending in `.xlsx` are
/// workbooks, anything else is a directory of CSV files.
#[derive(Debug, Default)]
pub struct LocalStore {
    csv: CsvDirStore,
    xlsx: XlsxStore,
}

pub fn is_workbook(dataset: &str) -> bool {
    dataset.to_ascii_lowercase().ends_with(".xlsx")
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(&self, dataset: &str) -> &dyn SheetStore {
        if is_workbook(dataset) {
            &self.xlsx
        } else {
            &self.csv
        }
    }

    fn route_mut(&mut self, dataset: &str) -> &mut dyn SheetStore {
        if is_workbook(dataset) {
            &mut self.xlsx
        } else {
            &mut self.csv
        }
    }
}

impl SheetStore for LocalStore {
    fn list_tabs(&self, dataset: &str) -> Result<Vec<String>, StoreError> {
        self.route(dataset).list_tabs(dataset)
    }

    fn read_tab(&self, dataset: &str, tab: &str) -> Result<Rows, StoreError> {
        self.route(dataset).read_tab(dataset, tab)
    }

    fn clear_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        self.route_mut(dataset).clear_tab(dataset, tab)
    }

    fn write_tab(&mut self, dataset: &str, tab: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        self.route_mut(dataset).write_tab(dataset, tab, rows)
    }

    fn create_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        self.route_mut(dataset).create_tab(dataset, tab)
    }

    fn create_dataset(&mut self, title: &str) -> Result<String, StoreError> {
        self.route_mut(title).create_dataset(title)
    }
}
