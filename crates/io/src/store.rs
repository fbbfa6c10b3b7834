use listwash_dedup::Tab;

use crate::error::StoreError;

/// Raw rows of a tab. Row 0 is the header.
pub type Rows = Vec<Vec<String>>;

/// A spreadsheet store: datasets made of named tabs of string cells.
///
/// Reads take `&self`; anything that mutates a dataset takes `&mut self`.
/// Dataset ids are store-specific (a directory, a workbook path, a key).
pub trait SheetStore {
    fn list_tabs(&self, dataset: &str) -> Result<Vec<String>, StoreError>;

    fn read_tab(&self, dataset: &str, tab: &str) -> Result<Rows, StoreError>;

    fn clear_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError>;

    /// Replace the tab's contents with `rows`.
    fn write_tab(&mut self, dataset: &str, tab: &str, rows: &[Vec<String>]) -> Result<(), StoreError>;

    fn create_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError>;

    /// Create an empty dataset and return its id.
    fn create_dataset(&mut self, title: &str) -> Result<String, StoreError>;

    /// Read a tab into the engine's `Tab` form.
    fn load_tab(&self, dataset: &str, tab: &str) -> Result<Tab, StoreError> {
        Ok(Tab::from_rows(tab, self.read_tab(dataset, tab)?))
    }

    /// Read every tab of a dataset, in store order.
    fn load_all(&self, dataset: &str) -> Result<Vec<Tab>, StoreError> {
        self.list_tabs(dataset)?
            .iter()
            .map(|name| self.load_tab(dataset, name))
            .collect()
    }
}

impl<S: SheetStore + ?Sized> SheetStore for Box<S> {
    fn list_tabs(&self, dataset: &str) -> Result<Vec<String>, StoreError> {
        (**self).list_tabs(dataset)
    }

    fn read_tab(&self, dataset: &str, tab: &str) -> Result<Rows, StoreError> {
        (**self).read_tab(dataset, tab)
    }

    fn clear_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        (**self).clear_tab(dataset, tab)
    }

    fn write_tab(&mut self, dataset: &str, tab: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        (**self).write_tab(dataset, tab, rows)
    }

    fn create_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        (**self).create_tab(dataset, tab)
    }

    fn create_dataset(&mut self, title: &str) -> Result<String, StoreError> {
        (**self).create_dataset(title)
    }
}
