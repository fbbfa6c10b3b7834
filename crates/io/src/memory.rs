use indexmap::IndexMap;

use crate::error::StoreError;
use crate::store::{Rows, SheetStore};

/// In-memory store for tests and in-process pipelines.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    datasets: IndexMap<String, IndexMap<String, Rows>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tab, creating the dataset if needed.
    pub fn insert(&mut self, dataset: &str, tab: &str, rows: Rows) {
        self.datasets
            .entry(dataset.to_string())
            .or_default()
            .insert(tab.to_string(), rows);
    }

    fn dataset(&self, dataset: &str) -> Result<&IndexMap<String, Rows>, StoreError> {
        self.datasets
            .get(dataset)
            .ok_or_else(|| StoreError::NotFound(dataset.to_string()))
    }

    fn dataset_mut(&mut self, dataset: &str) -> Result<&mut IndexMap<String, Rows>, StoreError> {
        self.datasets
            .get_mut(dataset)
            .ok_or_else(|| StoreError::NotFound(dataset.to_string()))
    }
}

impl SheetStore for MemoryStore {
    fn list_tabs(&self, dataset: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.dataset(dataset)?.keys().cloned().collect())
    }

    fn read_tab(&self, dataset: &str, tab: &str) -> Result<Rows, StoreError> {
        self.dataset(dataset)?
            .get(tab)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{dataset}: {tab}")))
    }

    fn clear_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        match self.dataset_mut(dataset)?.get_mut(tab) {
            Some(rows) => {
                rows.clear();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("{dataset}: {tab}"))),
        }
    }

    fn write_tab(&mut self, dataset: &str, tab: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        self.dataset_mut(dataset)?.insert(tab.to_string(), rows.to_vec());
        Ok(())
    }

    fn create_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        let tabs = self.dataset_mut(dataset)?;
        if tabs.contains_key(tab) {
            return Err(StoreError::AlreadyExists(format!("{dataset}: {tab}")));
        }
        tabs.insert(tab.to_string(), Vec::new());
        Ok(())
    }

    fn create_dataset(&mut self, title: &str) -> Result<String, StoreError> {
        if self.datasets.contains_key(title) {
            return Err(StoreError::AlreadyExists(title.to_string()));
        }
        self.datasets.insert(title.to_string(), IndexMap::new());
        Ok(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_keep_insertion_order() {
        let mut store = MemoryStore::new();
        store.insert("b", "Red Deer", vec![]);
        store.insert("b", "Calgary", vec![vec!["name".into()]]);
        assert_eq!(store.list_tabs("b").unwrap(), vec!["Red Deer", "Calgary"]);

        let tabs = store.load_all("b").unwrap();
        assert_eq!(tabs[1].header, vec!["name"]);
        assert!(tabs[0].is_empty());
    }

    #[test]
    fn write_requires_dataset() {
        let mut store = MemoryStore::new();
        assert!(matches!(store.write_tab("x", "t", &[]), Err(StoreError::NotFound(_))));
        let id = store.create_dataset("x").unwrap();
        store.write_tab(&id, "t", &[vec!["a".into()]]).unwrap();
        assert_eq!(store.read_tab("x", "t").unwrap().len(), 1);
    }
}
