use std::path::{Path, PathBuf};

use crate::csv::{read_rows, sniff_delimiter, write_rows};
use crate::error::StoreError;
use crate::store::{Rows, SheetStore};

const TAB_EXT: &str = "csv";

/// A dataset is a directory; each `*.csv` file in it is a tab named by its
/// file stem. Relative dataset ids resolve against `base`.
#[derive(Debug, Clone, Default)]
pub struct CsvDirStore {
    base: Option<PathBuf>,
}

impl CsvDirStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self { base: Some(base.into()) }
    }

    fn dataset_dir(&self, dataset: &str) -> PathBuf {
        match &self.base {
            Some(base) => base.join(dataset),
            None => PathBuf::from(dataset),
        }
    }

    fn tab_path(&self, dataset: &str, tab: &str) -> Result<PathBuf, StoreError> {
        if tab.is_empty() || tab.contains(['/', '\\']) || tab == "." || tab == ".." {
            return Err(StoreError::InvalidName(tab.to_string()));
        }
        Ok(self.dataset_dir(dataset).join(format!("{tab}.{TAB_EXT}")))
    }

    fn require_dir(dir: &Path) -> Result<(), StoreError> {
        if dir.is_dir() {
            Ok(())
        } else {
            Err(StoreError::NotFound(dir.display().to_string()))
        }
    }

    /// Delimiter of the existing file, so a rewrite keeps the original format.
    fn existing_delimiter(path: &Path) -> u8 {
        std::fs::read_to_string(path)
            .map(|content| sniff_delimiter(&content))
            .unwrap_or(b',')
    }
}

impl SheetStore for CsvDirStore {
    fn list_tabs(&self, dataset: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.dataset_dir(dataset);
        Self::require_dir(&dir)?;

        let mut tabs = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))? {
            let path = entry.map_err(|e| StoreError::io(&dir, e))?.path();
            let is_tab = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == TAB_EXT);
            if !is_tab {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tabs.push(stem.to_string());
            }
        }
        tabs.sort();
        Ok(tabs)
    }

    fn read_tab(&self, dataset: &str, tab: &str) -> Result<Rows, StoreError> {
        let path = self.tab_path(dataset, tab)?;
        let (rows, _) = read_rows(&path)?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "read tab");
        Ok(rows)
    }

    fn clear_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        let path = self.tab_path(dataset, tab)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        std::fs::write(&path, b"").map_err(|e| StoreError::io(&path, e))
    }

    fn write_tab(&mut self, dataset: &str, tab: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        Self::require_dir(&self.dataset_dir(dataset))?;
        let path = self.tab_path(dataset, tab)?;
        let delimiter = Self::existing_delimiter(&path);
        write_rows(&path, rows, delimiter)?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "wrote tab");
        Ok(())
    }

    fn create_tab(&mut self, dataset: &str, tab: &str) -> Result<(), StoreError> {
        Self::require_dir(&self.dataset_dir(dataset))?;
        let path = self.tab_path(dataset, tab)?;
        if path.exists() {
            return Err(StoreError::AlreadyExists(path.display().to_string()));
        }
        std::fs::write(&path, b"").map_err(|e| StoreError::io(&path, e))
    }

    fn create_dataset(&mut self, title: &str) -> Result<String, StoreError> {
        let dir = self.dataset_dir(title);
        if dir.exists() {
            return Err(StoreError::AlreadyExists(dir.display().to_string()));
        }
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tracing::info!(dataset = %dir.display(), "created dataset");
        Ok(title.to_string())
    }
}
